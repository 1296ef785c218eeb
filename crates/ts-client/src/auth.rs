//! Installed-app OAuth 2.0 flow
//!
//! A loopback listener on an ephemeral port receives the browser redirect,
//! the `state` parameter is checked, and the authorization code is exchanged
//! for tokens at the client's token endpoint.

use crate::credentials::ClientSecret;
use crate::http_client;
use crate::token::{AccessToken, TokenError, TokenResponse, TokenSource};
use crate::youtube::YouTubeClient;
use chrono::Utc;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, ErrorKind as IoErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use ts_core::api::{Authenticator, CommentApi};
use ts_core::config::Config;
use ts_core::error::{Result, SweepError};
use url::Url;
use uuid::Uuid;

const SUCCESS_PAGE: &str = "<html><body><h3>Authentication complete.</h3>\
<p>You can close this window and return to tubesweep.</p></body></html>";
const FAILURE_PAGE: &str = "<html><body><h3>Authentication failed.</h3>\
<p>Return to tubesweep for details.</p></body></html>";

/// Build the consent page URL the operator opens
pub fn consent_url(
    secret: &ClientSecret,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> Result<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| SweepError::Authentication(format!("invalid auth_uri: {}", e)))
}

/// Extract the authorization code from the redirect request line.
///
/// Returns `Ok(None)` for requests that are not the redirect (a favicon
/// fetch, for instance).
pub fn parse_redirect(request_line: &str, expected_state: &str) -> Result<Option<String>> {
    let mut parts = request_line.split_whitespace();
    let (Some(_method), Some(target)) = (parts.next(), parts.next()) else {
        return Ok(None);
    };

    let Ok(url) = Url::parse("http://127.0.0.1/").and_then(|base| base.join(target)) else {
        return Ok(None);
    };
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if let Some(error) = params.get("error") {
        return Err(SweepError::Authentication(error.clone()));
    }
    let Some(code) = params.get("code") else {
        return Ok(None);
    };
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Err(SweepError::Authentication(
            "state mismatch in OAuth redirect".to_string(),
        ));
    }
    Ok(Some(code.clone()))
}

/// OAuth authenticator producing [`YouTubeClient`]s
#[derive(Debug, Clone)]
pub struct OAuthAuthenticator {
    scopes: Vec<String>,
    base_url: String,
    timeout: Duration,
    open_browser: bool,
    wait_timeout: Duration,
}

impl OAuthAuthenticator {
    /// Authenticator configured from `[auth]` and `[api]`
    pub fn from_config(config: &Config) -> Self {
        Self {
            scopes: config.auth.scopes.clone(),
            base_url: config.api.base_url.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            open_browser: config.auth.open_browser,
            wait_timeout: Duration::from_secs(300),
        }
    }

    /// Give up waiting for the browser after `timeout`
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    fn wait_for_code(&self, listener: &TcpListener, state: &str) -> Result<String> {
        listener.set_nonblocking(true)?;
        let deadline = Instant::now() + self.wait_timeout;

        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    debug!("Redirect connection from {}", peer);
                    if let Some(code) = handle_redirect(stream, state)? {
                        return Ok(code);
                    }
                }
                Err(e) if e.kind() == IoErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(SweepError::Authentication(
                            "timed out waiting for the browser redirect".to_string(),
                        ));
                    }
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => return Err(SweepError::Io(e)),
            }
        }
    }
}

fn handle_redirect(mut stream: TcpStream, state: &str) -> Result<Option<String>> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;

    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line)?;

    let result = parse_redirect(request_line.trim_end(), state);
    let (status, page) = match &result {
        Ok(Some(_)) => ("200 OK", SUCCESS_PAGE),
        Ok(None) => ("404 Not Found", ""),
        Err(_) => ("400 Bad Request", FAILURE_PAGE),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        page.len(),
        page
    );
    if let Err(e) = stream.write_all(response.as_bytes()) {
        debug!("Failed to answer redirect: {}", e);
    }
    result
}

fn exchange_code(
    http: &Client,
    secret: &ClientSecret,
    code: &str,
    redirect_uri: &str,
) -> Result<AccessToken> {
    let response = http
        .post(&secret.token_uri)
        .form(&[
            ("code", code),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .map_err(|e| SweepError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| SweepError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(TokenError::from_body(status.as_u16(), &body));
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| SweepError::Authentication(format!("invalid token response: {}", e)))?;
    Ok(AccessToken::from_response(parsed, Utc::now()))
}

impl Authenticator for OAuthAuthenticator {
    fn authenticate(
        &self,
        credentials: &Path,
        on_consent_url: &mut dyn FnMut(&str),
    ) -> Result<Arc<dyn CommentApi>> {
        let secret = ClientSecret::load(credentials)?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(|e| {
            SweepError::Authentication(format!("cannot open the redirect listener: {}", e))
        })?;
        let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
        let state = Uuid::new_v4().simple().to_string();

        let url = consent_url(&secret, &redirect_uri, &self.scopes, &state)?;
        on_consent_url(url.as_str());
        if self.open_browser {
            if let Err(e) = webbrowser::open(url.as_str()) {
                warn!("Could not open a browser: {}", e);
            }
        }

        let code = self.wait_for_code(&listener, &state)?;
        let http = http_client(self.timeout)?;
        let token = exchange_code(&http, &secret, &code, &redirect_uri)?;
        debug!("Obtained access token for {}", secret.client_id);

        let tokens = TokenSource::new(http.clone(), Some(secret), token);
        Ok(Arc::new(YouTubeClient::new(http, &self.base_url, tokens)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::mpsc;
    use ts_core::ErrorKind;

    fn secret(base: &str) -> ClientSecret {
        ClientSecret {
            client_id: "client-1".to_string(),
            client_secret: "s3cret".to_string(),
            auth_uri: format!("{}/o/oauth2/auth", base),
            token_uri: format!("{}/token", base),
        }
    }

    #[test]
    fn test_consent_url() {
        let scopes = vec!["https://www.googleapis.com/auth/youtube.force-ssl".to_string()];
        let url = consent_url(
            &secret("https://accounts.google.com"),
            "http://127.0.0.1:8765",
            &scopes,
            "abc",
        )
        .unwrap();

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(url.path(), "/o/oauth2/auth");
        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:8765");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], scopes[0]);
        assert_eq!(params["state"], "abc");
    }

    #[test]
    fn test_parse_redirect_code() {
        let code = parse_redirect("GET /?state=abc&code=4%2F0Ab&scope=x HTTP/1.1", "abc").unwrap();
        assert_eq!(code.as_deref(), Some("4/0Ab"));
    }

    #[test]
    fn test_parse_redirect_state_mismatch() {
        let err = parse_redirect("GET /?state=evil&code=c HTTP/1.1", "abc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn test_parse_redirect_denied() {
        let err = parse_redirect("GET /?error=access_denied&state=abc HTTP/1.1", "abc").unwrap_err();
        assert_eq!(err.to_string(), "Authentication error: access_denied");
    }

    #[test]
    fn test_parse_redirect_ignores_other_requests() {
        assert_eq!(parse_redirect("GET /favicon.ico HTTP/1.1", "abc").unwrap(), None);
        assert_eq!(parse_redirect("", "abc").unwrap(), None);
    }

    #[test]
    fn test_missing_credentials_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let auth = OAuthAuthenticator::from_config(&Config::default());
        let err = auth
            .authenticate(&temp.path().join("nope.json"), &mut |_| {})
            .err()
            .unwrap();
        assert!(matches!(err, SweepError::FileNotFound(_)));
    }

    #[test]
    fn test_full_loopback_flow() {
        let (base, token_server) = test_server::serve(vec![(
            200,
            r#"{"access_token":"ya29.tok","expires_in":3600,"refresh_token":"1//r"}"#.to_string(),
        )]);

        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("client_secret.json");
        let s = secret(&base);
        fs::write(
            &path,
            format!(
                r#"{{"installed":{{"client_id":"{}","client_secret":"{}","auth_uri":"{}","token_uri":"{}"}}}}"#,
                s.client_id, s.client_secret, s.auth_uri, s.token_uri
            ),
        )
        .unwrap();

        let mut config = Config::default();
        config.auth.open_browser = false;
        config.api.base_url = base.clone();
        let auth = OAuthAuthenticator::from_config(&config).with_wait_timeout(Duration::from_secs(10));

        // Play the browser: follow the consent URL's redirect_uri with the state
        let (tx, rx) = mpsc::channel::<String>();
        let browser = thread::spawn(move || {
            let consent = Url::parse(&rx.recv().unwrap()).unwrap();
            let params: HashMap<String, String> = consent.query_pairs().into_owned().collect();
            let redirect = Url::parse(&params["redirect_uri"]).unwrap();
            let mut stream =
                TcpStream::connect(("127.0.0.1", redirect.port().unwrap())).unwrap();
            write!(
                stream,
                "GET /?state={}&code=the-code HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n",
                params["state"]
            )
            .unwrap();
            let mut status = String::new();
            BufReader::new(stream).read_line(&mut status).unwrap();
            status
        });

        let api = auth
            .authenticate(&path, &mut |url| tx.send(url.to_string()).unwrap())
            .unwrap();
        drop(api);

        assert!(browser.join().unwrap().starts_with("HTTP/1.1 200"));
        let requests = token_server.join().unwrap();
        assert_eq!(requests[0].request_line, "POST /token HTTP/1.1");
        assert!(requests[0].body.contains("code=the-code"));
        assert!(requests[0].body.contains("grant_type=authorization_code"));
    }
}
