//! Application state
//!
//! Everything the front end knows lives here. Key presses and worker results
//! go in, [`Action`]s for the runner come out; this module does no I/O.

use crate::events::WorkerEvent;
use crate::input::TextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use ts_core::api::{CommentApi, MAX_PAGE_SIZE};
use ts_core::comment::{Comment, CommentSet, FlaggedSet};
use ts_core::error::{ErrorKind, Result, SweepError};
use ts_core::pipeline::{
    BatchOutcome, ModerationBatch, ModerationIntent, PredictionJob, Sweep, SweepState,
};
use ts_core::session::Session;
use ts_core::types::{CommentId, VideoId};

/// Rows moved by PageUp/PageDown
const PAGE_STEP: usize = 10;

/// Panel holding keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Credentials file input
    #[default]
    Credentials,
    /// Video URL input
    VideoUrl,
    /// Loaded comments table
    Comments,
    /// Comment id input and removal toggles
    Removal,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::Credentials,
        Focus::VideoUrl,
        Focus::Comments,
        Focus::Removal,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Next panel in tab order
    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    /// Previous panel in tab order
    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Popup title
    pub fn title(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "Success",
            NoticeLevel::Info => "Info",
            NoticeLevel::Warning => "Warning",
            NoticeLevel::Error => "Error",
        }
    }
}

/// Modal message closed by any key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Popup drawn over the main screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Key bindings
    Help,
    /// What the tool is for
    About,
    /// Activity log contents, `None` when there is no log yet
    Logs { content: Option<String>, scroll: u16 },
}

/// Side effect requested by the state, carried out by the runner
pub enum Action {
    /// Run the credential flow
    Authenticate { credentials: PathBuf },
    /// Fetch every comment of a video
    LoadComments {
        api: Arc<dyn CommentApi>,
        video_id: VideoId,
        page_size: u32,
    },
    /// Reject one comment
    RemoveComment {
        api: Arc<dyn CommentApi>,
        intent: ModerationIntent,
    },
    /// Classify the loaded comments
    Predict(PredictionJob),
    /// Reject the reviewed comments
    ApplyBatch {
        api: Arc<dyn CommentApi>,
        batch: ModerationBatch,
    },
    /// Read the activity log for the viewer
    ShowLogs,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Authenticate { credentials } => f
                .debug_struct("Authenticate")
                .field("credentials", credentials)
                .finish(),
            Action::LoadComments {
                video_id,
                page_size,
                ..
            } => f
                .debug_struct("LoadComments")
                .field("video_id", video_id)
                .field("page_size", page_size)
                .finish(),
            Action::RemoveComment { intent, .. } => f
                .debug_struct("RemoveComment")
                .field("intent", intent)
                .finish(),
            Action::Predict(job) => f
                .debug_tuple("Predict")
                .field(&job.comments().len())
                .finish(),
            Action::ApplyBatch { batch, .. } => {
                f.debug_struct("ApplyBatch").field("batch", batch).finish()
            }
            Action::ShowLogs => f.write_str("ShowLogs"),
        }
    }
}

/// Connectivity shown in the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latency {
    /// No probe result yet
    #[default]
    Unknown,
    Connected(Duration),
    Disconnected,
}

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Operator session
    pub session: Session,
    /// AI-assisted removal state machine
    pub sweep: Sweep,
    /// Focused panel
    pub focus: Focus,
    /// Credentials file path
    pub credentials: TextInput,
    /// Video URL
    pub video_url: TextInput,
    /// Comment id for manual removal
    pub comment_id: TextInput,
    /// Selected row of the comments table
    pub selected_comment: usize,
    /// Selected row of the review table
    pub selected_flagged: usize,
    /// Help, about or log viewer
    pub overlay: Option<Overlay>,
    /// Modal result message, drawn above everything
    pub notice: Option<Notice>,
    /// Consent URL while the OAuth flow waits for the browser
    pub consent_url: Option<String>,
    /// Credential flow running
    pub authenticating: bool,
    /// Paginated load running, with `(pages, comments)` so far
    pub loading: Option<(usize, usize)>,
    /// Manual removals in flight
    pub removals_in_flight: usize,
    /// Footer connectivity indicator
    pub latency: Latency,
    /// Status bar message
    pub message: Option<String>,
    /// Comment threads requested per page
    pub page_size: u32,
    /// Should quit
    pub should_quit: bool,
}

impl AppState {
    /// Create the state around a session
    pub fn new(session: Session) -> Self {
        Self {
            session,
            sweep: Sweep::new(),
            focus: Focus::default(),
            credentials: TextInput::new(),
            video_url: TextInput::new(),
            comment_id: TextInput::new(),
            selected_comment: 0,
            selected_flagged: 0,
            overlay: None,
            notice: None,
            consent_url: None,
            authenticating: false,
            loading: None,
            removals_in_flight: 0,
            latency: Latency::default(),
            message: None,
            page_size: MAX_PAGE_SIZE,
            should_quit: false,
        }
    }

    /// Pre-fill the credentials input
    pub fn with_credentials(mut self, path: &Path) -> Self {
        self.credentials.set(path.display().to_string());
        self
    }

    /// Comment threads per page
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Set status message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    /// Clear status message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Flagged comments under review
    pub fn flagged(&self) -> Option<&FlaggedSet> {
        self.sweep.flagged()
    }

    /// Whether the review popup is showing
    pub fn is_reviewing(&self) -> bool {
        matches!(
            self.sweep.state(),
            SweepState::AwaitingConfirmation(_) | SweepState::Applying { .. }
        )
    }

    /// Currently loaded comments
    pub fn comments(&self) -> Option<Arc<CommentSet>> {
        self.session.comments()
    }

    /// Comment under the table cursor
    pub fn selected(&self) -> Option<Comment> {
        self.comments()
            .and_then(|set| set.comments().get(self.selected_comment).cloned())
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice::new(level, message));
    }

    /// Log and show an error, at the level its kind calls for
    fn report(&mut self, text: String, kind: ErrorKind) {
        if kind.log_level() == Level::INFO {
            info!("{}", text);
        } else {
            error!("{}", text);
        }
        let level = if kind == ErrorKind::Validation {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        self.notify(level, text);
    }

    fn report_error(&mut self, err: &SweepError) {
        self.report(err.to_string(), err.kind());
    }

    // Key handling

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.notice.is_some() {
            self.notice = None;
            return None;
        }

        if let Some(overlay) = self.overlay.as_mut() {
            let close = match overlay {
                Overlay::Logs { scroll, .. } => {
                    match key.code {
                        KeyCode::Char('j') | KeyCode::Down => *scroll = scroll.saturating_add(1),
                        KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
                        KeyCode::PageDown => *scroll = scroll.saturating_add(PAGE_STEP as u16),
                        KeyCode::PageUp => *scroll = scroll.saturating_sub(PAGE_STEP as u16),
                        KeyCode::Char('g') | KeyCode::Home => *scroll = 0,
                        _ => {}
                    }
                    matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::F(4))
                }
                Overlay::Help | Overlay::About => true,
            };
            if close {
                self.overlay = None;
            }
            return None;
        }

        if self.is_reviewing() {
            return self.handle_review_key(key);
        }

        match key.code {
            KeyCode::F(10) => {
                self.should_quit = true;
                None
            }
            KeyCode::F(1) => {
                self.overlay = Some(Overlay::Help);
                None
            }
            KeyCode::F(5) => {
                self.overlay = Some(Overlay::About);
                None
            }
            KeyCode::F(4) => Some(Action::ShowLogs),
            KeyCode::F(2) => {
                self.toggle_ban_author();
                None
            }
            KeyCode::F(3) => {
                self.toggle_ai_assisted();
                None
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Enter => self.submit(),
            _ => {
                self.handle_focused_key(key);
                None
            }
        }
    }

    /// Handle pasted text
    pub fn handle_paste(&mut self, text: &str) {
        if self.notice.is_some() || self.overlay.is_some() || self.is_reviewing() {
            return;
        }
        if let Some(input) = self.focused_input() {
            input.insert_str(text);
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            Focus::Credentials => Some(&mut self.credentials),
            Focus::VideoUrl => Some(&mut self.video_url),
            Focus::Removal if !self.session.ai_assisted => Some(&mut self.comment_id),
            Focus::Removal | Focus::Comments => None,
        }
    }

    fn handle_focused_key(&mut self, key: KeyEvent) {
        if self.focus == Focus::Comments {
            self.handle_table_key(key);
            return;
        }

        let Some(input) = self.focused_input() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => input.insert(c),
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            KeyCode::Home => input.move_home(),
            KeyCode::End => input.move_end(),
            KeyCode::Esc => input.clear(),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        let count = self.comments().map_or(0, |set| set.len());
        let last = count.saturating_sub(1);

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected_comment = (self.selected_comment + 1).min(last)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_comment = self.selected_comment.saturating_sub(1)
            }
            KeyCode::PageDown => self.selected_comment = (self.selected_comment + PAGE_STEP).min(last),
            KeyCode::PageUp => self.selected_comment = self.selected_comment.saturating_sub(PAGE_STEP),
            KeyCode::Char('g') | KeyCode::Home => self.selected_comment = 0,
            KeyCode::Char('G') | KeyCode::End => self.selected_comment = last,
            KeyCode::Char('y') => self.copy_selected_id(),
            _ => {}
        }
    }

    /// Put the selected comment's id into the removal input
    pub fn copy_selected_id(&mut self) {
        if let Some(comment) = self.selected() {
            self.comment_id.set(comment.id.as_str());
            self.set_message(format!("Copied {}", comment.id));
        }
    }

    fn handle_review_key(&mut self, key: KeyEvent) -> Option<Action> {
        if !matches!(self.sweep.state(), SweepState::AwaitingConfirmation(_)) {
            // Applying: wait for the outcome
            return None;
        }

        let count = self.flagged().map_or(0, FlaggedSet::len);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected_flagged = (self.selected_flagged + 1).min(count.saturating_sub(1));
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_flagged = self.selected_flagged.saturating_sub(1);
                None
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                self.dismiss_selected();
                None
            }
            KeyCode::Enter => self.confirm_review(),
            KeyCode::Esc => {
                self.sweep.cancel();
                self.finish_sweep();
                None
            }
            _ => None,
        }
    }

    /// Drop the selected entry from the review
    pub fn dismiss_selected(&mut self) {
        if let Some(comment) = self.sweep.dismiss_at(self.selected_flagged) {
            self.set_message(format!("Kept {}", comment.id));
        }
        let remaining = self.flagged().map_or(0, FlaggedSet::len);
        if self.selected_flagged >= remaining {
            self.selected_flagged = remaining.saturating_sub(1);
        }
        if self.sweep.state().is_terminal() {
            self.finish_sweep();
        }
    }

    fn confirm_review(&mut self) -> Option<Action> {
        let api = match self.session.require_api() {
            Ok(api) => api,
            Err(err) => {
                self.report_error(&err);
                return None;
            }
        };
        let batch = self.sweep.confirm(self.session.ban_author)?;
        info!(
            "Removing {} flagged comment(s) (ban author: {})",
            batch.len(),
            if self.session.ban_author { "yes" } else { "no" }
        );
        Some(Action::ApplyBatch { api, batch })
    }

    pub fn toggle_ban_author(&mut self) {
        self.session.ban_author = !self.session.ban_author;
        self.set_message(format!(
            "Ban author {}",
            if self.session.ban_author { "on" } else { "off" }
        ));
    }

    pub fn toggle_ai_assisted(&mut self) {
        self.session.ai_assisted = !self.session.ai_assisted;
        let msg = match (self.session.ai_assisted, self.session.has_classifier()) {
            (true, true) => "AI assisted removal on",
            (true, false) => "AI assisted removal on (no model loaded)",
            (false, _) => "AI assisted removal off",
        };
        self.set_message(msg);
    }

    /// Run the action of the focused panel
    pub fn submit(&mut self) -> Option<Action> {
        match self.focus {
            Focus::Credentials => self.request_authentication(),
            Focus::VideoUrl => self.request_load(),
            Focus::Comments => {
                self.copy_selected_id();
                None
            }
            Focus::Removal => self.request_removal(),
        }
    }

    /// Validate the credentials input and start the credential flow
    pub fn request_authentication(&mut self) -> Option<Action> {
        let path = self.credentials.value().trim();
        if path.is_empty() {
            self.report_error(&SweepError::validation("Upload credential file first!"));
            return None;
        }

        let credentials = PathBuf::from(path);
        self.authenticating = true;
        self.consent_url = None;
        self.set_message("Authenticating...");
        Some(Action::Authenticate { credentials })
    }

    /// Validate the URL input and start loading comments
    pub fn request_load(&mut self) -> Option<Action> {
        let checked = self
            .session
            .require_api()
            .and_then(|api| Ok((api, VideoId::from_url(self.video_url.value())?)));

        match checked {
            Ok((api, video_id)) => {
                self.loading = Some((0, 0));
                self.set_message(format!("Loading comments of {}...", video_id));
                Some(Action::LoadComments {
                    api,
                    video_id,
                    page_size: self.page_size,
                })
            }
            Err(err) => {
                self.report_error(&err);
                None
            }
        }
    }

    /// Start a manual or AI-assisted removal
    pub fn request_removal(&mut self) -> Option<Action> {
        let api = match self.session.require_api() {
            Ok(api) => api,
            Err(err) => {
                self.report_error(&err);
                return None;
            }
        };

        if self.session.ai_assisted {
            // No comments or no model: nothing to do
            let job = self.sweep.begin(&self.session)?;
            self.selected_flagged = 0;
            self.set_message(format!("Classifying {} comment(s)...", job.comments().len()));
            return Some(Action::Predict(job));
        }

        match ModerationIntent::from_input(self.comment_id.value(), self.session.ban_author) {
            Ok(intent) => {
                self.removals_in_flight += 1;
                self.set_message(format!("Removing {}...", intent.comment_id));
                Some(Action::RemoveComment { api, intent })
            }
            Err(err) => {
                self.report_error(&err);
                None
            }
        }
    }

    /// Open the log viewer
    pub fn show_logs(&mut self, content: Option<String>) {
        self.overlay = Some(Overlay::Logs { content, scroll: 0 });
    }

    // Worker results

    /// Apply a worker result
    pub fn handle_worker(&mut self, event: WorkerEvent) -> Option<Action> {
        match event {
            WorkerEvent::ConsentUrl(url) => {
                self.set_message("Waiting for consent in the browser");
                self.consent_url = Some(url);
            }
            WorkerEvent::AuthFinished {
                credentials_name,
                result,
            } => self.finish_authentication(credentials_name, result),
            WorkerEvent::LoadProgress { pages, comments } => {
                self.loading = Some((pages, comments));
            }
            WorkerEvent::LoadFinished(result) => self.finish_load(result),
            WorkerEvent::RemoveFinished { comment_id, result } => {
                self.finish_removal(comment_id, result)
            }
            WorkerEvent::PredictionFinished(result) => return self.finish_prediction(result),
            WorkerEvent::BatchFinished(outcome) => self.finish_batch(outcome),
            WorkerEvent::Latency(latency) => {
                self.latency = match latency {
                    Some(rtt) => Latency::Connected(rtt),
                    None => Latency::Disconnected,
                };
            }
        }
        None
    }

    fn finish_authentication(
        &mut self,
        credentials_name: String,
        result: Result<Arc<dyn CommentApi>>,
    ) {
        self.authenticating = false;
        self.consent_url = None;
        self.clear_message();

        match result {
            Ok(api) => {
                info!("Authentication complete with: {}", credentials_name);
                self.session.set_api(api, credentials_name);
                self.notify(NoticeLevel::Success, "Authentication complete.");
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn finish_load(&mut self, result: Result<CommentSet>) {
        self.loading = None;
        self.clear_message();

        match result {
            Ok(set) => {
                let count = set.len();
                self.session.replace_comments(set);
                self.selected_comment = 0;
                if count == 0 {
                    self.notify(NoticeLevel::Info, "No comment found.");
                } else {
                    info!("Loaded {} comment(s).", count);
                    self.notify(NoticeLevel::Success, format!("Loaded {} comment(s).", count));
                }
            }
            Err(err) => self.report(load_error_text(&err), err.kind()),
        }
    }

    fn finish_removal(&mut self, comment_id: CommentId, result: Result<()>) {
        self.removals_in_flight = self.removals_in_flight.saturating_sub(1);
        self.clear_message();

        match result {
            Ok(()) => {
                info!("Removed comment with id: {}", comment_id);
                self.notify(
                    NoticeLevel::Success,
                    format!("Removed comment with id: {}", comment_id),
                );
            }
            Err(err) => self.report(remove_error_text(err.kind(), &err.to_string()), err.kind()),
        }
    }

    fn finish_prediction(&mut self, result: Result<FlaggedSet>) -> Option<Action> {
        self.clear_message();
        self.sweep.finish_prediction(result);
        match self.flagged().map(FlaggedSet::len) {
            Some(count) => {
                info!("{} comment(s) flagged for review", count);
                self.selected_flagged = 0;
            }
            None => self.finish_sweep(),
        }
        None
    }

    fn finish_batch(&mut self, outcome: BatchOutcome) {
        self.sweep.finish_apply(outcome);
        self.finish_sweep();
    }

    /// Report a terminal sweep state and return to idle
    fn finish_sweep(&mut self) {
        match self.sweep.state().clone() {
            SweepState::NoneFlagged => {
                self.notify(NoticeLevel::Info, "No flagged comment to remove.");
            }
            SweepState::Cancelled => {
                info!("Removal of flagged comments cancelled");
                self.set_message("Removal cancelled");
            }
            SweepState::PredictionFailed { message } => {
                self.report(format!("AI {}", message), ErrorKind::Prediction);
            }
            SweepState::Done { removed } => {
                info!("Removed {} comments", removed);
                self.notify(NoticeLevel::Success, format!("Removed {} comments", removed));
            }
            SweepState::Failed {
                applied,
                total,
                kind,
                message,
            } => {
                let text = format!(
                    "{} ({} of {} removed)",
                    remove_error_text(kind, &message),
                    applied,
                    total
                );
                self.report(text, kind);
            }
            _ => return,
        }
        self.sweep.reset();
        self.selected_flagged = 0;
    }
}

fn load_error_text(err: &SweepError) -> String {
    match err.kind() {
        ErrorKind::Transport => format!("Failed to load comments: {}", err),
        ErrorKind::Unexpected => unexpected_text(&err.to_string()),
        _ => err.to_string(),
    }
}

fn remove_error_text(kind: ErrorKind, message: &str) -> String {
    match kind {
        ErrorKind::Transport => format!("Failed to remove comments: {}", message),
        ErrorKind::Unexpected => unexpected_text(message),
        _ => message.to_string(),
    }
}

fn unexpected_text(message: &str) -> String {
    const PREFIX: &str = "An unexpected error occurred: ";
    if message.starts_with(PREFIX) {
        message.to_string()
    } else {
        format!("{}{}", PREFIX, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ts_core::comment::{Comment, CommentPage};
    use ts_core::pipeline::fetch_all;
    use ts_core::testing::{FakeApi, KeywordClassifier};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn video() -> VideoId {
        VideoId::from_url(URL).unwrap()
    }

    fn sample_set() -> CommentSet {
        CommentSet::new(
            video(),
            vec![
                Comment::new("Ugx1", "@alice", "nice video"),
                Comment::new("Ugx2", "@spam", "best CASINO bonus here"),
                Comment::new("Ugx3", "@bob", "thanks"),
                Comment::new("Ugx4", "@spam2", "online casino jackpot"),
            ],
        )
    }

    fn ready_state(api: Arc<FakeApi>) -> AppState {
        let classifier = Arc::new(KeywordClassifier::new(["casino"]));
        let mut state = AppState::new(Session::new(Some(classifier)));
        state.session.set_api(api, "client_secret.json");
        state.session.replace_comments(sample_set());
        state
    }

    #[test]
    fn test_focus_cycle() {
        assert_eq!(Focus::Credentials.next(), Focus::VideoUrl);
        assert_eq!(Focus::Removal.next(), Focus::Credentials);
        assert_eq!(Focus::Credentials.prev(), Focus::Removal);
    }

    #[test]
    fn test_app_state_message() {
        let mut state = AppState::new(Session::default());
        assert!(state.message.is_none());
        state.set_message("Test");
        assert_eq!(state.message, Some("Test".to_string()));
        state.clear_message();
        assert!(state.message.is_none());
    }

    #[test]
    fn test_typing_goes_to_focused_input() {
        let mut state = AppState::new(Session::default());
        type_text(&mut state, "secret.json");
        assert_eq!(state.credentials.value(), "secret.json");

        state.handle_key(key(KeyCode::Tab));
        type_text(&mut state, "jk");
        assert_eq!(state.video_url.value(), "jk");
        assert_eq!(state.credentials.value(), "secret.json");
    }

    #[test]
    fn test_authenticate_requires_credentials() {
        let mut state = AppState::new(Session::default());
        assert!(state.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(
            state.notice,
            Some(Notice::new(NoticeLevel::Warning, "Upload credential file first!"))
        );
    }

    #[test]
    fn test_authenticate_flow() {
        let mut state = AppState::new(Session::default()).with_credentials(Path::new("cs.json"));
        let action = state.handle_key(key(KeyCode::Enter));
        assert!(matches!(action, Some(Action::Authenticate { ref credentials }) if credentials == Path::new("cs.json")));
        assert!(state.authenticating);

        state.handle_worker(WorkerEvent::ConsentUrl("https://accounts.example/auth".to_string()));
        assert_eq!(state.consent_url.as_deref(), Some("https://accounts.example/auth"));

        state.handle_worker(WorkerEvent::AuthFinished {
            credentials_name: "cs.json".to_string(),
            result: Ok(Arc::new(FakeApi::default())),
        });
        assert!(state.session.is_authenticated());
        assert!(!state.authenticating);
        assert!(state.consent_url.is_none());
        assert_eq!(state.notice.as_ref().unwrap().level, NoticeLevel::Success);
    }

    #[test]
    fn test_authentication_failure() {
        let mut state = AppState::new(Session::default());
        state.handle_worker(WorkerEvent::AuthFinished {
            credentials_name: "cs.json".to_string(),
            result: Err(SweepError::Authentication("access_denied".to_string())),
        });
        assert!(!state.session.is_authenticated());
        assert_eq!(
            state.notice,
            Some(Notice::new(NoticeLevel::Error, "Authentication error: access_denied"))
        );
    }

    #[test]
    fn test_load_requires_auth_then_valid_url() {
        let mut state = AppState::new(Session::default());
        state.focus = Focus::VideoUrl;
        type_text(&mut state, URL);

        assert!(state.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(state.notice.as_ref().unwrap().message, "Authenticate first!");
        state.handle_key(key(KeyCode::Esc));
        assert!(state.notice.is_none());

        state.session.set_api(Arc::new(FakeApi::default()), "cs.json");
        state.video_url.set("not a url");
        assert!(state.submit().is_none());
        assert_eq!(state.notice.as_ref().unwrap().message, "Enter a valid YouTube URL!");

        state.notice = None;
        state.video_url.set(URL);
        let action = state.submit();
        assert!(matches!(
            action,
            Some(Action::LoadComments { ref video_id, page_size: 100, .. }) if video_id.as_str() == "dQw4w9WgXcQ"
        ));
        assert_eq!(state.loading, Some((0, 0)));
    }

    #[test]
    fn test_load_result_replaces_comments() {
        let api = FakeApi::new(vec![CommentPage::new(
            vec![Comment::new("Ugx9", "@z", "hello")],
            None,
        )]);
        let set = fetch_all(&api, &video(), 100).unwrap();

        let mut state = AppState::new(Session::default());
        state.session.replace_comments(sample_set());
        state.selected_comment = 3;
        state.loading = Some((1, 1));

        state.handle_worker(WorkerEvent::LoadFinished(Ok(set)));
        assert_eq!(state.comments().unwrap().len(), 1);
        assert_eq!(state.selected_comment, 0);
        assert!(state.loading.is_none());
        assert_eq!(state.notice.as_ref().unwrap().message, "Loaded 1 comment(s).");
    }

    #[test]
    fn test_load_empty_and_failed() {
        let mut state = AppState::new(Session::default());
        state.handle_worker(WorkerEvent::LoadFinished(Ok(CommentSet::new(video(), vec![]))));
        assert_eq!(
            state.notice,
            Some(Notice::new(NoticeLevel::Info, "No comment found."))
        );

        state.session.replace_comments(sample_set());
        state.handle_worker(WorkerEvent::LoadFinished(Err(SweepError::Transport {
            status: 403,
            reason: "commentsDisabled".to_string(),
            message: "disabled".to_string(),
        })));
        assert_eq!(state.comments().unwrap().len(), 4);
        assert_eq!(
            state.notice.as_ref().unwrap().message,
            "Failed to load comments: API error 403 (commentsDisabled): disabled"
        );
    }

    #[test]
    fn test_copy_selected_id() {
        let mut state = ready_state(Arc::new(FakeApi::default()));
        state.focus = Focus::Comments;
        state.handle_key(key(KeyCode::Char('j')));
        state.handle_key(key(KeyCode::Char('j')));
        state.handle_key(key(KeyCode::Char('y')));
        assert_eq!(state.comment_id.value(), "Ugx3");

        state.handle_key(key(KeyCode::Char('G')));
        assert_eq!(state.selected_comment, 3);
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.selected_comment, 3);
    }

    #[test]
    fn test_manual_removal_validates_before_network() {
        let api = Arc::new(FakeApi::default());
        let mut state = ready_state(api.clone());
        state.focus = Focus::Removal;
        type_text(&mut state, "not-an-id");

        assert!(state.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(state.notice.as_ref().unwrap().message, "Enter a valid comment id!");
        assert!(api.moderation_calls().is_empty());
        assert_eq!(state.removals_in_flight, 0);
    }

    #[test]
    fn test_manual_removal_action_and_result() {
        let mut state = ready_state(Arc::new(FakeApi::default()));
        state.focus = Focus::Removal;
        state.handle_key(key(KeyCode::F(2)));
        state.comment_id.set("id: UgxAbc-1_2 ");

        let action = state.submit();
        match action {
            Some(Action::RemoveComment { intent, .. }) => {
                assert_eq!(intent.comment_id.as_str(), "UgxAbc-1_2");
                assert!(intent.ban_author);
            }
            other => panic!("unexpected {:?}", other),
        }

        state.handle_worker(WorkerEvent::RemoveFinished {
            comment_id: CommentId::from_string("UgxAbc-1_2"),
            result: Ok(()),
        });
        assert_eq!(state.removals_in_flight, 0);
        assert_eq!(
            state.notice.as_ref().unwrap().message,
            "Removed comment with id: UgxAbc-1_2"
        );
    }

    #[test]
    fn test_manual_removal_failure_text() {
        let mut state = ready_state(Arc::new(FakeApi::default()));
        state.handle_worker(WorkerEvent::RemoveFinished {
            comment_id: CommentId::from_string("Ugx1"),
            result: Err(SweepError::Transport {
                status: 403,
                reason: "forbidden".to_string(),
                message: "nope".to_string(),
            }),
        });
        assert_eq!(
            state.notice.as_ref().unwrap().message,
            "Failed to remove comments: API error 403 (forbidden): nope"
        );

        state.handle_worker(WorkerEvent::RemoveFinished {
            comment_id: CommentId::from_string("Ugx1"),
            result: Err(SweepError::Unexpected("boom".to_string())),
        });
        assert_eq!(
            state.notice.as_ref().unwrap().message,
            "An unexpected error occurred: boom"
        );
    }

    #[test]
    fn test_ai_removal_is_silent_without_comments_or_model() {
        let mut state = AppState::new(Session::default());
        state.session.set_api(Arc::new(FakeApi::default()), "cs.json");
        state.session.ai_assisted = true;
        state.focus = Focus::Removal;

        assert!(state.submit().is_none());
        assert!(state.notice.is_none());
        assert!(matches!(state.sweep.state(), SweepState::Idle));

        state.session.replace_comments(sample_set());
        assert!(state.submit().is_none());
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_ai_mode_disables_comment_id_input() {
        let mut state = ready_state(Arc::new(FakeApi::default()));
        state.focus = Focus::Removal;
        state.handle_key(key(KeyCode::F(3)));
        type_text(&mut state, "Ugx1");
        assert!(state.comment_id.is_empty());
    }

    fn start_review(state: &mut AppState) {
        state.session.ai_assisted = true;
        state.focus = Focus::Removal;
        let Some(Action::Predict(job)) = state.submit() else {
            panic!("expected a prediction job");
        };
        state.handle_worker(WorkerEvent::PredictionFinished(job.run()));
    }

    #[test]
    fn test_review_confirm_and_done() {
        let api = Arc::new(FakeApi::default());
        let mut state = ready_state(api.clone());
        state.session.ban_author = true;
        start_review(&mut state);

        assert!(state.is_reviewing());
        let ids: Vec<&str> = state.flagged().unwrap().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Ugx2", "Ugx4"]);

        let Some(Action::ApplyBatch { api: batch_api, batch }) = state.handle_key(key(KeyCode::Enter))
        else {
            panic!("expected a batch");
        };
        assert!(state.is_reviewing());
        assert!(state.handle_key(key(KeyCode::Esc)).is_none());
        assert!(matches!(state.sweep.state(), SweepState::Applying { total: 2 }));

        let outcome = batch.apply(batch_api.as_ref());
        state.handle_worker(WorkerEvent::BatchFinished(outcome));

        let calls = api.moderation_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.ban_author));
        assert_eq!(state.notice.as_ref().unwrap().message, "Removed 2 comments");
        assert!(!state.is_reviewing());
        assert!(matches!(state.sweep.state(), SweepState::Idle));
    }

    #[test]
    fn test_review_dismiss_all_cancels() {
        let api = Arc::new(FakeApi::default());
        let mut state = ready_state(api.clone());
        start_review(&mut state);

        state.handle_key(key(KeyCode::Char('x')));
        assert_eq!(state.flagged().unwrap().len(), 1);
        state.handle_key(key(KeyCode::Delete));

        assert!(!state.is_reviewing());
        assert!(matches!(state.sweep.state(), SweepState::Idle));
        assert!(api.moderation_calls().is_empty());
        assert_eq!(state.message.as_deref(), Some("Removal cancelled"));
    }

    #[test]
    fn test_review_escape_cancels() {
        let api = Arc::new(FakeApi::default());
        let mut state = ready_state(api.clone());
        start_review(&mut state);

        assert!(state.handle_key(key(KeyCode::Esc)).is_none());
        assert!(!state.is_reviewing());
        assert!(api.moderation_calls().is_empty());
    }

    #[test]
    fn test_review_dismiss_selected_entry() {
        let mut state = ready_state(Arc::new(FakeApi::default()));
        start_review(&mut state);

        state.handle_key(key(KeyCode::Down));
        state.handle_key(key(KeyCode::Char('x')));
        let ids: Vec<&str> = state.flagged().unwrap().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Ugx2"]);
        assert_eq!(state.selected_flagged, 0);
    }

    #[test]
    fn test_nothing_flagged() {
        let classifier = Arc::new(KeywordClassifier::new(["lottery"]));
        let mut state = AppState::new(Session::new(Some(classifier)));
        state.session.set_api(Arc::new(FakeApi::default()), "cs.json");
        state.session.replace_comments(sample_set());
        start_review(&mut state);

        assert!(!state.is_reviewing());
        assert_eq!(
            state.notice,
            Some(Notice::new(NoticeLevel::Info, "No flagged comment to remove."))
        );
    }

    #[test]
    fn test_prediction_failure() {
        let classifier = Arc::new(KeywordClassifier::failing("model exploded"));
        let mut state = AppState::new(Session::new(Some(classifier)));
        state.session.set_api(Arc::new(FakeApi::default()), "cs.json");
        state.session.replace_comments(sample_set());
        start_review(&mut state);

        assert_eq!(state.comments().unwrap().len(), 4);
        assert!(state.flagged().is_none());
        assert_eq!(
            state.notice,
            Some(Notice::new(
                NoticeLevel::Error,
                "AI Prediction failed: model exploded"
            ))
        );
    }

    #[test]
    fn test_batch_failure_reports_progress() {
        let api = Arc::new(FakeApi::default().fail_moderation_at(1));
        let mut state = ready_state(api.clone());
        start_review(&mut state);

        let Some(Action::ApplyBatch { api: batch_api, batch }) = state.handle_key(key(KeyCode::Enter))
        else {
            panic!("expected a batch");
        };
        state.handle_worker(WorkerEvent::BatchFinished(batch.apply(batch_api.as_ref())));

        assert_eq!(api.moderation_calls().len(), 2);
        assert_eq!(
            state.notice.as_ref().unwrap().message,
            "Failed to remove comments: API error 403 (forbidden): The caller does not have permission (1 of 2 removed)"
        );
        assert!(matches!(state.sweep.state(), SweepState::Idle));
    }

    #[test]
    fn test_second_ai_request_while_reviewing_is_ignored() {
        let mut state = ready_state(Arc::new(FakeApi::default()));
        start_review(&mut state);
        assert!(state.sweep.begin(&state.session).is_none());
        assert!(state.is_reviewing());
    }

    #[test]
    fn test_notice_swallows_next_key() {
        let mut state = AppState::new(Session::default());
        state.notice = Some(Notice::new(NoticeLevel::Info, "hi"));
        assert!(state.handle_key(key(KeyCode::F(1))).is_none());
        assert!(state.notice.is_none());
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_overlays() {
        let mut state = AppState::new(Session::default());
        state.handle_key(key(KeyCode::F(1)));
        assert_eq!(state.overlay, Some(Overlay::Help));
        state.handle_key(key(KeyCode::Char('a')));
        assert!(state.overlay.is_none());
        assert!(state.credentials.is_empty());

        assert!(matches!(state.handle_key(key(KeyCode::F(4))), Some(Action::ShowLogs)));
        state.show_logs(None);
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.overlay, Some(Overlay::Logs { content: None, scroll: 1 }));
        state.handle_key(key(KeyCode::Esc));
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_quit_keys() {
        let mut state = AppState::new(Session::default());
        state.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);

        let mut state = AppState::new(Session::default());
        state.handle_key(key(KeyCode::F(10)));
        assert!(state.should_quit);
    }

    #[test]
    fn test_latency_updates() {
        let mut state = AppState::new(Session::default());
        assert_eq!(state.latency, Latency::Unknown);
        state.handle_worker(WorkerEvent::Latency(Some(Duration::from_millis(42))));
        assert_eq!(state.latency, Latency::Connected(Duration::from_millis(42)));
        state.handle_worker(WorkerEvent::Latency(None));
        assert_eq!(state.latency, Latency::Disconnected);
    }
}
