//! Terminal setup and the main loop

use super::state::{Action, AppState};
use crate::events::{Event, WorkerEvent};
use crate::render;
use crate::theme::Theme;
use crate::worker::{self, spawn_task, CancelToken, TaskHandle};
use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use ts_client::LatencyProbe;
use ts_core::api::Authenticator;
use ts_core::error::SweepError;
use ts_core::pipeline::{fetch_all_with, BatchOutcome};

/// Collaborators the front end hands work to
pub struct Services {
    /// Credential flow
    pub authenticator: Arc<dyn Authenticator>,
    /// Connectivity probe for the footer, `None` to skip probing
    pub probe: Option<LatencyProbe>,
    /// Activity log shown by the log viewer
    pub log_path: PathBuf,
    /// Input poll interval
    pub tick_rate: Duration,
    /// Time between connectivity probes
    pub ping_interval: Duration,
}

/// Main application
pub struct App {
    /// Application state
    pub state: AppState,
    services: Services,
    theme: Theme,
    /// Terminal
    terminal: Terminal<CrosstermBackend<Stdout>>,
    sender: Sender<WorkerEvent>,
    receiver: Receiver<WorkerEvent>,
    tasks: Vec<TaskHandle>,
}

impl App {
    /// Take over the terminal
    pub fn new(state: AppState, services: Services) -> Result<Self> {
        // Install panic hook to restore terminal on panic. Task panics are
        // caught and reported as events instead.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if worker::is_task_thread() {
                return;
            }
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
            original_hook(panic_info);
        }));

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let (sender, receiver) = unbounded();

        Ok(Self {
            state,
            services,
            theme: Theme::default(),
            terminal,
            sender,
            receiver,
            tasks: Vec::new(),
        })
    }

    /// Run the main application loop
    pub fn run(&mut self) -> Result<()> {
        if let Some(probe) = self.services.probe.clone() {
            let interval = self.services.ping_interval;
            self.tasks.push(spawn_ping(probe, interval, self.sender.clone()));
        }

        loop {
            self.draw()?;

            for event in self.next_events()? {
                let action = match event {
                    Event::Input(key) => self.state.handle_key(key),
                    Event::Paste(text) => {
                        self.state.handle_paste(&text);
                        None
                    }
                    Event::Worker(worker_event) => self.state.handle_worker(worker_event),
                    Event::Resize(..) | Event::Tick => None,
                };
                if let Some(action) = action {
                    self.dispatch(action);
                }
            }

            self.tasks.retain(|task| !task.is_finished());

            if self.state.should_quit {
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Draw the UI
    fn draw(&mut self) -> Result<()> {
        let state = &self.state;
        let theme = &self.theme;
        self.terminal
            .draw(|frame| render::render(frame, state, theme))?;
        Ok(())
    }

    /// Wait up to one tick for terminal input, then drain worker results
    fn next_events(&mut self) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        if event::poll(self.services.tick_rate)? {
            match event::read()? {
                event::Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events.push(Event::Input(key))
                }
                event::Event::Paste(text) => events.push(Event::Paste(text)),
                event::Event::Resize(w, h) => events.push(Event::Resize(w, h)),
                _ => {}
            }
        } else {
            events.push(Event::Tick);
        }

        events.extend(self.receiver.try_iter().map(Event::Worker));
        Ok(events)
    }

    fn dispatch(&mut self, action: Action) {
        debug!("Dispatching {:?}", action);
        match action {
            Action::ShowLogs => {
                let content = match ts_storage::read_activity_log(&self.services.log_path) {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Failed to read activity log: {}", e);
                        None
                    }
                };
                self.state.show_logs(content);
            }
            other => {
                if let Some(task) =
                    spawn_action(other, &self.services.authenticator, &self.sender)
                {
                    self.tasks.push(task);
                }
            }
        }
    }

    /// Stop background work before the terminal is restored
    fn shutdown(&mut self) {
        let running = release_tasks(std::mem::take(&mut self.tasks));
        if running > 0 {
            debug!("{} task(s) still running at exit", running);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

const PING_TASK: &str = "ping";

/// Display name of a credentials file
fn credentials_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Start the background task for `action`. `ShowLogs` is handled inline by
/// the caller and yields `None` here.
pub(crate) fn spawn_action(
    action: Action,
    authenticator: &Arc<dyn Authenticator>,
    sender: &Sender<WorkerEvent>,
) -> Option<TaskHandle> {
    let handle = match action {
        Action::Authenticate { credentials } => {
            let authenticator = Arc::clone(authenticator);
            let name = credentials_name(&credentials);
            let panic_name = name.clone();
            spawn_task(
                "auth",
                sender.clone(),
                move |_, tx| {
                    let result = authenticator.authenticate(&credentials, &mut |url: &str| {
                        let _ = tx.send(WorkerEvent::ConsentUrl(url.to_string()));
                    });
                    WorkerEvent::AuthFinished {
                        credentials_name: name,
                        result,
                    }
                },
                move |message| WorkerEvent::AuthFinished {
                    credentials_name: panic_name,
                    result: Err(SweepError::Unexpected(message)),
                },
            )
        }
        Action::LoadComments {
            api,
            video_id,
            page_size,
        } => spawn_task(
            "load",
            sender.clone(),
            move |_, tx| {
                let result = fetch_all_with(api.as_ref(), &video_id, page_size, |pages, comments| {
                    let _ = tx.send(WorkerEvent::LoadProgress { pages, comments });
                });
                WorkerEvent::LoadFinished(result)
            },
            |message| WorkerEvent::LoadFinished(Err(SweepError::Unexpected(message))),
        ),
        Action::RemoveComment { api, intent } => {
            let comment_id = intent.comment_id.clone();
            spawn_task(
                "remove",
                sender.clone(),
                move |_, _| WorkerEvent::RemoveFinished {
                    comment_id: intent.comment_id.clone(),
                    result: intent.apply(api.as_ref()),
                },
                move |message| WorkerEvent::RemoveFinished {
                    comment_id,
                    result: Err(SweepError::Unexpected(message)),
                },
            )
        }
        Action::Predict(job) => spawn_task(
            "predict",
            sender.clone(),
            move |_, _| WorkerEvent::PredictionFinished(job.run()),
            |message| WorkerEvent::PredictionFinished(Err(SweepError::Prediction(message))),
        ),
        Action::ApplyBatch { api, batch } => {
            let total = batch.len();
            spawn_task(
                "batch",
                sender.clone(),
                move |_, _| WorkerEvent::BatchFinished(batch.apply(api.as_ref())),
                move |message| {
                    WorkerEvent::BatchFinished(BatchOutcome {
                        total,
                        applied: Vec::new(),
                        error: Some(SweepError::Unexpected(message)),
                    })
                },
            )
        }
        Action::ShowLogs => return None,
    };
    Some(handle)
}

/// Probe connectivity every `interval` until cancelled
fn spawn_ping(probe: LatencyProbe, interval: Duration, sender: Sender<WorkerEvent>) -> TaskHandle {
    spawn_task(
        PING_TASK,
        sender,
        move |cancel, tx| {
            let mut last = None;
            while !cancel.is_cancelled() {
                last = probe.measure();
                if tx.send(WorkerEvent::Latency(last)).is_err() {
                    break;
                }
                sleep_unless_cancelled(cancel, interval);
            }
            WorkerEvent::Latency(last)
        },
        |_| WorkerEvent::Latency(None),
    )
}

/// Cancel every task without waiting for it.
///
/// The ping loop stops at its next check; a request in flight is left to
/// time out on its own. Returns how many tasks were still running.
fn release_tasks(tasks: Vec<TaskHandle>) -> usize {
    tasks
        .into_iter()
        .filter(|task| {
            task.cancel();
            !task.is_finished()
        })
        .count()
}

fn sleep_unless_cancelled(cancel: &CancelToken, duration: Duration) {
    const STEP: Duration = Duration::from_millis(50);
    let deadline = Instant::now() + duration;
    while !cancel.is_cancelled() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(STEP.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ts_core::comment::{Comment, CommentPage};
    use ts_core::pipeline::ModerationIntent;
    use ts_core::testing::{FakeApi, FakeAuthenticator};
    use ts_core::types::VideoId;

    fn collect(handle: TaskHandle, receiver: &Receiver<WorkerEvent>) -> Vec<WorkerEvent> {
        handle.join();
        receiver.try_iter().collect()
    }

    fn fake_auth() -> Arc<dyn Authenticator> {
        Arc::new(FakeAuthenticator::failing())
    }

    #[test]
    fn test_credentials_name() {
        assert_eq!(
            credentials_name(Path::new("/home/op/client_secret.json")),
            "client_secret.json"
        );
    }

    #[test]
    fn test_auth_task_reports_consent_url_first() {
        let (tx, rx) = unbounded();
        let authenticator: Arc<dyn Authenticator> = Arc::new(
            FakeAuthenticator::succeeding(Arc::new(FakeApi::default()))
                .with_consent_url("https://accounts.example/consent"),
        );

        let handle = spawn_action(
            Action::Authenticate {
                credentials: PathBuf::from("/tmp/cs.json"),
            },
            &authenticator,
            &tx,
        )
        .unwrap();
        let events = collect(handle, &rx);

        assert_eq!(events.len(), 2);
        assert!(
            matches!(&events[0], WorkerEvent::ConsentUrl(url) if url == "https://accounts.example/consent")
        );
        match &events[1] {
            WorkerEvent::AuthFinished {
                credentials_name,
                result,
            } => {
                assert_eq!(credentials_name, "cs.json");
                assert!(result.is_ok());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_task_reports_progress() {
        let (tx, rx) = unbounded();
        let api = Arc::new(FakeApi::new(vec![
            CommentPage::new(vec![Comment::new("Ugx1", "@a", "one")], Some("p2".to_string())),
            CommentPage::new(vec![Comment::new("Ugx2", "@b", "two")], None),
        ]));

        let handle = spawn_action(
            Action::LoadComments {
                api,
                video_id: VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap(),
                page_size: 100,
            },
            &fake_auth(),
            &tx,
        )
        .unwrap();
        let events = collect(handle, &rx);

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], WorkerEvent::LoadProgress { pages: 1, comments: 1 }));
        assert!(matches!(events[1], WorkerEvent::LoadProgress { pages: 2, comments: 2 }));
        match &events[2] {
            WorkerEvent::LoadFinished(Ok(set)) => assert_eq!(set.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_remove_task() {
        let (tx, rx) = unbounded();
        let api = Arc::new(FakeApi::default());
        let intent = ModerationIntent::from_input("Ugx42", true).unwrap();

        let handle = spawn_action(
            Action::RemoveComment {
                api: api.clone(),
                intent,
            },
            &fake_auth(),
            &tx,
        )
        .unwrap();
        let events = collect(handle, &rx);

        assert!(matches!(
            &events[..],
            [WorkerEvent::RemoveFinished { comment_id, result: Ok(()) }] if comment_id.as_str() == "Ugx42"
        ));
        assert_eq!(api.moderation_calls().len(), 1);
        assert!(api.moderation_calls()[0].ban_author);
    }

    #[test]
    fn test_show_logs_spawns_nothing() {
        let (tx, _rx) = unbounded();
        assert!(spawn_action(Action::ShowLogs, &fake_auth(), &tx).is_none());
    }

    #[test]
    fn test_sleep_returns_when_cancelled() {
        let cancel = CancelToken::default();
        cancel.cancel();
        let started = Instant::now();
        sleep_unless_cancelled(&cancel, Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_release_does_not_wait_for_blocked_task() {
        let (tx, _rx) = unbounded();
        let (unblock, blocked) = unbounded::<()>();
        let stuck = spawn_task(
            PING_TASK,
            tx,
            move |_, _| {
                let _ = blocked.recv();
                WorkerEvent::Latency(None)
            },
            |_| WorkerEvent::Latency(None),
        );

        let started = Instant::now();
        assert_eq!(release_tasks(vec![stuck]), 1);
        assert!(started.elapsed() < Duration::from_secs(1));

        drop(unblock);
    }
}
