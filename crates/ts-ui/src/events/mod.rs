//! Event handling
//!
//! The front-end loop consumes terminal input and the results background
//! workers send back over a channel.

use crossterm::event::KeyEvent;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use ts_core::api::CommentApi;
use ts_core::comment::{CommentSet, FlaggedSet};
use ts_core::error::Result;
use ts_core::pipeline::BatchOutcome;
use ts_core::types::CommentId;

/// Application events
#[derive(Debug)]
pub enum Event {
    /// Keyboard input
    Input(KeyEvent),
    /// Pasted text
    Paste(String),
    /// Terminal resize
    Resize(u16, u16),
    /// Periodic tick
    Tick,
    /// A background worker reported back
    Worker(WorkerEvent),
}

/// Messages sent by background workers
pub enum WorkerEvent {
    /// The OAuth flow needs the operator to open this URL
    ConsentUrl(String),
    /// Credential flow finished
    AuthFinished {
        credentials_name: String,
        result: Result<Arc<dyn CommentApi>>,
    },
    /// Another page of comments arrived
    LoadProgress { pages: usize, comments: usize },
    /// Paginated load finished
    LoadFinished(Result<CommentSet>),
    /// Manual removal finished
    RemoveFinished {
        comment_id: CommentId,
        result: Result<()>,
    },
    /// Classifier run finished
    PredictionFinished(Result<FlaggedSet>),
    /// Confirmed batch finished
    BatchFinished(BatchOutcome),
    /// Connectivity probe result
    Latency(Option<Duration>),
}

impl fmt::Debug for WorkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerEvent::ConsentUrl(url) => f.debug_tuple("ConsentUrl").field(url).finish(),
            WorkerEvent::AuthFinished {
                credentials_name,
                result,
            } => f
                .debug_struct("AuthFinished")
                .field("credentials_name", credentials_name)
                .field("ok", &result.is_ok())
                .finish(),
            WorkerEvent::LoadProgress { pages, comments } => f
                .debug_struct("LoadProgress")
                .field("pages", pages)
                .field("comments", comments)
                .finish(),
            WorkerEvent::LoadFinished(result) => f
                .debug_tuple("LoadFinished")
                .field(&result.as_ref().map(|set| set.len()))
                .finish(),
            WorkerEvent::RemoveFinished { comment_id, result } => f
                .debug_struct("RemoveFinished")
                .field("comment_id", comment_id)
                .field("result", result)
                .finish(),
            WorkerEvent::PredictionFinished(result) => f
                .debug_tuple("PredictionFinished")
                .field(&result.as_ref().map(|set| set.len()))
                .finish(),
            WorkerEvent::BatchFinished(outcome) => {
                f.debug_tuple("BatchFinished").field(outcome).finish()
            }
            WorkerEvent::Latency(latency) => f.debug_tuple("Latency").field(latency).finish(),
        }
    }
}
