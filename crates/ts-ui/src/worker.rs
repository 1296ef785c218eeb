//! Background tasks
//!
//! One thread per operator action. A task sends exactly one final
//! [`WorkerEvent`], built from the task's panic payload if it panics, so the
//! front end always hears back.

use crate::events::WorkerEvent;
use crossbeam_channel::Sender;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Name prefix of every task thread
const THREAD_PREFIX: &str = "tubesweep-";

/// Cancellation flag shared with a running task
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle on a spawned task
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Task name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask the task to stop at its next check
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the thread to exit
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Whether the calling thread was started by [`spawn_task`].
///
/// Panics on these threads are caught and reported as events, so they must
/// not tear down the terminal.
pub fn is_task_thread() -> bool {
    thread::current()
        .name()
        .is_some_and(|name| name.starts_with(THREAD_PREFIX))
}

/// Human-readable panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Run `task` on its own thread and send its result.
///
/// If `task` panics, `on_panic` turns the panic message into the event sent
/// instead.
pub fn spawn_task<F, P>(
    name: &'static str,
    sender: Sender<WorkerEvent>,
    task: F,
    on_panic: P,
) -> TaskHandle
where
    F: FnOnce(&CancelToken, &Sender<WorkerEvent>) -> WorkerEvent + Send + 'static,
    P: FnOnce(String) -> WorkerEvent + Send + 'static,
{
    let cancel = CancelToken::default();
    let token = cancel.clone();

    let spawned = thread::Builder::new()
        .name(format!("{}{}", THREAD_PREFIX, name))
        .spawn(move || {
            debug!("Task {} started", name);
            let event = match panic::catch_unwind(AssertUnwindSafe(|| task(&token, &sender))) {
                Ok(event) => event,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Task {} panicked: {}", name, message);
                    on_panic(message)
                }
            };
            if sender.send(event).is_err() {
                debug!("Task {} finished after the UI closed", name);
            }
        });

    let thread = match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("Failed to spawn task {}: {}", name, e);
            None
        }
    };

    TaskHandle {
        name,
        cancel,
        thread,
    }
}
