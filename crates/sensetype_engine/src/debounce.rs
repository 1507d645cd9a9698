use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

enum Command<T> {
    Call(T),
    Cancel,
}

/// Trailing-edge debouncer: after a burst of `call`s, delivers only the last
/// call's arguments to the action, once the quiet period `wait` has elapsed.
///
/// The timer runs on a task spawned on the given runtime. Handles are cheap
/// to clone and keep a stable `call`/`cancel` identity for the lifetime of
/// the surface that holds them. Dropping every handle stops the task and
/// discards any pending delivery.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(handle: &Handle, wait: Duration, mut action: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle.spawn(async move {
            let timer = sleep(Duration::ZERO);
            tokio::pin!(timer);
            let mut pending: Option<T> = None;
            loop {
                tokio::select! {
                    command = rx.recv() => match command {
                        Some(Command::Call(args)) => {
                            pending = Some(args);
                            timer.as_mut().reset(Instant::now() + wait);
                        }
                        Some(Command::Cancel) => {
                            pending = None;
                        }
                        // All handles dropped: discard pending work and stop.
                        None => break,
                    },
                    () = timer.as_mut(), if pending.is_some() => {
                        if let Some(args) = pending.take() {
                            action(args);
                        }
                    }
                }
            }
        });
        Self { tx }
    }

    /// Schedules `args` for delivery after the quiet period, replacing any
    /// pending delivery. A zero `wait` still defers to the next scheduling
    /// opportunity, never invoking the action synchronously.
    pub fn call(&self, args: T) {
        let _ = self.tx.send(Command::Call(args));
    }

    /// Discards any pending delivery. Idempotent; a later `call` re-arms
    /// a fresh schedule.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }
}
