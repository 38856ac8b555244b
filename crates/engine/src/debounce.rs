//! Input debouncing.
//!
//! [`Debouncer`] is the timing state machine; it takes `now` explicitly so it
//! can be driven by any event loop. [`debounced`] wraps it in a tokio task with
//! channel endpoints for callers that just want stabilized values.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::EngineError;

struct Pending<T> {
    value: T,
    due: Instant,
}

/// Emits a value only once it has stayed unchanged for `delay`.
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T: PartialEq> Debouncer<T> {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Records a new input value.
    ///
    /// Returns the value straight back when the delay is zero. Otherwise the
    /// pending value is replaced and its timer restarted, unless `value` equals
    /// what is already pending.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        if self.delay.is_zero() {
            self.pending = None;
            return Some(value);
        }
        if self.pending.as_ref().is_some_and(|p| p.value == value) {
            return None;
        }
        self.pending = Some(Pending { value, due: now + self.delay });
        None
    }

    /// When the pending value becomes ready, if there is one.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value if its quiet period has elapsed at `now`.
    pub fn poll_ready(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| p.due <= now) {
            return self.pending.take().map(|p| p.value);
        }
        None
    }

    /// Drops the pending value without emitting it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

/// Input side of a [`debounced`] pair.
///
/// Dropping it (or calling [`DebouncedSender::shutdown`]) cancels whatever is
/// pending; the receiver then yields `None`.
pub struct DebouncedSender<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T> DebouncedSender<T> {
    pub fn send(&self, value: T) -> Result<(), EngineError> {
        self.input.send(value).map_err(|_| EngineError::InputClosed)
    }

    /// Stops the timer task; a pending value is discarded, not emitted.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Output side of a [`debounced`] pair.
pub struct DebouncedReceiver<T> {
    output: mpsc::UnboundedReceiver<T>,
}

impl<T> DebouncedReceiver<T> {
    /// Next stabilized value; `None` once the sender is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.output.recv().await
    }
}

/// Spawns a debouncing task on the current tokio runtime.
pub fn debounced<T>(delay: Duration) -> (DebouncedSender<T>, DebouncedReceiver<T>)
where
    T: PartialEq + Send + 'static,
{
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (output_tx, output_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_debouncer(Debouncer::new(delay), input_rx, output_tx));
    (DebouncedSender { input: input_tx, task }, DebouncedReceiver { output: output_rx })
}

async fn run_debouncer<T: PartialEq>(
    mut debouncer: Debouncer<T>,
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
) {
    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            biased;
            incoming = input.recv() => {
                let Some(value) = incoming else {
                    if debouncer.cancel() {
                        tracing::debug!("debouncer closed with a pending value; discarded");
                    }
                    break;
                };
                if let Some(ready) = debouncer.push(value, Instant::now()) {
                    if output.send(ready).is_err() {
                        break;
                    }
                }
            },
            () = sleep_until(deadline) => {
                if let Some(ready) = debouncer.poll_ready(Instant::now()) {
                    if output.send(ready).is_err() {
                        break;
                    }
                }
            },
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl<T> Drop for DebouncedSender<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
