//! Hosting a session on the tokio runtime.
//!
//! The session itself is synchronous; the driver feeds it input events from a
//! channel and wakes it when its next timer is due, all on one task, so
//! events and ticks are applied strictly in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::carry::InputEvent;
use crate::session::{MatchingSession, SessionOutcome};
use crate::targets::DropTargets;

/// Receives the outcome of a session.
pub trait CompletionHandler: Send {
    /// Called exactly once per session.
    fn on_complete(&mut self, outcome: &SessionOutcome);
}

impl<F> CompletionHandler for F
where
    F: FnMut(&SessionOutcome) + Send,
{
    fn on_complete(&mut self, outcome: &SessionOutcome) {
        self(outcome)
    }
}

/// Drive `session` until it is submitted.
///
/// A closed input channel does not end the session; the countdown still
/// runs out. Returns `None` only if the session was torn down before it
/// could submit.
pub async fn run_session(
    mut session: MatchingSession,
    mut inputs: mpsc::Receiver<InputEvent>,
    targets: &(dyn DropTargets + Sync),
    handler: &mut dyn CompletionHandler,
) -> Option<SessionOutcome> {
    let start = Instant::now();
    let mut inputs_open = true;

    loop {
        let deadline = session.next_deadline();
        let wake_at = deadline.map(|d| start + d).unwrap_or(start);

        tokio::select! {
            received = inputs.recv(), if inputs_open => match received {
                Some(event) => {
                    session.handle(start.elapsed(), event, targets);
                }
                None => {
                    tracing::debug!("input channel closed, waiting on the countdown");
                    inputs_open = false;
                }
            },
            _ = sleep_until(wake_at), if deadline.is_some() => {}
            else => break,
        }

        if let Some(outcome) = session.advance_to(start.elapsed()) {
            handler.on_complete(&outcome);
            return Some(outcome);
        }
    }

    tracing::warn!("session ended without submitting");
    None
}

/// Run a session on its own task.
///
/// Returns the sender for input events and the task handle, which resolves
/// to the outcome.
pub fn spawn_session<T>(
    session: MatchingSession,
    targets: Arc<T>,
    mut handler: Box<dyn CompletionHandler>,
) -> (mpsc::Sender<InputEvent>, JoinHandle<Option<SessionOutcome>>)
where
    T: DropTargets + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel(64);
    let task = tokio::spawn(async move {
        run_session(session, rx, targets.as_ref(), handler.as_mut()).await
    });
    (tx, task)
}
