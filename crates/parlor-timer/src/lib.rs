//! Cancellable scheduled tasks for Parlor entities.
//!
//! Every timed behavior in the server — snake ticks, invite TTLs, the
//! store's debounced flush — is a task that sleeps and then delivers an
//! event onto an `mpsc` channel, where the owning actor processes it on
//! its single timeline. The handle returned here is kept on the owning
//! entity and aborted synchronously the moment that entity reaches a
//! terminal state, so no timer ever fires against destroyed state.
//!
//! A fired-but-unprocessed event can still sit in the channel when its
//! entity dies; receivers handle that by treating a lookup miss as a
//! stale event and dropping it.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{self, MissedTickBehavior};

/// Handle to a scheduled task.
///
/// Cancelling (or dropping) the handle aborts the task immediately; a
/// task that already delivered its event is unaffected. Cancellation is
/// synchronous — after `cancel()` returns, no further event will be
/// queued by this timer.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    /// Stops the timer. Idempotent.
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Spawns a fixed-period repeating timer.
///
/// The first event is delivered one full `period` after the call, then
/// once per period. Missed ticks are skipped rather than bursted, so a
/// stalled receiver never sees a catch-up flood. The task exits on its
/// own if the receiving side is gone.
pub fn repeating<E>(
    period: Duration,
    tx: UnboundedSender<E>,
    event: E,
) -> TimerHandle
where
    E: Clone + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick resolves immediately; swallow it so
        // firing starts one period out.
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(event.clone()).is_err() {
                tracing::trace!("timer receiver dropped, stopping");
                break;
            }
        }
    });
    TimerHandle {
        abort: task.abort_handle(),
    }
}

/// Spawns a one-shot timer that delivers `event` after `delay`.
pub fn oneshot<E>(delay: Duration, tx: UnboundedSender<E>, event: E) -> TimerHandle
where
    E: Send + 'static,
{
    let task = tokio::spawn(async move {
        time::sleep(delay).await;
        let _ = tx.send(event);
    });
    TimerHandle {
        abort: task.abort_handle(),
    }
}
