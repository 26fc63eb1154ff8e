//! Delayed work.
//!
//! A single `tessera-timer` thread drives a current-thread Tokio runtime. Each
//! scheduled message sleeps on that runtime and is then posted to the owner
//! thread. There is no cancellation: the owner compares the generation a message
//! carries with the latest one and drops stale messages.

use std::cell::{Cell, RefCell};
use std::io;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::{debug, error};

use crate::platform::{OwnerHandle, OwnerMessage, spawn_named_thread};

/// Delay before a window ignored by a processor is laid out again.
pub const RELAYOUT_DELAY: Duration = Duration::from_millis(750);

/// Delay before monitors are re-enumerated after a display or session change.
pub const MONITOR_RESCAN_DELAY: Duration = Duration::from_millis(1500);

/// Posts a message to the owner thread after a delay.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, message: OwnerMessage);
}

pub struct Timer {
    tx: UnboundedSender<(Duration, OwnerMessage)>,
}

impl Timer {
    /// Starts the timer thread. It stops when the `Timer` is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn start(owner: OwnerHandle) -> io::Result<Self> {
        let (tx, mut rx) = unbounded_channel::<(Duration, OwnerMessage)>();

        spawn_named_thread("timer", move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(error = %err, "failed to build timer runtime");
                    return;
                }
            };

            runtime.block_on(async move {
                while let Some((delay, message)) = rx.recv().await {
                    let owner = owner.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        owner.post(message);
                    });
                }
            });
            debug!("timer thread stopped");
        })?;

        Ok(Self { tx })
    }
}

impl Scheduler for Timer {
    fn schedule(&self, delay: Duration, message: OwnerMessage) {
        if self.tx.send((delay, message)).is_err() {
            error!("timer thread is gone, delayed message dropped");
        }
    }
}

/// Keeps scheduled messages instead of sending them. The caller decides when
/// they fire.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: RefCell<Vec<(Duration, OwnerMessage)>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Removes and returns everything scheduled so far.
    pub fn take(&self) -> Vec<(Duration, OwnerMessage)> { std::mem::take(&mut *self.pending.borrow_mut()) }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, message: OwnerMessage) { self.pending.borrow_mut().push((delay, message)); }
}

/// A monotonically increasing counter stamped on delayed messages.
#[derive(Debug, Default)]
pub struct Generation(Cell<u64>);

impl Generation {
    /// Supersedes every earlier generation and returns the new one.
    pub fn advance(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool { self.0.get() == generation }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_posts_after_delay() {
        let (owner, mut queue) = OwnerHandle::channel();
        let timer = Timer::start(owner).unwrap();

        timer.schedule(Duration::from_millis(10), OwnerMessage::RescanMonitors { generation: 1 });
        assert_eq!(queue.blocking_next(), Some(OwnerMessage::RescanMonitors { generation: 1 }));
    }

    #[test]
    fn test_shorter_delay_fires_first() {
        let (owner, mut queue) = OwnerHandle::channel();
        let timer = Timer::start(owner).unwrap();

        timer.schedule(Duration::from_millis(300), OwnerMessage::Shutdown);
        timer.schedule(Duration::from_millis(5), OwnerMessage::ReloadKeybindings);
        assert_eq!(queue.blocking_next(), Some(OwnerMessage::ReloadKeybindings));
        assert_eq!(queue.blocking_next(), Some(OwnerMessage::Shutdown));
    }

    #[test]
    fn test_generation_supersedes() {
        let generation = Generation::default();
        let first = generation.advance();
        let second = generation.advance();

        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn test_manual_scheduler_records() {
        let scheduler = ManualScheduler::new();
        scheduler.schedule(RELAYOUT_DELAY, OwnerMessage::Shutdown);

        assert_eq!(scheduler.take(), vec![(RELAYOUT_DELAY, OwnerMessage::Shutdown)]);
        assert!(scheduler.take().is_empty());
    }
}
