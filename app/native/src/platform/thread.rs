//! Threads and the owner-thread queue.
//!
//! The store and every window handle belong to the owner thread. Other threads
//! never touch them: they post an [`OwnerMessage`] through an [`OwnerHandle`], and
//! the owner loop handles it between OS callbacks.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::native::WindowHandle;

pub fn spawn_named_thread<F>(name: &str, task: F) -> io::Result<JoinHandle<()>>
where F: FnOnce() + Send + 'static {
    let thread_name = format!("tessera-{name}");

    thread::Builder::new().name(thread_name.clone()).spawn(task).inspect_err(|err| {
        tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
    })
}

/// Work handed to the owner thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerMessage {
    /// Lay out the workspace of `window` again, unless a later request superseded
    /// this one.
    RelayoutWindow { window: WindowHandle, generation: u64 },
    /// Re-enumerate the monitors, unless a later request superseded this one.
    RescanMonitors { generation: u64 },
    /// The config file changed on disk.
    ReloadKeybindings,
    Shutdown,
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Sending half of the owner queue. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct OwnerHandle {
    tx: UnboundedSender<OwnerMessage>,
    waker: Option<Waker>,
}

impl OwnerHandle {
    #[must_use]
    pub fn channel() -> (Self, OwnerQueue) {
        let (tx, rx) = unbounded_channel();
        (Self { tx, waker: None }, OwnerQueue { rx })
    }

    /// Adds a callback run after each post, used to wake a blocked OS message loop.
    #[must_use]
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Queues a message. Returns `false` when the owner loop is gone.
    pub fn post(&self, message: OwnerMessage) -> bool {
        if let Err(err) = self.tx.send(message) {
            tracing::debug!(message = ?err.0, "owner queue closed, message dropped");
            return false;
        }
        if let Some(waker) = &self.waker {
            waker();
        }
        true
    }
}

/// Receiving half of the owner queue, drained on the owner thread.
pub struct OwnerQueue {
    rx: UnboundedReceiver<OwnerMessage>,
}

impl OwnerQueue {
    /// Every message posted so far, without blocking.
    pub fn drain(&mut self) -> Vec<OwnerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Blocks until the next message. `None` once every handle is dropped.
    pub fn blocking_next(&mut self) -> Option<OwnerMessage> { self.rx.blocking_recv() }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_spawned_thread_is_prefixed() {
        let (tx, rx) = channel();

        spawn_named_thread("name-test", move || {
            let name = thread::current().name().unwrap_or("").to_string();
            tx.send(name).unwrap();
        })
        .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), "tessera-name-test");
    }

    #[test]
    fn test_messages_arrive_in_order() {
        let (owner, mut queue) = OwnerHandle::channel();
        owner.post(OwnerMessage::ReloadKeybindings);
        owner.post(OwnerMessage::RescanMonitors { generation: 3 });

        assert_eq!(queue.drain(), vec![OwnerMessage::ReloadKeybindings, OwnerMessage::RescanMonitors { generation: 3 }]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_waker_runs_per_post() {
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&woken);
        let (owner, _queue) = OwnerHandle::channel();
        let owner = owner.with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        owner.post(OwnerMessage::Shutdown);
        owner.post(OwnerMessage::Shutdown);
        assert_eq!(woken.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_post_from_another_thread() {
        let (owner, mut queue) = OwnerHandle::channel();
        spawn_named_thread("poster", move || {
            owner.post(OwnerMessage::Shutdown);
        })
        .unwrap()
        .join()
        .unwrap();

        assert_eq!(queue.blocking_next(), Some(OwnerMessage::Shutdown));
        assert_eq!(queue.blocking_next(), None);
    }

    #[test]
    fn test_post_after_queue_dropped() {
        let (owner, queue) = OwnerHandle::channel();
        drop(queue);
        assert!(!owner.post(OwnerMessage::Shutdown));
    }
}
