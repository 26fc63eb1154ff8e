//! Panic containment for work reached from OS callbacks.
//!
//! Hook procedures are `extern "system"` functions, and a panic unwinding out of
//! one aborts the process. Every entry point from the OS runs its work through a
//! [`PanicBoundary`], which logs the panic and applies the configured
//! [`UncaughtErrorPolicy`].

use std::any::Any;
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

use super::{OwnerHandle, OwnerMessage};
use crate::config::UncaughtErrorPolicy;

pub struct PanicBoundary {
    owner: OwnerHandle,
    policy: Cell<UncaughtErrorPolicy>,
}

impl PanicBoundary {
    #[must_use]
    pub const fn new(owner: OwnerHandle, policy: UncaughtErrorPolicy) -> Self {
        Self { owner, policy: Cell::new(policy) }
    }

    #[must_use]
    pub const fn owner(&self) -> &OwnerHandle { &self.owner }

    pub fn set_policy(&self, policy: UncaughtErrorPolicy) { self.policy.set(policy); }

    /// Runs `work`, returning `None` when it panicked.
    ///
    /// Under [`UncaughtErrorPolicy::Shutdown`] a panic also posts
    /// [`OwnerMessage::Shutdown`].
    pub fn run<T>(&self, origin: &str, work: impl FnOnce() -> T) -> Option<T> {
        match catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => Some(value),
            Err(payload) => {
                error!(origin, panic = panic_message(payload.as_ref()), "uncaught panic");
                if self.policy.get() == UncaughtErrorPolicy::Shutdown {
                    self.owner.post(OwnerMessage::Shutdown);
                }
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_value_passes_through() {
        let (owner, mut queue) = OwnerHandle::channel();
        let boundary = PanicBoundary::new(owner, UncaughtErrorPolicy::Shutdown);

        assert_eq!(boundary.run("test", || 7), Some(7));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_panic_is_logged_only() {
        let (owner, mut queue) = OwnerHandle::channel();
        let boundary = PanicBoundary::new(owner, UncaughtErrorPolicy::Log);

        assert_eq!(boundary.run("test", || panic!("boom")), None::<()>);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_policy_change_takes_effect() {
        let (owner, mut queue) = OwnerHandle::channel();
        let boundary = PanicBoundary::new(owner, UncaughtErrorPolicy::Log);
        boundary.set_policy(UncaughtErrorPolicy::Shutdown);

        let message = String::from("formatted boom");
        assert_eq!(boundary.run("test", move || panic!("{message}")), None::<()>);
        assert_eq!(queue.drain(), vec![OwnerMessage::Shutdown]);
    }

    #[test]
    fn test_payload_messages() {
        let text: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(3_u8);

        assert_eq!(panic_message(text.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
