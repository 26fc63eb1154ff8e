//! The state store.
//!
//! All manager state lives in one [`RootSector`] snapshot, split into four sectors.
//! It changes only through [`Store::dispatch`], which runs a [`Transform`] against the
//! snapshot and then flushes:
//!
//! ```text
//!  dispatch(T) ──► T::execute(ctx) ──► flush
//!                    │                   │
//!                    │ ctx.dispatch(U)   ├─ layout pass (if queued)
//!                    │ ctx.pick(P)       ├─ drain events: monitor, window, map, workspace
//!                    ▼                   └─ notify subscribers, repeat until quiet
//!                 RootSector
//! ```
//!
//! Reads go through [`Store::pick`] with a pure function over the snapshot.
//!
//! # Threading
//!
//! `Store` is `!Send` and `!Sync`: it belongs to the owner thread, which is also the
//! thread the OS hooks call back on. Other threads post messages through
//! [`crate::platform::thread::OwnerHandle`].
//!
//! # Reentrancy
//!
//! Transforms dispatch nested transforms through [`TransformContext::dispatch`],
//! which runs them inline against the same snapshot. Subscribers may call
//! [`Store::dispatch`] while a flush is running; the nested flush returns at once and
//! the outer flush picks up whatever the subscriber queued.

pub mod error;
pub mod events;
pub mod pickers;
pub mod sectors;
pub mod transforms;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub use error::{IgnoreReason, StoreError, StoreResult};
pub use events::{MapEvent, MonitorEvent, StoreEvent, WindowEvent, WorkspaceEvent};
pub use sectors::RootSector;
pub use transforms::Transform;

use crate::filter::FilterChain;
use crate::native::NativeApi;
use crate::router::Router;

/// Collaborators consulted by transforms that are not part of the snapshot.
#[derive(Default)]
pub struct StoreServices {
    pub filters: FilterChain,
    pub router: Router,
}

/// Everything a transform can touch while it runs.
pub struct TransformContext<'a> {
    pub root: &'a mut RootSector,
    pub native: &'a dyn NativeApi,
    pub services: &'a StoreServices,
}

impl TransformContext<'_> {
    /// Runs a nested transform against the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns the nested transform's error.
    pub fn dispatch<T: Transform>(&mut self, transform: T) -> StoreResult<T::Output> { transform.execute(self) }

    pub fn pick<T>(&self, picker: impl FnOnce(&RootSector) -> T) -> T { picker(self.root) }
}

type Subscriber = Rc<dyn Fn(&Store, &StoreEvent)>;

/// Handle returned by [`Store::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct Store {
    root: RefCell<RootSector>,
    native: Rc<dyn NativeApi>,
    services: StoreServices,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: Cell<u64>,
    flushing: Cell<bool>,
}

/// Clears the flushing flag when a flush ends, including by panic.
struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) { self.0.set(false); }
}

impl Store {
    #[must_use]
    pub fn new(native: Rc<dyn NativeApi>, services: StoreServices) -> Self {
        Self {
            root: RefCell::new(RootSector::default()),
            native,
            services,
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
            flushing: Cell::new(false),
        }
    }

    #[must_use]
    pub fn native(&self) -> &dyn NativeApi { &*self.native }

    #[must_use]
    pub fn native_rc(&self) -> Rc<dyn NativeApi> { Rc::clone(&self.native) }

    /// Runs `transform`, then flushes layout and events.
    ///
    /// # Errors
    ///
    /// Returns the transform's error. Events queued before the error are still
    /// flushed.
    pub fn dispatch<T: Transform>(&self, transform: T) -> StoreResult<T::Output> {
        let result = {
            let mut root = self.root.borrow_mut();
            let mut ctx = TransformContext { root: &mut root, native: &*self.native, services: &self.services };
            transform.execute(&mut ctx)
        };

        if let Err(err) = &result {
            tracing::debug!(error = %err, transform = std::any::type_name::<T>(), "transform failed");
        }

        self.flush();
        result
    }

    /// Runs a pure query against the current snapshot.
    pub fn pick<T>(&self, picker: impl FnOnce(&RootSector) -> T) -> T { picker(&self.root.borrow()) }

    /// A copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RootSector { self.root.borrow().clone() }

    pub fn subscribe(&self, subscriber: impl Fn(&Self, &StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) { self.subscribers.borrow_mut().retain(|(other, _)| *other != id); }

    fn flush(&self) {
        if self.flushing.replace(true) {
            return;
        }
        let _guard = FlushGuard(&self.flushing);

        loop {
            let events = {
                let mut root = self.root.borrow_mut();
                if root.workspaces.has_pending_layout() {
                    let mut ctx = TransformContext { root: &mut root, native: &*self.native, services: &self.services };
                    if let Err(err) = ctx.dispatch(transforms::LayoutPass) {
                        tracing::warn!(error = %err, "layout pass failed");
                    }
                }
                root.take_events()
            };

            if events.is_empty() {
                break;
            }

            let subscribers: Vec<Subscriber> =
                self.subscribers.borrow().iter().map(|(_, subscriber)| Rc::clone(subscriber)).collect();
            for event in &events {
                tracing::trace!(?event, "store event");
                for subscriber in &subscribers {
                    subscriber(self, event);
                }
            }
        }
    }
}
