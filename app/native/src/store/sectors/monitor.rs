//! Monitor sector: the sorted display topology and the active/primary handles.

use std::sync::Arc;

use crate::model::{Monitor, sort_monitors};
use crate::native::MonitorHandle;
use crate::store::events::MonitorEvent;

#[derive(Clone, Debug, PartialEq)]
pub struct MonitorSector {
    monitors: Arc<[Monitor]>,
    active: MonitorHandle,
    primary: MonitorHandle,
    /// The last monitor that held a tracked window when it gained focus.
    last_active: MonitorHandle,
    events: Vec<MonitorEvent>,
}

impl Default for MonitorSector {
    fn default() -> Self {
        Self {
            monitors: Arc::from(Vec::new()),
            active: MonitorHandle::default(),
            primary: MonitorHandle::default(),
            last_active: MonitorHandle::default(),
            events: Vec::new(),
        }
    }
}

impl MonitorSector {
    /// Monitors sorted left to right, then top to bottom.
    #[must_use]
    pub fn monitors(&self) -> &[Monitor] { &self.monitors }

    #[must_use]
    pub fn shared(&self) -> Arc<[Monitor]> { Arc::clone(&self.monitors) }

    #[must_use]
    pub fn len(&self) -> usize { self.monitors.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.monitors.is_empty() }

    #[must_use]
    pub fn get(&self, handle: MonitorHandle) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.handle == handle)
    }

    #[must_use]
    pub fn index_of(&self, handle: MonitorHandle) -> Option<usize> {
        self.monitors.iter().position(|m| m.handle == handle)
    }

    #[must_use]
    pub const fn active_handle(&self) -> MonitorHandle { self.active }

    #[must_use]
    pub const fn primary_handle(&self) -> MonitorHandle { self.primary }

    #[must_use]
    pub const fn last_active_handle(&self) -> MonitorHandle { self.last_active }

    /// Replaces the topology. The list is sorted before it is stored.
    pub fn set_monitors(&mut self, mut monitors: Vec<Monitor>) {
        sort_monitors(&mut monitors);
        if let Some(primary) = monitors.iter().find(|m| m.is_primary).or_else(|| monitors.first()) {
            self.primary = primary.handle;
        }
        self.monitors = Arc::from(monitors);
    }

    pub fn set_active(&mut self, handle: MonitorHandle) { self.active = handle; }

    pub fn set_last_active(&mut self, handle: MonitorHandle) { self.last_active = handle; }

    /// Points any handle that no longer exists at the primary monitor.
    pub fn repair_handles(&mut self) {
        let primary = self.primary;
        let exists = |handle: MonitorHandle| self.monitors.iter().any(|m| m.handle == handle);
        let active_ok = exists(self.active);
        let last_active_ok = exists(self.last_active);

        if !active_ok {
            self.active = primary;
        }
        if !last_active_ok {
            self.last_active = primary;
        }
    }

    pub fn queue(&mut self, event: MonitorEvent) { self.events.push(event); }

    pub fn take_events(&mut self) -> Vec<MonitorEvent> { std::mem::take(&mut self.events) }
}
