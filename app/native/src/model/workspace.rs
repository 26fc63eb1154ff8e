//! Workspaces.
//!
//! A workspace is an immutable value. Every `with_*` method returns a new workspace,
//! or `None` when nothing would change, so callers can keep the existing `Arc`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::layout::EngineRef;
use crate::native::WindowHandle;

/// Ordered member windows. Most workspaces hold only a handful.
pub type WindowList = SmallVec<[WindowHandle; 8]>;

/// Stable identity of a workspace (UUID v7, so ids sort by creation time).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    #[must_use]
    pub fn new() -> Self { Self(Uuid::now_v7()) }
}

impl Default for WorkspaceId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A named set of windows laid out by one of its layout engines.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    engines: Vec<EngineRef>,
    active_engine_index: usize,
    previous_engine_index: usize,
    last_focused_window: Option<WindowHandle>,
    windows: WindowList,
}

impl Workspace {
    /// Creates a workspace.
    ///
    /// # Panics
    ///
    /// Panics if `engines` is empty. A workspace without a layout engine is a
    /// corrupted state that must not be carried forward.
    #[must_use]
    pub fn new(id: WorkspaceId, name: impl Into<String>, engines: Vec<EngineRef>) -> Self {
        let name = name.into();
        assert!(!engines.is_empty(), "workspace {name} ({id}) must have at least one layout engine");

        Self {
            id,
            name,
            engines,
            active_engine_index: 0,
            previous_engine_index: 0,
            last_focused_window: None,
            windows: WindowList::new(),
        }
    }

    /// The engine used for layout.
    ///
    /// # Panics
    ///
    /// Panics if the workspace has no engines, which `new` rules out.
    #[must_use]
    pub fn active_engine(&self) -> &EngineRef {
        match self.engines.get(self.active_engine_index) {
            Some(engine) => engine,
            None => panic!(
                "workspace {} has no layout engine at index {}",
                self.name, self.active_engine_index
            ),
        }
    }

    #[must_use]
    pub fn engines(&self) -> &[EngineRef] { &self.engines }

    #[must_use]
    pub const fn active_engine_index(&self) -> usize { self.active_engine_index }

    #[must_use]
    pub const fn previous_engine_index(&self) -> usize { self.previous_engine_index }

    #[must_use]
    pub const fn last_focused_window(&self) -> Option<WindowHandle> { self.last_focused_window }

    #[must_use]
    pub fn windows(&self) -> &[WindowHandle] { &self.windows }

    #[must_use]
    pub fn contains_window(&self, window: WindowHandle) -> bool { self.windows.contains(&window) }

    /// Renames the workspace.
    #[must_use]
    pub fn with_name(&self, name: &str) -> Option<Self> {
        (self.name != name).then(|| Self { name: name.to_string(), ..self.clone() })
    }

    /// Switches the active engine.
    #[must_use]
    pub fn with_active_engine_index(&self, index: usize) -> Option<Self> {
        if index == self.active_engine_index || index >= self.engines.len() {
            return None;
        }

        Some(Self {
            previous_engine_index: self.active_engine_index,
            active_engine_index: index,
            ..self.clone()
        })
    }

    #[must_use]
    pub fn with_last_focused_window(&self, window: Option<WindowHandle>) -> Option<Self> {
        (self.last_focused_window != window)
            .then(|| Self { last_focused_window: window, ..self.clone() })
    }

    /// Adds a member window and applies `add` to every engine.
    ///
    /// All engines receive the window so that switching engines keeps the same set.
    #[must_use]
    pub fn with_window(&self, window: WindowHandle, add: impl Fn(EngineRef) -> EngineRef) -> Option<Self> {
        let engines = self.map_engines(|_, engine| add(engine));
        let already_member = self.windows.contains(&window);
        if already_member && engines.is_none() {
            return None;
        }

        let mut next = self.clone();
        if !already_member {
            next.windows.push(window);
        }
        if let Some(engines) = engines {
            next.engines = engines;
        }
        Some(next)
    }

    /// Removes a member window from the workspace and from every engine.
    #[must_use]
    pub fn without_window(&self, window: WindowHandle) -> Option<Self> {
        if !self.windows.contains(&window) {
            return None;
        }

        let mut next = self.clone();
        next.windows.retain(|w| *w != window);
        if next.last_focused_window == Some(window) {
            next.last_focused_window = None;
        }
        if let Some(engines) = self.map_engines(|_, engine| engine.remove_window(window)) {
            next.engines = engines;
        }
        Some(next)
    }

    /// Replaces the active engine with `update(active)`.
    #[must_use]
    pub fn with_active_engine(&self, update: impl FnOnce(EngineRef) -> EngineRef) -> Option<Self> {
        let current = self.active_engine();
        let updated = update(Arc::clone(current));
        if Arc::ptr_eq(current, &updated) {
            return None;
        }

        let mut next = self.clone();
        next.engines[self.active_engine_index] = updated;
        Some(next)
    }

    /// Applies `update` to every engine.
    #[must_use]
    pub fn with_all_engines(&self, update: impl Fn(EngineRef) -> EngineRef) -> Option<Self> {
        self.map_engines(|_, engine| update(engine)).map(|engines| Self { engines, ..self.clone() })
    }

    fn map_engines(&self, update: impl Fn(usize, EngineRef) -> EngineRef) -> Option<Vec<EngineRef>> {
        let mut changed = false;
        let engines: Vec<EngineRef> = self
            .engines
            .iter()
            .enumerate()
            .map(|(idx, engine)| {
                let updated = update(idx, Arc::clone(engine));
                changed |= !Arc::ptr_eq(engine, &updated);
                updated
            })
            .collect();

        changed.then_some(engines)
    }
}

impl PartialEq for Workspace {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.active_engine_index == other.active_engine_index
            && self.previous_engine_index == other.previous_engine_index
            && self.last_focused_window == other.last_focused_window
            && self.windows == other.windows
            && self.engines.len() == other.engines.len()
            && self.engines.iter().zip(&other.engines).all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} ({})", self.name, self.id) }
}
