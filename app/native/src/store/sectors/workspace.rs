//! Workspace sector: workspaces in creation order plus layout bookkeeping.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::layout::EngineRef;
use crate::model::{Workspace, WorkspaceId};
use crate::native::{WindowHandle, WindowPosition};
use crate::store::events::WorkspaceEvent;

/// Builds a fresh leaf layout engine for a new workspace.
#[derive(Clone)]
pub struct EngineCreator(Arc<dyn Fn() -> EngineRef>);

impl EngineCreator {
    pub fn new(create: impl Fn() -> EngineRef + 'static) -> Self { Self(Arc::new(create)) }

    #[must_use]
    pub fn create(&self) -> EngineRef { (self.0)() }
}

impl PartialEq for EngineCreator {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl fmt::Debug for EngineCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("EngineCreator") }
}

/// Wraps every leaf engine of a new workspace, e.g. with gaps or a bar strip.
#[derive(Clone)]
pub struct ProxyCreator(Arc<dyn Fn(EngineRef) -> EngineRef>);

impl ProxyCreator {
    pub fn new(wrap: impl Fn(EngineRef) -> EngineRef + 'static) -> Self { Self(Arc::new(wrap)) }

    #[must_use]
    pub fn wrap(&self, inner: EngineRef) -> EngineRef { (self.0)(inner) }
}

impl PartialEq for ProxyCreator {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl fmt::Debug for ProxyCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("ProxyCreator") }
}

/// A workspace requested before the sector was initialized.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkspaceToCreate {
    pub id: WorkspaceId,
    pub name: Option<String>,
    pub engines: Option<Vec<EngineCreator>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkspaceSector {
    order: Vec<WorkspaceId>,
    workspaces: BTreeMap<WorkspaceId, Arc<Workspace>>,
    to_layout: BTreeSet<WorkspaceId>,
    window_to_focus: Option<WindowHandle>,
    engine_creators: Vec<EngineCreator>,
    proxy_creators: Vec<ProxyCreator>,
    has_initialized: bool,
    to_create: Vec<WorkspaceToCreate>,
    /// Positions applied by the last layout pass of each workspace.
    window_positions: BTreeMap<WorkspaceId, BTreeMap<WindowHandle, WindowPosition>>,
    events: Vec<WorkspaceEvent>,
}

impl WorkspaceSector {
    #[must_use]
    pub fn get(&self, id: WorkspaceId) -> Option<&Arc<Workspace>> { self.workspaces.get(&id) }

    #[must_use]
    pub fn contains(&self, id: WorkspaceId) -> bool { self.workspaces.contains_key(&id) }

    /// Workspace ids in creation order.
    #[must_use]
    pub fn order(&self) -> &[WorkspaceId] { &self.order }

    /// Workspaces in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Workspace>> {
        self.order.iter().filter_map(|id| self.workspaces.get(id))
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Arc<Workspace>> { self.iter().find(|ws| ws.name == name) }

    #[must_use]
    pub fn len(&self) -> usize { self.order.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn insert(&mut self, workspace: Workspace) {
        let id = workspace.id;
        if !self.workspaces.contains_key(&id) {
            self.order.push(id);
        }
        self.workspaces.insert(id, Arc::new(workspace));
    }

    /// Stores an updated version of an existing workspace.
    pub fn replace(&mut self, workspace: Workspace) -> Arc<Workspace> {
        let workspace = Arc::new(workspace);
        self.workspaces.insert(workspace.id, Arc::clone(&workspace));
        workspace
    }

    pub fn remove(&mut self, id: WorkspaceId) -> Option<Arc<Workspace>> {
        self.order.retain(|other| *other != id);
        self.to_layout.remove(&id);
        self.window_positions.remove(&id);
        self.workspaces.remove(&id)
    }

    pub fn queue_layout(&mut self, id: WorkspaceId) { self.to_layout.insert(id); }

    #[must_use]
    pub fn has_pending_layout(&self) -> bool { !self.to_layout.is_empty() || self.window_to_focus.is_some() }

    pub fn take_to_layout(&mut self) -> BTreeSet<WorkspaceId> { std::mem::take(&mut self.to_layout) }

    #[must_use]
    pub const fn window_to_focus(&self) -> Option<WindowHandle> { self.window_to_focus }

    pub fn set_window_to_focus(&mut self, window: Option<WindowHandle>) { self.window_to_focus = window; }

    #[must_use]
    pub fn engine_creators(&self) -> &[EngineCreator] { &self.engine_creators }

    pub fn set_engine_creators(&mut self, creators: Vec<EngineCreator>) { self.engine_creators = creators; }

    #[must_use]
    pub fn proxy_creators(&self) -> &[ProxyCreator] { &self.proxy_creators }

    pub fn add_proxy_creator(&mut self, creator: ProxyCreator) { self.proxy_creators.push(creator); }

    #[must_use]
    pub const fn has_initialized(&self) -> bool { self.has_initialized }

    pub fn set_initialized(&mut self) { self.has_initialized = true; }

    pub fn defer_creation(&mut self, pending: WorkspaceToCreate) { self.to_create.push(pending); }

    pub fn take_to_create(&mut self) -> Vec<WorkspaceToCreate> { std::mem::take(&mut self.to_create) }

    #[must_use]
    pub fn window_position(&self, id: WorkspaceId, window: WindowHandle) -> Option<&WindowPosition> {
        self.window_positions.get(&id)?.get(&window)
    }

    pub fn set_window_positions(&mut self, id: WorkspaceId, positions: BTreeMap<WindowHandle, WindowPosition>) {
        self.window_positions.insert(id, positions);
    }

    pub fn queue(&mut self, event: WorkspaceEvent) { self.events.push(event); }

    pub fn take_events(&mut self) -> Vec<WorkspaceEvent> { std::mem::take(&mut self.events) }
}
