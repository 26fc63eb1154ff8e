//! Workspace lifecycle: creation, removal, renaming and layout engine selection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::map::show_workspace;
use super::window::{admit, track};
use super::{
    LayoutAllActiveWorkspaces, MergeWorkspaceWindows, Transform, WindowAdded, resolve_target, workspace_or_active,
};
use crate::config::RouterOptions;
use crate::geometry::wrap_index;
use crate::model::{Workspace, WorkspaceId};
use crate::router::WorkspaceTarget;
use crate::saved_state::SavedState;
use crate::store::error::{StoreError, StoreResult};
use crate::store::events::WorkspaceEvent;
use crate::store::sectors::{EngineCreator, ProxyCreator, WorkspaceToCreate};
use crate::store::TransformContext;

/// Replaces the engine creators used for new workspaces.
#[derive(Clone, Debug)]
pub struct SetEngineCreators(pub Vec<EngineCreator>);

impl Transform for SetEngineCreators {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        ctx.root.workspaces.set_engine_creators(self.0);
        Ok(())
    }
}

/// Registers a proxy wrapped around every leaf engine of workspaces created later.
#[derive(Clone, Debug)]
pub struct AddProxyCreator(pub ProxyCreator);

impl Transform for AddProxyCreator {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        ctx.root.workspaces.add_proxy_creator(self.0);
        Ok(())
    }
}

/// Creates a workspace.
///
/// Before [`InitializeWorkspaces`] the request is only recorded and the returned id
/// becomes valid once initialization runs.
#[derive(Clone, Debug, Default)]
pub struct AddWorkspace {
    pub name: Option<String>,
    /// Overrides the default engine creators.
    pub engines: Option<Vec<EngineCreator>>,
}

impl AddWorkspace {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self { Self { name: Some(name.into()), engines: None } }
}

impl Transform for AddWorkspace {
    type Output = WorkspaceId;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<WorkspaceId> {
        let id = WorkspaceId::new();
        if !ctx.root.workspaces.has_initialized() {
            debug!(workspace = %id, name = ?self.name, "deferring workspace creation");
            ctx.root.workspaces.defer_creation(WorkspaceToCreate { id, name: self.name, engines: self.engines });
            return Ok(id);
        }
        create_workspace(ctx, id, self.name, self.engines)
    }
}

pub(super) fn create_workspace(
    ctx: &mut TransformContext<'_>,
    id: WorkspaceId,
    name: Option<String>,
    engines: Option<Vec<EngineCreator>>,
) -> StoreResult<WorkspaceId> {
    let creators = engines.unwrap_or_else(|| ctx.root.workspaces.engine_creators().to_vec());
    if creators.is_empty() {
        return Err(StoreError::NoLayoutEngineCreators);
    }

    let proxies = ctx.root.workspaces.proxy_creators();
    let engines = creators
        .iter()
        .map(|creator| proxies.iter().fold(creator.create(), |engine, proxy| proxy.wrap(engine)))
        .collect();

    let name = name.unwrap_or_else(|| format!("Workspace {}", ctx.root.workspaces.len() + 1));
    info!(workspace = %id, %name, "creating workspace");
    ctx.root.workspaces.insert(Workspace::new(id, name.clone(), engines));
    ctx.root.workspaces.queue(WorkspaceEvent::WorkspaceAdded { id, name });
    Ok(id)
}

/// Removes a workspace, moving its windows to the last remaining workspace.
#[derive(Clone, Debug)]
pub struct RemoveWorkspace(pub WorkspaceTarget);

impl Transform for RemoveWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let removed = resolve_target(ctx, &self.0)?;
        let workspaces = ctx.root.workspaces.len();
        let monitors = ctx.root.monitors.len();
        if workspaces.saturating_sub(1) < monitors {
            return Err(StoreError::TooFewWorkspaces { workspaces, monitors });
        }

        let Some(target) = ctx.root.workspaces.order().iter().rev().copied().find(|id| *id != removed.id) else {
            return Err(StoreError::TooFewWorkspaces { workspaces, monitors });
        };
        ctx.dispatch(MergeWorkspaceWindows { source: removed.id, target })?;

        let monitor = ctx.root.maps.monitor_for_workspace(removed.id);
        ctx.root.maps.remove_workspace(removed.id);
        ctx.root.workspaces.remove(removed.id);
        info!(workspace = %removed, "removed workspace");
        ctx.root.workspaces.queue(WorkspaceEvent::WorkspaceRemoved { id: removed.id, name: removed.name.clone() });

        if let Some(monitor) = monitor {
            let replacement = if ctx.root.maps.is_active(target) {
                ctx.root.workspaces.order().iter().copied().find(|id| !ctx.root.maps.is_active(*id))
            } else {
                Some(target)
            };
            match replacement {
                Some(id) => show_workspace(ctx, monitor, id),
                None => warn!(%monitor, "no hidden workspace left to show"),
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct RenameWorkspace {
    pub target: WorkspaceTarget,
    pub name: String,
}

impl Transform for RenameWorkspace {
    type Output = Arc<Workspace>;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<Arc<Workspace>> {
        let current = resolve_target(ctx, &self.target)?;
        let Some(renamed) = current.with_name(&self.name) else {
            return Ok(current);
        };

        let renamed = ctx.root.workspaces.replace(renamed);
        ctx.root.workspaces.queue(WorkspaceEvent::WorkspaceRenamed {
            id: renamed.id,
            previous: current.name.clone(),
            current: renamed.name.clone(),
        });
        Ok(renamed)
    }
}

/// Picks a layout engine of a workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineSelector {
    Index(usize),
    Name(String),
}

/// Switches the active layout engine. Selecting the current engine returns the
/// workspace unchanged.
#[derive(Clone, Debug)]
pub struct ActivateLayoutEngine {
    /// `None` means the active workspace.
    pub workspace: Option<WorkspaceId>,
    pub engine: EngineSelector,
}

impl Transform for ActivateLayoutEngine {
    type Output = Arc<Workspace>;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<Arc<Workspace>> {
        let current = workspace_or_active(ctx, self.workspace)?;
        let index = match &self.engine {
            EngineSelector::Index(index) if *index < current.engines().len() => *index,
            EngineSelector::Index(index) => {
                return Err(StoreError::LayoutEngineNotFound { workspace: current.id, engine: index.to_string() });
            }
            EngineSelector::Name(name) => current
                .engines()
                .iter()
                .position(|engine| engine.name() == name)
                .ok_or_else(|| StoreError::LayoutEngineNotFound { workspace: current.id, engine: name.clone() })?,
        };

        let Some(updated) = current.with_active_engine_index(index) else {
            return Ok(current);
        };

        let updated = ctx.root.workspaces.replace(updated);
        debug!(workspace = %updated, engine = updated.active_engine().name(), "activated layout engine");
        ctx.root.workspaces.queue(WorkspaceEvent::ActiveLayoutEngineChanged {
            id: updated.id,
            previous: current.active_engine().name().to_string(),
            current: updated.active_engine().name().to_string(),
        });
        ctx.root.workspaces.queue_layout(updated.id);
        Ok(updated)
    }
}

/// Activates the next (or previous) layout engine, wrapping around.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleLayoutEngine {
    pub workspace: Option<WorkspaceId>,
    pub reverse: bool,
}

impl Transform for CycleLayoutEngine {
    type Output = Arc<Workspace>;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<Arc<Workspace>> {
        let current = workspace_or_active(ctx, self.workspace)?;
        let delta = if self.reverse { -1 } else { 1 };
        #[allow(clippy::cast_possible_wrap)]
        let index = wrap_index(current.active_engine_index() as isize + delta, current.engines().len());
        ctx.dispatch(ActivateLayoutEngine { workspace: Some(current.id), engine: EngineSelector::Index(index) })
    }
}

/// Creates the requested workspaces, shows one per monitor and adopts the windows
/// that already exist.
///
/// Saved windows are placed back into their workspace at the centre of their saved
/// rectangle. Every other top-level window goes to the workspace of the monitor it
/// is on.
#[derive(Clone, Debug, Default)]
pub struct InitializeWorkspaces {
    pub saved: Option<SavedState>,
}

impl Transform for InitializeWorkspaces {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if ctx.root.workspaces.has_initialized() {
            warn!("workspaces are already initialized");
            return Ok(());
        }

        ctx.root.workspaces.set_initialized();
        for pending in ctx.root.workspaces.take_to_create() {
            create_workspace(ctx, pending.id, pending.name, pending.engines)?;
        }

        let monitors: Vec<_> = ctx.root.monitors.monitors().iter().map(|m| m.handle).collect();
        while ctx.root.workspaces.len() < monitors.len() {
            create_workspace(ctx, WorkspaceId::new(), None, None)?;
        }
        for (monitor, id) in monitors.iter().zip(ctx.root.workspaces.order().to_vec()) {
            show_workspace(ctx, *monitor, id);
        }

        if let Some(saved) = self.saved {
            restore_saved_windows(ctx, &saved);
        }

        let native = ctx.native;
        for handle in native.top_level_windows() {
            if ctx.root.windows.contains(handle) {
                continue;
            }
            ctx.root.windows.mark_startup_window(handle);
            let added = WindowAdded::new(handle).with_router_options(RouterOptions::RouteToLaunchedWorkspace);
            if let Err(err) = ctx.dispatch(added) {
                debug!(window = %handle, error = %err, "window not adopted at startup");
            }
        }
        ctx.root.windows.clear_startup_windows();

        info!(
            workspaces = ctx.root.workspaces.len(),
            windows = ctx.root.windows.len(),
            "workspaces initialized"
        );
        ctx.dispatch(LayoutAllActiveWorkspaces)
    }
}

fn restore_saved_windows(ctx: &mut TransformContext<'_>, saved: &SavedState) {
    for saved_workspace in &saved.workspaces {
        let Some(id) = ctx.root.workspaces.by_name(&saved_workspace.name).map(|ws| ws.id) else {
            debug!(name = %saved_workspace.name, "saved workspace no longer exists");
            continue;
        };

        for saved_window in &saved_workspace.windows {
            let window = match admit(ctx, saved_window.handle) {
                Ok(window) => window,
                Err(err) => {
                    debug!(window = %saved_window.handle, error = %err, "skipping saved window");
                    continue;
                }
            };
            if let Err(err) = track(ctx, window, id, Some(saved_window.rect.center())) {
                warn!(window = %saved_window.handle, error = %err, "failed to restore saved window");
            }
        }
    }
}
