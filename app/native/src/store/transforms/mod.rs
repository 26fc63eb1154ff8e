//! Transforms: the only way the snapshot changes.
//!
//! A transform is a value describing one mutation. [`Transform::execute`] receives a
//! [`TransformContext`] holding the snapshot, the native layer and the store
//! services, and may dispatch further transforms through the same context.
//!
//! | Module | Covers |
//! |---|---|
//! | [`layout`] | the flush-time layout pass and layout requests |
//! | [`monitor`] | topology changes and monitor focus |
//! | [`workspace`] | workspace lifecycle and layout engine selection |
//! | [`engine`] | per-window operations routed through a workspace's engines |
//! | [`window`] | window lifecycle events coming from the listener |
//! | [`map`] | moving windows and workspaces between monitors |

pub mod engine;
pub mod layout;
pub mod map;
pub mod monitor;
pub mod window;
pub mod workspace;

use std::sync::Arc;

pub use engine::{
    AddWindowToWorkspace, DeactivateWorkspace, FocusLastFocusedWindow, FocusWindowInDirection,
    MinimizeWindowEnd, MinimizeWindowStart, MoveWindowEdgesInDirection, PerformCustomAction,
    RemoveWindowFromWorkspace, SwapWindowInDirection,
};
pub use layout::{DoWorkspaceLayout, LayoutAllActiveWorkspaces, LayoutPass};
pub use map::{
    ActivateAdjacentWorkspace, ActivateWorkspace, MergeWorkspaceWindows, MoveWindowToAdjacentMonitor,
    MoveWindowToAdjacentWorkspace, MoveWindowToMonitor, MoveWindowToPoint, MoveWindowToWorkspace,
    SwapWorkspaceWithAdjacentMonitor,
};
pub use monitor::{FocusMonitorDesktop, MonitorsChanged, SetActiveMonitor};
pub use window::{
    RelayoutWindowWorkspace, WindowAdded, WindowFocused, WindowHidden, WindowMinimizeEnded,
    WindowMinimizeStarted, WindowMoveEnded, WindowMoveStarted, WindowMoved, WindowRemoved,
};
pub use workspace::{
    ActivateLayoutEngine, AddProxyCreator, AddWorkspace, CycleLayoutEngine, EngineSelector, InitializeWorkspaces,
    RemoveWorkspace, RenameWorkspace, SetEngineCreators,
};

use super::error::{StoreError, StoreResult};
use super::TransformContext;
use crate::model::{Workspace, WorkspaceId};
use crate::native::WindowHandle;
use crate::router::WorkspaceTarget;

/// One atomic mutation of the snapshot.
pub trait Transform {
    type Output;

    /// Applies the mutation.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the transform refers to something that is not
    /// tracked. Changes made before the error are kept.
    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<Self::Output>;
}

fn workspace(ctx: &TransformContext<'_>, id: WorkspaceId) -> StoreResult<Arc<Workspace>> {
    ctx.root.workspaces.get(id).cloned().ok_or(StoreError::WorkspaceNotFound(id))
}

fn workspace_or_active(ctx: &TransformContext<'_>, id: Option<WorkspaceId>) -> StoreResult<Arc<Workspace>> {
    ctx.pick(|root| super::pickers::workspace::or_active(root, id))
}

fn resolve_target(ctx: &TransformContext<'_>, target: &WorkspaceTarget) -> StoreResult<Arc<Workspace>> {
    match target {
        WorkspaceTarget::Id(id) => workspace(ctx, *id),
        WorkspaceTarget::Name(name) => ctx
            .root
            .workspaces
            .by_name(name)
            .cloned()
            .ok_or_else(|| StoreError::WorkspaceNameNotFound(name.clone())),
    }
}

/// `window`, or the last focused window of the active workspace.
fn window_or_focused(ctx: &TransformContext<'_>, window: Option<WindowHandle>) -> StoreResult<WindowHandle> {
    match window {
        Some(window) => Ok(window),
        None => ctx.pick(super::pickers::last_focused_window(None)),
    }
}

/// The workspace a tracked window belongs to.
fn workspace_of(ctx: &TransformContext<'_>, window: WindowHandle) -> StoreResult<Arc<Workspace>> {
    let id = ctx.root.maps.workspace_for_window(window).ok_or(StoreError::WindowNotFound(window))?;
    workspace(ctx, id)
}
