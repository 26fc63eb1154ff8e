//! Errors returned by transforms and pickers.
//!
//! Every variant is an expected failure: the entity was not tracked, a lookup missed,
//! or the request made no sense for the current topology. None of them means the
//! snapshot is corrupted, so callers are free to log and carry on.

use thiserror::Error;

use crate::model::WorkspaceId;
use crate::native::{MonitorHandle, NativeError, WindowHandle};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Why a window was not admitted by `WindowAdded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    SplashScreen,
    Cloaked,
    NotStandard,
    HasVisibleOwner,
    Filtered,
    AlreadyTracked,
}

impl IgnoreReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SplashScreen => "splash screen",
            Self::Cloaked => "cloaked",
            Self::NotStandard => "not a standard window",
            Self::HasVisibleOwner => "has a visible owner",
            Self::Filtered => "matched a filter",
            Self::AlreadyTracked => "already tracked",
        }
    }
}

/// Expected failures of store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("monitor {0} is not tracked")]
    MonitorNotFound(MonitorHandle),

    #[error("no monitor at index {0}")]
    MonitorIndexOutOfRange(usize),

    #[error("workspace {0} was not found")]
    WorkspaceNotFound(WorkspaceId),

    #[error("no workspace at index {0}")]
    WorkspaceIndexOutOfRange(usize),

    #[error("no workspace is named {0:?}")]
    WorkspaceNameNotFound(String),

    #[error("window {0} is not tracked")]
    WindowNotFound(WindowHandle),

    #[error("window {window} is not in workspace {workspace}")]
    WindowNotInWorkspace { window: WindowHandle, workspace: WorkspaceId },

    /// No window was given and the active workspace has no last focused window.
    #[error("no window to operate on")]
    NoValidWindow,

    #[error("no layout engine creators were provided")]
    NoLayoutEngineCreators,

    #[error("cannot remove a workspace: {workspaces} workspaces for {monitors} monitors")]
    TooFewWorkspaces { workspaces: usize, monitors: usize },

    #[error("window {window} was ignored: {}", reason.as_str())]
    WindowIgnored { window: WindowHandle, reason: IgnoreReason },

    #[error("workspace {workspace} has no layout engine {engine:?}")]
    LayoutEngineNotFound { workspace: WorkspaceId, engine: String },

    /// There is nothing to move to: a single monitor, or no other inactive workspace.
    #[error("no adjacent {0} found")]
    NoAdjacent(&'static str),

    #[error(transparent)]
    Native(#[from] NativeError),
}
