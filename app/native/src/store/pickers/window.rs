//! Window queries.

use crate::model::Window;
use crate::native::WindowHandle;
use crate::store::error::{StoreError, StoreResult};
use crate::store::sectors::RootSector;

pub fn window_by_handle(handle: WindowHandle) -> impl Fn(&RootSector) -> StoreResult<Window> {
    move |root| root.windows.get(handle).cloned().ok_or(StoreError::WindowNotFound(handle))
}

#[must_use]
pub fn all_windows(root: &RootSector) -> Vec<Window> { root.windows.iter().cloned().collect() }

/// The window the user is dragging, if any.
#[must_use]
pub fn moving_window(root: &RootSector) -> Option<WindowHandle> { root.windows.moving() }
