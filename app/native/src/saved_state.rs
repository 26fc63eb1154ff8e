//! State persisted across restarts.
//!
//! On shutdown every workspace's active engine is laid out against a 1000x1000
//! reference monitor and each window's rectangle is stored in unit-square
//! coordinates, so restoring does not depend on the actual resolution. The file is
//! deleted as soon as it has been read.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::Rect;
use crate::native::WindowHandle;
use crate::store::sectors::RootSector;

/// The monitor every saved layout is computed against.
pub const REFERENCE_RECT: Rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);

#[derive(Debug, Error)]
pub enum SavedStateError {
    #[error("failed to access saved state: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse saved state: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub workspaces: Vec<SavedWorkspace>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorkspace {
    pub name: String,
    pub windows: Vec<SavedWindow>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWindow {
    pub handle: WindowHandle,
    /// Rectangle in unit-square coordinates.
    pub rect: Rect,
}

impl SavedState {
    /// Captures the layout of every workspace, in workspace order.
    #[must_use]
    pub fn capture(root: &RootSector) -> Self {
        let Some(monitor) = root
            .monitors
            .get(root.monitors.primary_handle())
            .or_else(|| root.monitors.monitors().first())
        else {
            return Self::default();
        };

        let workspaces = root
            .workspaces
            .iter()
            .map(|workspace| SavedWorkspace {
                name: workspace.name.clone(),
                windows: workspace
                    .active_engine()
                    .do_layout(REFERENCE_RECT, monitor)
                    .map(|placement| SavedWindow {
                        handle: placement.window,
                        rect: REFERENCE_RECT.rect_to_unit_square(&placement.rect),
                    })
                    .collect(),
            })
            .collect();

        Self { workspaces }
    }

    /// Writes the state, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SavedStateError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string(self)?)?;
        debug!(path = %path.display(), workspaces = self.workspaces.len(), "saved state written");
        Ok(())
    }

    /// Reads the state and deletes the file, so a crash cannot replay it twice.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed. The file is
    /// deleted even when parsing fails.
    pub fn load_and_delete(path: &Path) -> Result<Option<Self>, SavedStateError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = fs::remove_file(path) {
            warn!(error = %err, path = %path.display(), "failed to delete saved state");
        }

        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::geometry::Direction;
    use crate::layout::ColumnLayoutEngine;
    use crate::native::NativeApi;
    use crate::native::fake::FakeNative;
    use crate::store::sectors::EngineCreator;
    use crate::store::test_support::store_with;
    use crate::store::transforms::{
        AddWorkspace, InitializeWorkspaces, MonitorsChanged, SetEngineCreators, SwapWindowInDirection,
    };
    use crate::store::{Store, StoreServices};
    use pretty_assertions::assert_eq;

    fn state() -> SavedState {
        SavedState {
            workspaces: vec![SavedWorkspace {
                name: "Code".to_string(),
                windows: vec![SavedWindow { handle: WindowHandle(42), rect: Rect::new(0.0, 0.0, 0.5, 1.0) }],
            }],
        }
    }

    #[test]
    fn test_load_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("saved_state.json");
        state().save(&path).unwrap();

        assert_eq!(SavedState::load_and_delete(&path).unwrap(), Some(state()));
        assert!(!path.exists());
        assert_eq!(SavedState::load_and_delete(&path).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_deleted_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(SavedState::load_and_delete(&path), Err(SavedStateError::Parse(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_capture_without_monitors_is_empty() {
        assert_eq!(SavedState::capture(&RootSector::default()), SavedState::default());
    }

    fn offset_native() -> Rc<FakeNative> {
        let native = Rc::new(FakeNative::new(vec![FakeNative::monitor(1, 1920.0, 0.0, true)]));
        native.add_window(FakeNative::standard_window(1, "a.exe"));
        native.add_window(FakeNative::standard_window(2, "b.exe"));
        native
    }

    fn captured_swapped() -> SavedState {
        let store = store_with(&offset_native(), &["Code", "Web"]);
        store.dispatch(SwapWindowInDirection { direction: Direction::Right, window: Some(WindowHandle(1)) }).unwrap();
        store.pick(SavedState::capture)
    }

    #[test]
    fn test_capture_normalizes_against_reference_monitor() {
        assert_eq!(
            captured_swapped(),
            SavedState {
                workspaces: vec![
                    SavedWorkspace {
                        name: "Code".to_string(),
                        windows: vec![
                            SavedWindow { handle: WindowHandle(2), rect: Rect::new(0.0, 0.0, 0.5, 1.0) },
                            SavedWindow { handle: WindowHandle(1), rect: Rect::new(0.5, 0.0, 0.5, 1.0) },
                        ],
                    },
                    SavedWorkspace { name: "Web".to_string(), windows: vec![] },
                ],
            }
        );
    }

    #[test]
    fn test_restore_places_windows_at_saved_positions() {
        let saved = captured_swapped();
        let native = Rc::new(FakeNative::with_single_monitor());
        native.add_window(FakeNative::standard_window(1, "a.exe"));
        native.add_window(FakeNative::standard_window(2, "b.exe"));

        let store = Store::new(Rc::clone(&native) as Rc<dyn NativeApi>, StoreServices::default());
        store.dispatch(SetEngineCreators(vec![EngineCreator::new(|| ColumnLayoutEngine::new_ref(true))])).unwrap();
        store.dispatch(MonitorsChanged).unwrap();
        store.dispatch(AddWorkspace::named("Code")).unwrap();
        store.dispatch(AddWorkspace::named("Web")).unwrap();
        store.dispatch(InitializeWorkspaces { saved: Some(saved.clone()) }).unwrap();

        assert_eq!(store.pick(SavedState::capture), saved);
    }
}
