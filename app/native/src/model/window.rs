//! Tracked windows.

use std::fmt;

use serde::Serialize;

use crate::native::{WindowHandle, WindowInfo};

/// A top-level window tracked by the manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Window {
    pub handle: WindowHandle,
    pub title: String,
    pub class_name: String,
    pub process_id: u32,
    pub process_file_name: Option<String>,
    pub is_minimized: bool,
}

impl Window {
    /// The executable file name, or an empty string when the process was not readable.
    #[must_use]
    pub fn process_file_name(&self) -> &str { self.process_file_name.as_deref().unwrap_or_default() }

    /// Case-insensitive comparison against the executable file name.
    #[must_use]
    pub fn is_process(&self, file_name: &str) -> bool {
        self.process_file_name.as_deref().is_some_and(|name| name.eq_ignore_ascii_case(file_name))
    }
}

impl From<WindowInfo> for Window {
    fn from(info: WindowInfo) -> Self {
        Self {
            handle: info.handle,
            title: info.title,
            class_name: info.class_name,
            process_id: info.process_id,
            process_file_name: info.process_file_name,
            is_minimized: info.is_minimized,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}: {})", self.handle, self.process_file_name(), self.title)
    }
}
