//! Tessera - a tiling window manager kernel.
//!
//! All window-manager state lives in a single [`store::Store`] owned by one thread.
//! OS callbacks, keybindings and delayed work become transforms dispatched on that
//! thread; layout engines are immutable values replaced on every change.
//!
//! The binary runs the manager by default and offers a few configuration
//! commands, see [`cli`].

pub mod butler;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod keybind;
pub mod layout;
pub mod listener;
pub mod logging;
pub mod model;
pub mod native;
pub mod platform;
pub mod router;
pub mod rules;
pub mod saved_state;
pub mod schema;
pub mod store;
pub mod timer;

use tracing::info;

use crate::error::TesseraResult;

/// Runs the window manager until an exit command or a fatal error.
///
/// Configuration is loaded first, then logging is started from it, then the owner
/// thread loop takes over the calling thread.
///
/// # Errors
///
/// Returns an error when logging cannot be started, when the native hooks cannot
/// be installed, or when the store cannot be initialized.
pub fn run() -> TesseraResult<()> {
    let config = config::init();
    let _logging = logging::init(&config.logging)?;

    info!(
        config = ?config::get_config_path(),
        workspaces = config.workspaces.len(),
        "starting tessera"
    );
    event_loop::run(config)
}

#[cfg(windows)]
mod event_loop {
    pub use crate::native::win32::run;
}

#[cfg(not(windows))]
mod event_loop {
    use std::rc::Rc;

    use tracing::warn;

    use crate::config::{self, TesseraConfig};
    use crate::context::Context;
    use crate::error::TesseraResult;
    use crate::native::fake::FakeNative;
    use crate::platform::OwnerHandle;
    use crate::timer::Timer;

    /// Runs against an in-memory desktop. Only the owner queue drives it, so it is
    /// useful for exercising configuration and commands off Windows.
    pub fn run(config: &TesseraConfig) -> TesseraResult<()> {
        warn!("no native window system on this platform, using an empty in-memory desktop");

        let (owner, mut queue) = OwnerHandle::channel();
        let timer = Rc::new(Timer::start(owner.clone())?);
        config::watch_config_file(owner.clone());

        let ctx = Context::new(config, Rc::new(FakeNative::with_single_monitor()), owner, timer)?;
        while let Some(message) = queue.blocking_next() {
            if ctx.handle_message(message).is_break() {
                break;
            }
        }
        ctx.shutdown()
    }
}
