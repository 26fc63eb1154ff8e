//! The composition root.
//!
//! [`Context`] wires the store, its services, the butler, the window event listener
//! and the keybind hook together from a [`TesseraConfig`], and handles the messages
//! other threads post to the owner thread. It is built and driven on that thread.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::butler::Butler;
use crate::config::{self, LayoutEngineKind, MasterConfig, TesseraConfig};
use crate::error::TesseraResult;
use crate::filter::FilterChain;
use crate::geometry::Direction;
use crate::keybind::{CommandRegistry, KeybindHook};
use crate::layout::{
    BarLayoutEngine, ColumnLayoutEngine, FloatingLayoutEngine, FocusLayoutEngine, GapsLayoutEngine,
    MasterStackLayoutEngine, TreeLayoutEngine,
};
use crate::listener::{ProcessorRegistry, WindowEventListener};
use crate::native::NativeApi;
use crate::platform::{OwnerHandle, OwnerMessage, PanicBoundary};
use crate::router::Router;
use crate::saved_state::SavedState;
use crate::store::sectors::{EngineCreator, ProxyCreator};
use crate::store::transforms::{AddProxyCreator, AddWorkspace, InitializeWorkspaces, MonitorsChanged, SetEngineCreators};
use crate::store::{Store, StoreServices};
use crate::timer::Scheduler;

/// Engine creators for `kinds`, in order.
#[must_use]
pub fn engine_creators(kinds: &[LayoutEngineKind], master: &MasterConfig) -> Vec<EngineCreator> {
    kinds
        .iter()
        .map(|kind| match kind {
            LayoutEngineKind::Column => EngineCreator::new(|| ColumnLayoutEngine::new_ref(true)),
            LayoutEngineKind::ColumnRightToLeft => EngineCreator::new(|| ColumnLayoutEngine::new_ref(false)),
            LayoutEngineKind::Focus => EngineCreator::new(FocusLayoutEngine::new_ref),
            LayoutEngineKind::Master => {
                let (ratio, position) = (master.ratio, master.position);
                EngineCreator::new(move || MasterStackLayoutEngine::new_ref(ratio, position))
            }
            LayoutEngineKind::Tree => EngineCreator::new(|| TreeLayoutEngine::new_ref(Direction::Right)),
        })
        .collect()
}

/// Proxies wrapped around every engine, innermost first.
fn proxy_creators(config: &TesseraConfig) -> Vec<ProxyCreator> {
    let mut proxies = vec![ProxyCreator::new(FloatingLayoutEngine::wrap)];

    if config.gaps.is_enabled() {
        let (outer, inner) = (f64::from(config.gaps.outer), f64::from(config.gaps.inner));
        proxies.push(ProxyCreator::new(move |engine| GapsLayoutEngine::wrap(engine, outer, inner)));
    }
    if config.bar.is_enabled() {
        let height = f64::from(config.bar.height);
        proxies.push(ProxyCreator::new(move |engine| BarLayoutEngine::wrap(engine, height)));
    }
    proxies
}

fn services(config: &TesseraConfig) -> StoreServices {
    let mut router = Router::new(config.router_options);
    for route in &config.routes {
        router.add_rule(route.clone());
    }

    StoreServices { filters: FilterChain::with_defaults().with_rules(config.filters.iter().cloned()), router }
}

fn load_saved_state(path: &std::path::Path) -> Option<SavedState> {
    match SavedState::load_and_delete(path) {
        Ok(saved) => saved,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable saved state");
            None
        }
    }
}

pub struct Context {
    store: Rc<Store>,
    butler: Butler,
    listener: WindowEventListener,
    keybinds: KeybindHook,
    boundary: Rc<PanicBoundary>,
    saved_state_path: PathBuf,
}

impl Context {
    /// Builds the store from `config` and initializes its workspaces.
    ///
    /// # Errors
    ///
    /// Returns an error when monitors cannot be enumerated or workspaces cannot be
    /// created.
    pub fn new(
        config: &TesseraConfig,
        native: Rc<dyn NativeApi>,
        owner: OwnerHandle,
        scheduler: Rc<dyn Scheduler>,
    ) -> TesseraResult<Self> {
        let store = Rc::new(Store::new(native, services(config)));

        store.dispatch(SetEngineCreators(engine_creators(&config.layout_engines, &config.master)))?;
        for proxy in proxy_creators(config) {
            store.dispatch(AddProxyCreator(proxy))?;
        }

        store.dispatch(MonitorsChanged)?;
        for workspace in &config.workspaces {
            let engines = workspace.layout_engines.as_deref().map(|kinds| engine_creators(kinds, &config.master));
            store.dispatch(AddWorkspace { name: Some(workspace.name.clone()), engines })?;
        }

        let saved_state_path = config.saved_state_path();
        let saved = load_saved_state(&saved_state_path);
        store.dispatch(InitializeWorkspaces { saved })?;

        let butler = Butler::new(Rc::clone(&store));
        let boundary = Rc::new(PanicBoundary::new(owner, config.uncaught_error_policy));
        let listener = WindowEventListener::new(
            Rc::clone(&store),
            ProcessorRegistry::from_config(&config.processors),
            scheduler,
            Rc::clone(&boundary),
        );
        let keybinds =
            KeybindHook::new(butler.clone(), Rc::clone(&boundary), CommandRegistry::with_core_commands(), config);

        info!(keybindings = keybinds.bindings().len(), "tessera is ready");
        Ok(Self { store, butler, listener, keybinds, boundary, saved_state_path })
    }

    #[must_use]
    pub fn store(&self) -> &Rc<Store> { &self.store }

    #[must_use]
    pub const fn butler(&self) -> &Butler { &self.butler }

    #[must_use]
    pub const fn listener(&self) -> &WindowEventListener { &self.listener }

    #[must_use]
    pub fn boundary(&self) -> &PanicBoundary { &self.boundary }

    #[must_use]
    pub const fn keybinds(&self) -> &KeybindHook { &self.keybinds }

    /// Handles one owner-queue message. Breaks on shutdown.
    pub fn handle_message(&self, message: OwnerMessage) -> ControlFlow<()> {
        match message {
            OwnerMessage::RelayoutWindow { window, generation } => self.listener.relayout(window, generation),
            OwnerMessage::RescanMonitors { generation } => self.listener.rescan_monitors(generation),
            OwnerMessage::ReloadKeybindings => match config::reload() {
                Ok(config) => self.keybinds.reload_bindings(&config),
                Err(err) => warn!(error = %err, "config reload failed, keeping current keybindings"),
            },
            OwnerMessage::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Writes the saved state for the next start.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn shutdown(&self) -> TesseraResult<()> {
        let saved = self.store.pick(SavedState::capture);
        saved.save(&self.saved_state_path)?;
        debug!(path = %self.saved_state_path.display(), "state saved for next start");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::WorkspaceConfig;
    use crate::layout::LayoutEngine;
    use crate::native::WindowHandle;
    use crate::native::fake::FakeNative;
    use crate::store::pickers;
    use crate::timer::ManualScheduler;

    fn config_in(dir: &tempfile::TempDir) -> TesseraConfig {
        TesseraConfig {
            workspaces: vec![
                WorkspaceConfig { name: "Code".to_string(), layout_engines: None },
                WorkspaceConfig { name: "Web".to_string(), layout_engines: Some(vec![LayoutEngineKind::Focus]) },
            ],
            saved_state_dir: Some(dir.path().display().to_string()),
            ..TesseraConfig::default()
        }
    }

    fn context(native: &Rc<FakeNative>, config: &TesseraConfig) -> (Context, crate::platform::OwnerQueue) {
        let (owner, queue) = OwnerHandle::channel();
        let ctx = Context::new(config, Rc::clone(native) as Rc<dyn NativeApi>, owner, Rc::new(ManualScheduler::new()))
            .unwrap();
        (ctx, queue)
    }

    #[test]
    fn test_configured_workspaces_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let native = Rc::new(FakeNative::with_single_monitor());
        let (ctx, _queue) = context(&native, &config_in(&dir));

        let names: Vec<_> =
            ctx.store().pick(pickers::all_workspaces).iter().map(|ws| ws.name.clone()).collect();
        assert_eq!(names, vec!["Code".to_string(), "Web".to_string()]);

        let web = ctx.store().pick(pickers::workspace_by_name("Web")).unwrap();
        assert_eq!(web.engines().len(), 1);
        let code = ctx.store().pick(pickers::workspace_by_name("Code")).unwrap();
        assert_eq!(code.engines().len(), 4);
    }

    #[test]
    fn test_tree_engine_is_configurable() {
        let engines = engine_creators(&[LayoutEngineKind::Tree], &MasterConfig::default());
        let engine = engines[0].create();
        assert_eq!(engine.name(), "Tree");
    }

    #[test]
    fn test_workspaces_are_padded_to_monitor_count() {
        let dir = tempfile::tempdir().unwrap();
        let native = Rc::new(FakeNative::with_two_monitors());
        let config = TesseraConfig { saved_state_dir: Some(dir.path().display().to_string()), ..Default::default() };
        let (ctx, _queue) = context(&native, &config);

        assert_eq!(ctx.store().pick(pickers::all_workspaces).len(), 2);
    }

    #[test]
    fn test_saved_state_round_trips_through_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let native = Rc::new(FakeNative::with_single_monitor());
        native.add_window(FakeNative::standard_window(1, "code.exe"));

        let (ctx, _queue) = context(&native, &config);
        let web = ctx.store().pick(pickers::workspace_by_name("Web")).unwrap().id;
        ctx.butler().move_window_to_workspace(web, Some(WindowHandle(1))).unwrap();
        ctx.shutdown().unwrap();
        assert!(config.saved_state_path().exists());

        let (restarted, _queue) = context(&native, &config);
        let workspace = restarted.butler().workspace_for_window(WindowHandle(1)).unwrap();
        assert_eq!(workspace.name, "Web");
        assert!(!config.saved_state_path().exists());
    }

    #[test]
    fn test_shutdown_message_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let native = Rc::new(FakeNative::with_single_monitor());
        let (ctx, _queue) = context(&native, &config_in(&dir));

        assert_eq!(ctx.handle_message(OwnerMessage::Shutdown), ControlFlow::Break(()));
        assert_eq!(
            ctx.handle_message(OwnerMessage::RescanMonitors { generation: 42 }),
            ControlFlow::Continue(())
        );
    }

    #[test]
    fn test_gaps_and_bar_wrap_engines() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.gaps.outer = 10;
        config.bar.height = 30;

        assert_eq!(proxy_creators(&config).len(), 3);
        assert_eq!(proxy_creators(&TesseraConfig::default()).len(), 1);
    }
}
