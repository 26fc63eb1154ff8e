//! Global keybindings.
//!
//! The low-level keyboard hook calls [`KeybindHook::handle_key_down`] for every
//! key-down. The hook reads the modifier state from the OS, forms a [`Chord`] and
//! runs the commands bound to it. Each command runs inside the shared
//! [`PanicBoundary`], so a panicking command never unwinds into the OS callback.

pub mod chord;
pub mod commands;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub use chord::{Chord, KeybindParseError, Modifiers};
pub use commands::{Command, CommandContext, CommandRegistry};
use tracing::{debug, info, warn};

use crate::butler::Butler;
use crate::config::{KeybindingCommands, TesseraConfig};
use crate::platform::PanicBoundary;

pub type Bindings = HashMap<Chord, Vec<String>>;

/// Parses the configured keybindings. Invalid chords are returned alongside the
/// bindings that did parse.
#[must_use]
pub fn parse_bindings(
    keybindings: &HashMap<String, KeybindingCommands>,
    unify: bool,
) -> (Bindings, Vec<KeybindParseError>) {
    let mut bindings = Bindings::new();
    let mut errors = Vec::new();

    for (raw, commands) in keybindings {
        match raw.parse::<Chord>() {
            Ok(chord) => {
                let chord = if unify { chord.unified() } else { chord };
                let ids = commands.get_commands().into_iter().map(str::to_string);
                bindings.entry(chord).or_default().extend(ids);
            }
            Err(err) => errors.push(err),
        }
    }
    (bindings, errors)
}

pub struct KeybindHook {
    butler: Butler,
    boundary: Rc<PanicBoundary>,
    commands: CommandRegistry,
    bindings: RefCell<Bindings>,
    unify: Cell<bool>,
}

impl KeybindHook {
    #[must_use]
    pub fn new(
        butler: Butler,
        boundary: Rc<PanicBoundary>,
        commands: CommandRegistry,
        config: &TesseraConfig,
    ) -> Self {
        let hook = Self {
            butler,
            boundary,
            commands,
            bindings: RefCell::new(Bindings::new()),
            unify: Cell::new(config.unify_key_modifiers),
        };
        hook.reload_bindings(config);
        hook
    }

    /// Replaces the bindings and the panic policy with the ones in `config`.
    pub fn reload_bindings(&self, config: &TesseraConfig) {
        let (bindings, errors) = parse_bindings(&config.keybindings, config.unify_key_modifiers);
        for err in &errors {
            warn!(error = %err, "skipping keybinding");
        }
        for id in bindings.values().flatten() {
            if !self.commands.contains(id) {
                warn!(command = %id, "keybinding refers to an unknown command");
            }
        }

        info!(count = bindings.len(), "keybindings loaded");
        self.unify.set(config.unify_key_modifiers);
        self.boundary.set_policy(config.uncaught_error_policy);
        *self.bindings.borrow_mut() = bindings;
    }

    #[must_use]
    pub fn bindings(&self) -> Bindings { self.bindings.borrow().clone() }

    /// Handles a key-down of virtual key `key`. Returns `true` when at least one
    /// bound command ran, in which case the key is swallowed.
    pub fn handle_key_down(&self, key: u8) -> bool {
        if chord::vk::is_modifier(key) {
            return false;
        }
        let Some(state) = self.butler.store().native().keyboard_state() else {
            return false;
        };

        let modifiers = Modifiers::from_keyboard_state(&state);
        let chord = Chord::new(if self.unify.get() { modifiers.unified() } else { modifiers }, key);

        let Some(ids) = self.bindings.borrow().get(&chord).cloned() else {
            return false;
        };

        let mut handled = false;
        for id in &ids {
            let Some(command) = self.commands.get(id) else {
                warn!(%chord, command = %id, "unknown command");
                continue;
            };
            handled = true;
            self.run(&chord, command);
        }
        handled
    }

    fn run(&self, chord: &Chord, command: &Command) {
        debug!(%chord, command = %command.id, "running command");
        let ctx = CommandContext { butler: &self.butler, owner: self.boundary.owner() };

        if let Some(Err(err)) = self.boundary.run(&command.id, || command.execute(&ctx)) {
            debug!(command = %command.id, error = %err, "command failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::UncaughtErrorPolicy;
    use crate::native::fake::FakeNative;
    use crate::platform::{OwnerHandle, OwnerMessage, OwnerQueue};
    use crate::store::pickers;
    use crate::store::test_support::store_with;

    struct Fixture {
        native: Rc<FakeNative>,
        butler: Butler,
        queue: OwnerQueue,
        hook: KeybindHook,
    }

    fn fixture(commands: CommandRegistry, keybindings: &[(&str, &str)], configure: impl FnOnce(&mut TesseraConfig)) -> Fixture {
        let native = Rc::new(FakeNative::with_single_monitor());
        let butler = Butler::new(Rc::new(store_with(&native, &["a", "b"])));
        let (owner, queue) = OwnerHandle::channel();

        let mut config = TesseraConfig::default();
        for (chord, command) in keybindings {
            config.keybindings.insert((*chord).to_string(), KeybindingCommands::Single((*command).to_string()));
        }
        configure(&mut config);

        let boundary = Rc::new(PanicBoundary::new(owner, config.uncaught_error_policy));
        let hook = KeybindHook::new(butler.clone(), boundary, commands, &config);
        Fixture { native, butler, queue, hook }
    }

    fn active_name(butler: &Butler) -> String { butler.store().pick(pickers::active_workspace).unwrap().name.clone() }

    #[test]
    fn test_bound_chord_runs_command() {
        let f = fixture(CommandRegistry::with_core_commands(), &[("Win+2", "tessera.core.activate_workspace_2")], |_| {});
        f.native.press_key(chord::vk::LWIN);

        assert!(f.hook.handle_key_down(b'2'));
        assert_eq!(active_name(&f.butler), "b");
    }

    #[test]
    fn test_unbound_chord_passes_through() {
        let f = fixture(CommandRegistry::with_core_commands(), &[("Win+2", "tessera.core.activate_workspace_2")], |_| {});

        assert!(!f.hook.handle_key_down(b'2'));
        f.native.press_key(chord::vk::LSHIFT);
        assert!(!f.hook.handle_key_down(b'2'));
        assert!(!f.hook.handle_key_down(chord::vk::LWIN));
        assert_eq!(active_name(&f.butler), "a");
    }

    #[test]
    fn test_unified_modifiers_match_either_side() {
        let f = fixture(CommandRegistry::with_core_commands(), &[("LWin+2", "tessera.core.activate_workspace_2")], |_| {});
        f.native.press_key(chord::vk::RWIN);
        assert!(f.hook.handle_key_down(b'2'));
    }

    #[test]
    fn test_sided_modifiers_without_unify() {
        let f = fixture(CommandRegistry::with_core_commands(), &[("LWin+2", "tessera.core.activate_workspace_2")], |c| {
            c.unify_key_modifiers = false;
        });
        f.native.press_key(chord::vk::RWIN);
        assert!(!f.hook.handle_key_down(b'2'));
    }

    #[test]
    fn test_unknown_command_is_not_handled() {
        let f = fixture(CommandRegistry::with_core_commands(), &[("Win+Q", "tessera.core.missing")], |_| {});
        f.native.press_key(chord::vk::LWIN);
        assert!(!f.hook.handle_key_down(b'Q'));
    }

    #[test]
    fn test_invalid_chords_are_skipped() {
        let mut keybindings = HashMap::new();
        keybindings.insert("Win+Hyper".to_string(), KeybindingCommands::Single("x".to_string()));
        keybindings.insert("Alt+J".to_string(), KeybindingCommands::Multiple(vec!["a".to_string(), "b".to_string()]));

        let (bindings, errors) = parse_bindings(&keybindings, true);
        assert_eq!(errors.len(), 1);
        assert_eq!(bindings.get(&"Alt+J".parse::<Chord>().unwrap()), Some(&vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_panic_is_logged_and_contained() {
        let mut commands = CommandRegistry::empty();
        commands.add("test.panic", "Panic", |_| panic!("boom"));

        let mut f = fixture(commands, &[("Alt+P", "test.panic")], |_| {});
        f.native.press_key(chord::vk::LMENU);

        assert!(f.hook.handle_key_down(b'P'));
        assert!(f.queue.drain().is_empty());
    }

    #[test]
    fn test_panic_with_shutdown_policy_requests_exit() {
        let mut commands = CommandRegistry::empty();
        commands.add("test.panic", "Panic", |_| panic!("boom"));

        let mut f = fixture(commands, &[("Alt+P", "test.panic")], |c| {
            c.uncaught_error_policy = UncaughtErrorPolicy::Shutdown;
        });
        f.native.press_key(chord::vk::LMENU);

        assert!(f.hook.handle_key_down(b'P'));
        assert_eq!(f.queue.drain(), vec![OwnerMessage::Shutdown]);
    }

    #[test]
    fn test_reload_replaces_bindings() {
        let f = fixture(CommandRegistry::with_core_commands(), &[("Win+2", "tessera.core.activate_workspace_2")], |_| {});
        let mut config = TesseraConfig::default();
        config
            .keybindings
            .insert("Alt+2".to_string(), KeybindingCommands::Single("tessera.core.activate_workspace_2".to_string()));
        f.hook.reload_bindings(&config);

        f.native.press_key(chord::vk::LWIN);
        assert!(!f.hook.handle_key_down(b'2'));
        f.native.release_key(chord::vk::LWIN);
        f.native.press_key(chord::vk::LMENU);
        assert!(f.hook.handle_key_down(b'2'));
    }
}
