//! Named commands that keybindings run.
//!
//! Core commands are registered under the `tessera.core.` prefix. Each one is a
//! single errand on the [`Butler`] or a store dispatch.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::butler::Butler;
use crate::geometry::Direction;
use crate::layout::LayoutEngineCustomAction;
use crate::native::WindowHandle;
use crate::platform::{OwnerHandle, OwnerMessage};
use crate::router::WorkspaceTarget;
use crate::store::transforms::{CycleLayoutEngine, PerformCustomAction, RemoveWorkspace};
use crate::store::{StoreError, StoreResult, pickers};

pub const CORE_PREFIX: &str = "tessera.core";

/// Workspaces reachable through `activate_workspace_N` and `move_window_to_workspace_N`.
const NUMBERED_WORKSPACES: usize = 10;

/// What a command can reach while it runs.
pub struct CommandContext<'a> {
    pub butler: &'a Butler,
    pub owner: &'a OwnerHandle,
}

pub type CommandCallback = Rc<dyn Fn(&CommandContext<'_>) -> StoreResult<()>>;

#[derive(Clone)]
pub struct Command {
    pub id: String,
    pub title: String,
    callback: CommandCallback,
}

impl Command {
    /// # Errors
    ///
    /// Returns the error of the errand the command runs.
    pub fn execute(&self, ctx: &CommandContext<'_>) -> StoreResult<()> { (self.callback)(ctx) }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("id", &self.id).field("title", &self.title).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    #[must_use]
    pub fn empty() -> Self { Self::default() }

    /// Registers `callback` under `id`, replacing any earlier command with that id.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        callback: impl Fn(&CommandContext<'_>) -> StoreResult<()> + 'static,
    ) {
        let id = id.into();
        self.commands.insert(id.clone(), Command { id, title: title.into(), callback: Rc::new(callback) });
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Command> { self.commands.get(id) }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool { self.commands.contains_key(id) }

    /// Commands in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> { self.commands.values() }

    #[must_use]
    pub fn len(&self) -> usize { self.commands.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.commands.is_empty() }

    #[must_use]
    pub fn with_core_commands() -> Self {
        let mut registry = Self::empty();
        let mut core = |name: &str, title: &str, callback: fn(&CommandContext<'_>) -> StoreResult<()>| {
            registry.add(format!("{CORE_PREFIX}.{name}"), title, callback);
        };

        core("focus_window_in_direction.left", "Focus the window to the left", |c| focus(c, Direction::Left));
        core("focus_window_in_direction.right", "Focus the window to the right", |c| focus(c, Direction::Right));
        core("focus_window_in_direction.up", "Focus the window above", |c| focus(c, Direction::Up));
        core("focus_window_in_direction.down", "Focus the window below", |c| focus(c, Direction::Down));
        core("swap_window_in_direction.left", "Swap with the window to the left", |c| {
            c.butler.swap_in_direction(Direction::Left)
        });
        core("swap_window_in_direction.right", "Swap with the window to the right", |c| {
            c.butler.swap_in_direction(Direction::Right)
        });
        core("swap_window_in_direction.up", "Swap with the window above", |c| c.butler.swap_in_direction(Direction::Up));
        core("swap_window_in_direction.down", "Swap with the window below", |c| {
            c.butler.swap_in_direction(Direction::Down)
        });

        core("activate_previous_workspace", "Activate the previous workspace", |c| {
            c.butler.activate_adjacent(None, true, false)
        });
        core("activate_next_workspace", "Activate the next workspace", |c| c.butler.activate_adjacent(None, false, false));
        core("move_window_to_previous_monitor", "Move the window to the previous monitor", |c| {
            c.butler.move_window_to_adjacent_monitor(None, true)
        });
        core("move_window_to_next_monitor", "Move the window to the next monitor", |c| {
            c.butler.move_window_to_adjacent_monitor(None, false)
        });
        core("move_window_to_previous_workspace", "Move the window to the previous workspace", |c| {
            c.butler.move_window_to_adjacent_workspace(None, true, false)
        });
        core("move_window_to_next_workspace", "Move the window to the next workspace", |c| {
            c.butler.move_window_to_adjacent_workspace(None, false, false)
        });

        core("cycle_layout_engine.next", "Cycle to the next layout engine", |c| {
            c.butler.store().dispatch(CycleLayoutEngine { workspace: None, reverse: false }).map(|_| ())
        });
        core("cycle_layout_engine.previous", "Cycle to the previous layout engine", |c| {
            c.butler.store().dispatch(CycleLayoutEngine { workspace: None, reverse: true }).map(|_| ())
        });
        core("focus_layout.toggle_maximized", "Toggle maximized in the focus layout", |c| {
            let action = LayoutEngineCustomAction::new("Focus.toggle_maximized", None);
            c.butler.store().dispatch(PerformCustomAction { workspace: None, action }).map(|_| ())
        });
        core("layout_all_active_workspaces", "Lay out every visible workspace", |c| c.butler.layout_all());
        core("focus_monitor_desktop", "Focus the desktop of the active monitor", |c| c.butler.focus_monitor_desktop(None));
        core("close_current_workspace", "Close the active workspace", |c| {
            let active = c.butler.store().pick(pickers::active_workspace)?;
            c.butler.store().dispatch(RemoveWorkspace(WorkspaceTarget::Id(active.id)))
        });
        core("exit", "Exit", |c| {
            c.owner.post(OwnerMessage::Shutdown);
            Ok(())
        });

        for n in 1..=NUMBERED_WORKSPACES {
            registry.add(
                format!("{CORE_PREFIX}.activate_workspace_{n}"),
                format!("Activate workspace {n}"),
                move |c| {
                    let id = nth_workspace(c, n)?;
                    c.butler.activate(id, None)
                },
            );
            registry.add(
                format!("{CORE_PREFIX}.move_window_to_workspace_{n}"),
                format!("Move the window to workspace {n}"),
                move |c| {
                    let id = nth_workspace(c, n)?;
                    c.butler.move_window_to_workspace(id, None)
                },
            );
        }

        registry
    }
}

fn focus(ctx: &CommandContext<'_>, direction: Direction) -> StoreResult<()> {
    ctx.butler.focus_in_direction(direction).map(|_: Option<WindowHandle>| ())
}

/// The `n`th workspace, counting from one, in creation order.
fn nth_workspace(ctx: &CommandContext<'_>, n: usize) -> StoreResult<crate::model::WorkspaceId> {
    ctx.butler
        .store()
        .pick(pickers::all_workspaces)
        .get(n - 1)
        .map(|workspace| workspace.id)
        .ok_or(StoreError::WorkspaceIndexOutOfRange(n))
}
