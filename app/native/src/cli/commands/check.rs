//! `tessera check-config`: loads the configuration the way `run` would and prints
//! what it sets up.

use std::collections::HashSet;

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output::{ellipsize, or_dash, render_json, validity_mark};
use crate::config::{self, ConfigError, LayoutEngineKind, TesseraConfig, WindowRule};
use crate::error::TesseraResult;
use crate::keybind::{Chord, CommandRegistry};

const MAX_COMMANDS_WIDTH: usize = 60;

#[derive(Tabled)]
struct WorkspaceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Layout engines")]
    engines: String,
}

#[derive(Tabled)]
struct KeybindingRow {
    #[tabled(rename = "Chord")]
    chord: String,
    #[tabled(rename = "Commands")]
    commands: String,
    #[tabled(rename = "Valid")]
    valid: String,
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Process")]
    process: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Workspace")]
    workspace: String,
}

/// Loads and validates the configuration.
///
/// # Errors
///
/// Returns the load error, or `ConfigError::Invalid` when problems were found.
pub fn execute(json: bool) -> TesseraResult<()> {
    let (config, path) = config::load()?;

    if json {
        println!("{}", render_json(&serde_json::to_value(&config)?));
        return Ok(());
    }

    println!("{} {}\n", "Configuration:".bold(), path.display());
    print_workspaces(&config);

    let registry = CommandRegistry::with_core_commands();
    print_keybindings(&config, &registry);
    print_routes(&config);

    let problems = find_problems(&config, &registry);
    if problems.is_empty() {
        println!("{}", "Configuration is valid.".green());
        return Ok(());
    }

    for problem in &problems {
        eprintln!("  {} {problem}", "✗".red());
    }
    Err(ConfigError::Invalid(format!("{} problem(s) found", problems.len())).into())
}

/// Everything wrong with the configuration that loading does not reject.
fn find_problems(config: &TesseraConfig, registry: &CommandRegistry) -> Vec<String> {
    let mut problems = Vec::new();

    let mut names = HashSet::new();
    for workspace in &config.workspaces {
        if !names.insert(workspace.name.as_str()) {
            problems.push(format!("workspace {:?} is defined more than once", workspace.name));
        }
    }

    let mut keys: Vec<_> = config.keybindings.iter().collect();
    keys.sort_by(|a, b| a.0.cmp(b.0));
    for (raw, commands) in keys {
        if let Err(err) = raw.parse::<Chord>() {
            problems.push(err.to_string());
        }
        for id in commands.get_commands() {
            if !registry.contains(id) {
                problems.push(format!("{raw:?} is bound to unknown command {id:?}"));
            }
        }
    }

    if !config.workspaces.is_empty() {
        for route in &config.routes {
            if !names.contains(route.workspace.as_str()) {
                problems.push(format!("a route targets unknown workspace {:?}", route.workspace));
            }
        }
    }

    problems
}

fn engines_label(engines: &[LayoutEngineKind]) -> String {
    engines.iter().map(|kind| kind.as_str()).collect::<Vec<_>>().join(", ")
}

fn print_workspaces(config: &TesseraConfig) {
    println!("{}", "Workspaces".bold());
    if config.workspaces.is_empty() {
        println!("  One per monitor, using {}.\n", engines_label(&config.layout_engines));
        return;
    }

    let rows: Vec<_> = config
        .workspaces
        .iter()
        .enumerate()
        .map(|(i, ws)| WorkspaceRow {
            index: i + 1,
            name: ws.name.clone(),
            engines: engines_label(ws.layout_engines.as_deref().unwrap_or(&config.layout_engines)),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string();
    println!("{table}\n");
}

fn print_keybindings(config: &TesseraConfig, registry: &CommandRegistry) {
    println!("{}", "Keybindings".bold());
    if config.keybindings.is_empty() {
        println!("  None configured.\n");
        return;
    }

    let mut rows: Vec<_> = config
        .keybindings
        .iter()
        .map(|(raw, commands)| {
            let chord = raw.parse::<Chord>().map_or_else(|_| raw.clone(), |chord| chord.to_string());
            let valid = raw.parse::<Chord>().is_ok() && commands.get_commands().iter().all(|id| registry.contains(id));
            KeybindingRow {
                chord,
                commands: ellipsize(&commands.commands_display(), MAX_COMMANDS_WIDTH),
                valid: validity_mark(valid),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.chord.cmp(&b.chord));

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::center()))
        .to_string();
    println!("{table}\n");
}

fn print_routes(config: &TesseraConfig) {
    println!("{}", "Routes".bold());
    if config.routes.is_empty() {
        println!("  None configured.\n");
        return;
    }

    let rows: Vec<_> = config
        .routes
        .iter()
        .map(|route| {
            let WindowRule { process_file_name, class_name, title, .. } = &route.rule;
            RouteRow {
                process: or_dash(process_file_name.as_ref()),
                class: or_dash(class_name.as_ref()),
                title: or_dash(title.as_ref()),
                workspace: route.workspace.clone(),
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems(source: &str) -> Vec<String> {
        let config = TesseraConfig::from_jsonc(source).unwrap();
        find_problems(&config, &CommandRegistry::with_core_commands())
    }

    #[test]
    fn test_valid_configuration_has_no_problems() {
        let found = problems(
            r#"{
                "workspaces": [{ "name": "Code" }, { "name": "Web" }],
                "keybindings": { "LWin+LAlt+H": "tessera.core.focus_window_in_direction.left" },
                "routes": [{ "processFileName": "code.exe", "workspace": "Code" }]
            }"#,
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn test_unknown_command_and_bad_chord_are_reported() {
        let found = problems(
            r#"{ "keybindings": {
                "LWin+Banana": "tessera.core.exit",
                "LWin+Q": ["tessera.core.exit", "tessera.core.nope"]
            } }"#,
        );
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|p| p.contains("tessera.core.nope")));
    }

    #[test]
    fn test_route_to_unknown_workspace_is_reported() {
        let found = problems(
            r#"{
                "workspaces": [{ "name": "Code" }, { "name": "Code" }],
                "routes": [{ "className": "Chrome_WidgetWin_1", "workspace": "Web" }]
            }"#,
        );
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_routes_are_not_checked_without_named_workspaces() {
        let found = problems(r#"{ "routes": [{ "title": "Zoom", "workspace": "Workspace 2" }] }"#);
        assert!(found.is_empty());
    }

    #[test]
    fn test_engines_label() {
        assert_eq!(engines_label(&[LayoutEngineKind::Focus, LayoutEngineKind::Master]), "focus, master");
    }
}
