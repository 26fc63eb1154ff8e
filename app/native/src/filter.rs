//! The filter chain deciding which windows are never managed.

use tracing::debug;

use crate::config::WindowRule;
use crate::model::Window;
use crate::rules::any_rule_matches;

/// Shell surfaces and helper windows that must never be tiled.
const DEFAULT_IGNORED_CLASSES: &[&str] =
    &["Shell_TrayWnd", "Shell_SecondaryTrayWnd", "Progman", "WorkerW", "SysListView32"];

const DEFAULT_IGNORED_PROCESSES: &[&str] =
    &["SearchHost.exe", "StartMenuExperienceHost.exe", "ShellExperienceHost.exe"];

type Predicate = Box<dyn Fn(&Window) -> bool>;

/// Ordered ignore rules plus arbitrary predicates.
pub struct FilterChain {
    rules: Vec<WindowRule>,
    predicates: Vec<Predicate>,
}

impl Default for FilterChain {
    fn default() -> Self { Self::with_defaults() }
}

impl FilterChain {
    /// A chain with no rules at all.
    #[must_use]
    pub fn empty() -> Self { Self { rules: Vec::new(), predicates: Vec::new() } }

    /// A chain holding the built-in shell ignores.
    #[must_use]
    pub fn with_defaults() -> Self {
        let classes = DEFAULT_IGNORED_CLASSES.iter().map(|class| WindowRule::class(class));
        let processes = DEFAULT_IGNORED_PROCESSES.iter().map(|process| WindowRule::process(process));
        Self { rules: classes.chain(processes).collect(), predicates: Vec::new() }
    }

    /// Appends prepared rules.
    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = WindowRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn add_predicate(&mut self, predicate: impl Fn(&Window) -> bool + 'static) {
        self.predicates.push(Box::new(predicate));
    }

    #[must_use]
    pub fn should_ignore(&self, window: &Window) -> bool {
        let ignored = any_rule_matches(&self.rules, window) || self.predicates.iter().any(|p| p(window));
        if ignored {
            debug!(%window, "window ignored by filter");
        }
        ignored
    }
}
