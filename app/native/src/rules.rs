//! Window rule matching, shared by filters and routes.
//!
//! # Rule Matching
//!
//! Rules use AND logic - all specified properties must match for a rule to match.
//! At least one property must be specified for a rule to be valid.
//!
//! ```text
//! // Rule: processFileName = "firefox.exe"
//! // Matches: any Firefox window
//!
//! // Rule: processFileName = "code.exe", title = "^Settings"
//! // Matches: VS Code windows whose title starts with "Settings"
//! ```

use crate::config::WindowRule;
use crate::model::Window;

/// Checks if a window matches a rule.
///
/// # Matching Behavior
///
/// - `process_file_name`: case-insensitive exact match
/// - `class_name`: exact match
/// - `title`: regular expression search (the rule must be prepared)
#[must_use]
pub fn matches_window(rule: &WindowRule, window: &Window) -> bool {
    if !rule.is_valid() {
        return false;
    }

    if let Some(process) = rule.process_file_name_lowercase()
        && !window.is_process(process)
    {
        return false;
    }

    if let Some(class_name) = &rule.class_name
        && window.class_name != *class_name
    {
        return false;
    }

    if rule.title.is_some() {
        // An unprepared title rule never matches.
        let Some(regex) = rule.title_regex() else {
            return false;
        };
        if !regex.is_match(&window.title) {
            return false;
        }
    }

    true
}

/// Checks if any rule in the list matches the window.
#[must_use]
pub fn any_rule_matches(rules: &[WindowRule], window: &Window) -> bool {
    rules.iter().any(|rule| matches_window(rule, window))
}
