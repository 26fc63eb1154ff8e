//! Terminal rendering for `check-config`.
//!
//! The JSON view walks the loaded [`serde_json::Value`] instead of re-scanning
//! serialized text: keys are cyan, strings green, numbers yellow, booleans and
//! null magenta.

use std::fmt::Write as _;

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Renders `value` as indented, colored JSON.
#[must_use]
pub fn render_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str(&"null".magenta().to_string()),
        Value::Bool(flag) => out.push_str(&flag.to_string().magenta().to_string()),
        Value::Number(number) => out.push_str(&number.to_string().yellow().to_string()),
        Value::String(text) => out.push_str(&quoted(text).green().to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(fields) if fields.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str(&"[".bold().to_string());
            for (i, item) in items.iter().enumerate() {
                open_line(out, i, depth + 1);
                write_value(out, item, depth + 1);
            }
            close_line(out, depth, "]");
        }
        Value::Object(fields) => {
            out.push_str(&"{".bold().to_string());
            for (i, (key, field)) in fields.iter().enumerate() {
                open_line(out, i, depth + 1);
                let _ = write!(out, "{}: ", quoted(key).cyan());
                write_value(out, field, depth + 1);
            }
            close_line(out, depth, "}");
        }
    }
}

fn open_line(out: &mut String, index: usize, depth: usize) {
    if index > 0 {
        out.push(',');
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn close_line(out: &mut String, depth: usize, bracket: &str) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&bracket.bold().to_string());
}

fn quoted(text: &str) -> String { Value::String(text.to_string()).to_string() }

/// Shortens `text` to at most `max` characters, ending in `…` when cut.
#[must_use]
pub fn ellipsize(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// A check or cross mark for table cells.
#[must_use]
pub fn validity_mark(valid: bool) -> String {
    if valid { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// A rule field for table cells, `-` when the rule does not constrain it.
#[must_use]
pub fn or_dash(value: Option<&String>) -> String { value.cloned().unwrap_or_else(|| "-".to_string()) }

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn plain(value: &Value) -> String {
        colored::control::set_override(false);
        render_json(value)
    }

    #[test]
    fn test_render_json_is_indented() {
        let value = json!({ "workspaces": [{ "name": "Code" }, true, null] });
        let expected = "{\n  \"workspaces\": [\n    {\n      \"name\": \"Code\"\n    },\n    true,\n    null\n  ]\n}";
        assert_eq!(plain(&value), expected);
    }

    #[test]
    fn test_render_json_empty_containers_and_escapes() {
        assert_eq!(plain(&json!({ "routes": [] })), "{\n  \"routes\": []\n}");
        assert_eq!(plain(&json!({})), "{}");
        assert_eq!(plain(&json!("C:\\Users\\\"me\"")), "\"C:\\\\Users\\\\\\\"me\\\"\"");
        assert_eq!(plain(&json!(0.6)), "0.6");
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("tessera.core.exit", 20), "tessera.core.exit");
        assert_eq!(ellipsize("tessera.core.exit", 8), "tessera…");
        assert_eq!(ellipsize("Écran 🌍 principal", 8), "Écran 🌍…");
        assert_eq!(ellipsize("exit", 0), "…");
    }

    #[test]
    fn test_validity_mark_and_or_dash() {
        assert!(validity_mark(true).contains('✓'));
        assert!(validity_mark(false).contains('✗'));
        assert_eq!(or_dash(Some(&"code.exe".to_string())), "code.exe");
        assert_eq!(or_dash(None), "-");
    }
}
