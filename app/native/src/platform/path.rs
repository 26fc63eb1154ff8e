//! Shell-like path expansion for configured paths.

use std::path::PathBuf;

/// Expands `~` and environment variables (`$VAR`, `${VAR}`, `%`-style is not
/// supported). A variable that cannot be expanded leaves the path untouched.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return PathBuf::new();
    }

    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            tracing::debug!(path, error = %err, "path not expanded");
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_empty() {
        assert_eq!(expand("   "), PathBuf::new());
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand("~/tessera/state");
        assert!(!result.to_string_lossy().starts_with('~'));
        assert!(result.ends_with("tessera/state"));
    }

    #[test]
    fn test_unknown_variable_keeps_path() {
        let result = expand("$TESSERA_SURELY_UNSET_VARIABLE/state");
        assert_eq!(result, PathBuf::from("$TESSERA_SURELY_UNSET_VARIABLE/state"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_paths_are_kept() {
        assert_eq!(expand("/var/log/tessera.log"), PathBuf::from("/var/log/tessera.log"));
    }
}
