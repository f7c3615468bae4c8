//! Locates the `authlint.toml` to use for a run.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config` (or `AUTHLINT_CONFIG`), trusted as given
//! 2. `authlint.toml` or `.authlint.toml` in the checked directory or any of
//!    its ancestors, nearest first
//! 3. `config.toml` in `$AUTHLINT_CONFIG_DIR`, else in `~/.authlint/`
//! 4. built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order within one directory.
const PROJECT_CONFIG_NAMES: &[&str] = &["authlint.toml", ".authlint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Overrides the global config directory.
const CONFIG_DIR_ENV: &str = "AUTHLINT_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found next to the checked sources.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Path of the config file, if there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` for a config from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

/// Resolves the config for a run over `target`.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    let source = resolve_inner(target, explicit, global_config_dir());
    tracing::debug!("Config: {source}");
    source
}

fn resolve_inner(target: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(target) {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Searches `target` and its ancestors for a project config.
fn find_project_config(target: &Path) -> Option<PathBuf> {
    let start = if target.is_file() {
        target.parent()?
    } else {
        target
    };
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    start.ancestors().find_map(|dir| {
        PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// The global config directory: `$AUTHLINT_CONFIG_DIR`, else `~/.authlint`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home::home_dir().map(|h| h.join(".authlint")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn canonical(p: &Path) -> PathBuf {
        p.canonicalize().unwrap()
    }

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("authlint.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(result, ConfigSource::Explicit(PathBuf::from("/nonexistent.toml")));
    }

    #[test]
    fn project_config_in_target() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".authlint.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(tmp.path()).join(".authlint.toml"))
        );
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("authlint.toml"), "").unwrap();
        fs::write(tmp.path().join(".authlint.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(tmp.path()).join("authlint.toml"))
        );
    }

    #[test]
    fn project_config_found_in_ancestor() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("authlint.toml"), "").unwrap();
        let convex = tmp.path().join("convex");
        fs::create_dir(&convex).unwrap();
        fs::write(convex.join("notes.ts"), "").unwrap();

        let expected = ConfigSource::Project(canonical(tmp.path()).join("authlint.toml"));
        assert_eq!(resolve_inner(&convex, None, None), expected);
        assert_eq!(resolve_inner(&convex.join("notes.ts"), None, None), expected);
    }

    #[test]
    fn nearest_project_config_wins() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("authlint.toml"), "").unwrap();
        let app = tmp.path().join("app");
        fs::create_dir(&app).unwrap();
        fs::write(app.join(".authlint.toml"), "").unwrap();

        assert_eq!(
            resolve_inner(&app, None, None),
            ConfigSource::Project(canonical(&app).join(".authlint.toml"))
        );
    }

    #[test]
    fn global_used_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(global.path().join("config.toml")));
        assert!(result.is_global());

        fs::write(project.path().join("authlint.toml"), "").unwrap();
        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn empty_global_dir_falls_back_to_defaults() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
        assert_eq!(result.to_string(), "built-in defaults");
    }
}
