//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# authlint configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "."

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/_generated/**",
]

# Respect .gitignore files
respect_gitignore = true

[conventions]
# The module that defines the authenticated wrappers; never linted
exempt_file = "convex/auth.ts"

# Import paths whose raw factories are banned (substring match)
server_modules = ["_generated/server"]

# Import paths the wrappers may come from
wrapper_modules = ["./auth", "../auth"]
wrapper_module_substring = "/auth"

# Member chain that must not be called inside an authenticated handler
forbidden_call = ["ctx", "auth", "getUserIdentity"]

[[conventions.banned]]
raw = "query"
wrapper = "authenticatedQuery"
message_id = "useAuthenticatedQuery"

[[conventions.banned]]
raw = "mutation"
wrapper = "authenticatedMutation"
message_id = "useAuthenticatedMutation"

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.no-raw-convex-function]
enabled = true
# severity = "warning"

[rules.no-ctx-identity-lookup]
enabled = true
"#;

const CONFIG_FILE: &str = "authlint.toml";

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("."), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to match your wrapper module");
    println!("  2. Run: authlint check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use authlint_core::{Config, ConventionsConfig};
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_builtin_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.conventions, ConventionsConfig::default());
        assert!(config.is_rule_enabled("no-raw-convex-function"));
        assert!(config.is_rule_enabled("no-ctx-identity-lookup"));
        assert!(config.analyzer.respect_gitignore);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "# mine\n").unwrap();

        assert!(write_config(tmp.path(), false).is_err());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap(),
            "# mine\n"
        );

        write_config(tmp.path(), true).unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap(),
            DEFAULT_CONFIG
        );
    }
}
