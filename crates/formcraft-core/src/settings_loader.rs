//! Settings loading from a TOML file and the environment.
//!
//! Values are layered, later layers winning:
//!
//! 1. [`Settings::default`]
//! 2. the TOML file, merged table by table (a `[dropzone]` table that only
//!    sets `max_files` keeps the other dropzone defaults)
//! 3. `FORMCRAFT_*` environment variables
//!
//! | Variable | Setting |
//! |---|---|
//! | `FORMCRAFT_SECRET_KEY` | `secret_key` |
//! | `FORMCRAFT_SECRET_KEY_FALLBACKS` | `secret_key_fallbacks` (comma-separated) |
//! | `FORMCRAFT_DEBUG` | `debug` |
//! | `FORMCRAFT_HOST` | `host` |
//! | `FORMCRAFT_PORT` | `port` |
//! | `FORMCRAFT_LOG_LEVEL` | `log_level` |
//! | `FORMCRAFT_TOKEN_MAX_AGE` | `token_max_age` |
//! | `FORMCRAFT_REORDER_DEBOUNCE_MS` | `reorder_debounce_ms` |
//!
//! ```rust,no_run
//! use formcraft_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("formcraft.toml").unwrap();
//! ```

use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{FormcraftError, FormcraftResult};
use crate::settings::Settings;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "FORMCRAFT_";

/// Parses TOML settings layered over the defaults.
pub fn from_toml_str(source: &str) -> FormcraftResult<Settings> {
    let table: toml::Table = source
        .parse()
        .map_err(|e| config_error(format!("invalid TOML: {e}")))?;
    let layer = serde_json::to_value(table)
        .map_err(|e| config_error(format!("unsupported TOML value: {e}")))?;

    let mut merged = serde_json::to_value(Settings::default())?;
    overlay(&mut merged, layer);
    serde_json::from_value(merged).map_err(|e| config_error(format!("invalid settings: {e}")))
}

/// Reads and parses a TOML settings file.
pub fn from_toml_file(path: impl AsRef<Path>) -> FormcraftResult<Settings> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| config_error(format!("cannot read {}: {e}", path.display())))?;
    from_toml_str(&source)
}

/// Reads a TOML settings file, then applies the environment on top.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> FormcraftResult<Settings> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// The defaults with the environment applied.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `FORMCRAFT_*` variables from the process environment.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Applies overrides read through `lookup`, which receives the full variable
/// name (`FORMCRAFT_PORT`). A value that does not parse is ignored.
pub fn apply_overrides_from(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

    if let Some(secret) = var("SECRET_KEY") {
        settings.secret_key = secret;
    }
    if let Some(fallbacks) = var("SECRET_KEY_FALLBACKS") {
        settings.secret_key_fallbacks = fallbacks
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(debug) = var("DEBUG") {
        settings.debug = parse_flag(&debug);
    }
    if let Some(host) = var("HOST") {
        settings.host = host;
    }
    if let Some(level) = var("LOG_LEVEL") {
        settings.log_level = level;
    }
    set_parsed(&mut settings.port, var("PORT"));
    set_parsed(&mut settings.token_max_age, var("TOKEN_MAX_AGE"));
    set_parsed(&mut settings.reorder_debounce_ms, var("REORDER_DEBOUNCE_MS"));
}

fn set_parsed<T: FromStr>(slot: &mut T, raw: Option<String>) {
    if let Some(parsed) = raw.and_then(|v| v.trim().parse().ok()) {
        *slot = parsed;
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Writes `layer` into `base`. Objects merge key by key; anything else replaces.
fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(into), Value::Object(from)) => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn config_error(message: String) -> FormcraftError {
    FormcraftError::ConfigurationError(message)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_toml_layers_over_defaults() {
        let settings = from_toml_str(
            r#"
            secret_key = "from-file"
            port = 8080
            reorder_debounce_ms = 400
            "#,
        )
        .unwrap();
        assert_eq!(settings.secret_key, "from-file");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.reorder_debounce_ms, 400);
        assert_eq!(settings.host, "127.0.0.1");
        assert!(settings.debug);
    }

    #[test]
    fn test_partial_dropzone_table_keeps_other_defaults() {
        let settings = from_toml_str("[dropzone]\nmax_files = 1\n").unwrap();
        assert_eq!(settings.dropzone.max_files, 1);
        assert_eq!(settings.dropzone.max_size, 4 * 1024 * 1024);
        assert!(settings.dropzone.multiple);
    }

    #[test]
    fn test_empty_toml_is_defaults() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings.port, 3000);
        assert!(settings.secret_key.is_empty());
    }

    #[test]
    fn test_bad_toml_is_configuration_error() {
        assert!(matches!(
            from_toml_str("[[dropzone"),
            Err(FormcraftError::ConfigurationError(_))
        ));
        assert!(matches!(
            from_toml_str(r#"port = "eighty""#),
            Err(FormcraftError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_toml_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formcraft.toml");
        std::fs::write(&path, "secret_key = \"file\"\ndebug = false\nport = 4000\n").unwrap();

        let mut settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.secret_key, "file");
        assert!(!settings.debug);

        apply_overrides_from(&mut settings, env(&[("FORMCRAFT_SECRET_KEY", "env")]));
        assert_eq!(settings.secret_key, "env");
        assert_eq!(settings.port, 4000);
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = from_toml_file("/nonexistent/formcraft.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/formcraft.toml"));
    }

    #[test]
    fn test_env_flags_and_numbers() {
        let mut settings = Settings::default();
        apply_overrides_from(
            &mut settings,
            env(&[
                ("FORMCRAFT_DEBUG", "off"),
                ("FORMCRAFT_PORT", "9090"),
                ("FORMCRAFT_TOKEN_MAX_AGE", "60"),
                ("FORMCRAFT_REORDER_DEBOUNCE_MS", "250"),
                ("FORMCRAFT_LOG_LEVEL", "formcraft=debug"),
            ]),
        );
        assert!(!settings.debug);
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.token_max_age, 60);
        assert_eq!(settings.reorder_debounce_ms, 250);
        assert_eq!(settings.log_level, "formcraft=debug");
    }

    #[test]
    fn test_env_fallback_keys() {
        let mut settings = from_toml_str("secret_key_fallbacks = [\"from-file\"]\n").unwrap();
        assert_eq!(settings.secret_key_fallbacks, vec!["from-file"]);
        apply_overrides_from(
            &mut settings,
            env(&[("FORMCRAFT_SECRET_KEY_FALLBACKS", "old-1, old-2,")]),
        );
        assert_eq!(settings.secret_key_fallbacks, vec!["old-1", "old-2"]);
    }

    #[test]
    fn test_env_unparseable_number_is_ignored() {
        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, env(&[("FORMCRAFT_PORT", "http")]));
        assert_eq!(settings.port, 3000);
    }

    #[test]
    fn test_env_other_prefixes_are_ignored() {
        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, env(&[("APP_SECRET_KEY", "nope")]));
        assert!(settings.secret_key.is_empty());
    }

    #[test]
    fn test_overlay_replaces_arrays_and_merges_objects() {
        let mut base = json!({"outer": {"a": 1, "b": 2}, "list": [1, 2, 3]});
        overlay(&mut base, json!({"outer": {"b": 3}, "list": [4]}));
        assert_eq!(base, json!({"outer": {"a": 1, "b": 3}, "list": [4]}));
    }
}
