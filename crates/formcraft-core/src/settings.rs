//! Settings for formcraft.
//!
//! [`Settings`] holds all service configuration with sensible defaults.
//! Settings are loaded once at startup (see [`crate::settings_loader`]) and
//! passed explicitly to the components that need them.

use serde::{Deserialize, Serialize};

/// Upload dropzone configuration handed to `file` fields at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropzoneSettings {
    /// Maximum number of files a single field accepts.
    pub max_files: usize,
    /// Maximum size of a single file, in bytes.
    pub max_size: u64,
    /// Whether more than one file may be selected at once.
    pub multiple: bool,
}

impl Default for DropzoneSettings {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_size: 4 * 1024 * 1024,
            multiple: true,
        }
    }
}

/// The complete set of service settings.
///
/// # Examples
///
/// ```
/// use formcraft_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.port, 3000);
/// assert_eq!(settings.reorder_debounce_ms, 1000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The secret key used to sign principal tokens.
    pub secret_key: String,
    /// Retired secret keys still accepted when verifying tokens.
    pub secret_key_fallbacks: Vec<String>,

    // ── Server ───────────────────────────────────────────────────────

    /// The host the HTTP server binds to.
    pub host: String,
    /// The port the HTTP server binds to.
    pub port: u16,

    // ── Auth ─────────────────────────────────────────────────────────

    /// Maximum age of a principal token in seconds.
    pub token_max_age: u64,

    // ── Builder ──────────────────────────────────────────────────────

    /// Quiet period before a within-row reorder is committed, in milliseconds.
    pub reorder_debounce_ms: u64,

    // ── Rendering ────────────────────────────────────────────────────

    /// Dropzone configuration for `file` fields.
    pub dropzone: DropzoneSettings,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level or filter directive (e.g. "info", "formcraft=debug").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            secret_key: String::new(),
            secret_key_fallbacks: Vec::new(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            token_max_age: 60 * 60 * 24 * 14,
            reorder_debounce_ms: 1000,
            dropzone: DropzoneSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Returns the `host:port` pair the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert!(s.secret_key.is_empty());
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.port, 3000);
        assert_eq!(s.token_max_age, 1_209_600);
        assert_eq!(s.reorder_debounce_ms, 1000);
        assert_eq!(s.log_level, "info");
        assert!(s.secret_key_fallbacks.is_empty());
    }

    #[test]
    fn test_default_dropzone() {
        let d = DropzoneSettings::default();
        assert_eq!(d.max_files, 5);
        assert_eq!(d.max_size, 4_194_304);
        assert!(d.multiple);
    }

    #[test]
    fn test_bind_address() {
        let mut s = Settings::default();
        s.host = "0.0.0.0".to_string();
        s.port = 8080;
        assert_eq!(s.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_settings_serde_roundtrip_keeps_nested_dropzone() {
        let mut s = Settings::default();
        s.dropzone.max_files = 2;
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dropzone.max_files, 2);
    }
}
