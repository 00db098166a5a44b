//! # formcraft-core
//!
//! Core types shared by every formcraft crate. This crate has no dependency on
//! the form engine or the HTTP layer.
//!
//! ## Modules
//!
//! - [`error`] - The error taxonomy and result alias
//! - [`settings`] - Application settings with defaults
//! - [`settings_loader`] - TOML/JSON loading and `FORMCRAFT_*` environment overrides
//! - [`logging`] - Tracing subscriber setup and request spans
//! - [`signing`] - HMAC-signed, timestamped principal tokens

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod signing;

// Re-export the most commonly used types at the crate root.
pub use error::{FormcraftError, FormcraftResult, ValidationError};
pub use settings::Settings;
