//! # formcraft
//!
//! A form builder. Authors compose forms from a palette of field kinds,
//! publish them, and collect validated submissions.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on the
//! individual crates for finer-grained control.

/// Errors, settings, logging and token signing.
pub use formcraft_core as core;

/// The form engine: descriptors, type resolution, schemas, widgets, sessions and the builder.
pub use formcraft_forms as forms;

/// In-memory form repository and submission log.
pub use formcraft_store as store;

/// HTTP API, public form pages and the management CLI.
#[cfg(feature = "server")]
pub use formcraft_server as server;

pub use formcraft_core::{FormcraftError, FormcraftResult, Settings};
pub use formcraft_forms::{BuilderEditor, FieldDescriptor, FieldKind, FormSession};

// Third-party re-exports.
pub use serde_json;
pub use tokio;
pub use tracing;
