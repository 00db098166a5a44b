//! # formcraft-store
//!
//! Storage for formcraft. [`InMemoryFormStore`] implements both the
//! [`FormRepository`](formcraft_forms::repository::FormRepository) used by the
//! builder and the authoring API, and the
//! [`SubmissionSink`](formcraft_forms::session::SubmissionSink) used by form
//! sessions.

pub mod memory;

pub use memory::{InMemoryFormStore, SubmissionLog};
