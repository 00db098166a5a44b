//! # formcraft-forms
//!
//! The dynamic form engine. A user-authored list of field descriptors is
//! turned into a validated, server-rendered form:
//!
//! 1. [`resolver`] picks a [`FieldKind`] for every descriptor, from its
//!    explicit `type` or by inference from its label.
//! 2. [`schema`] synthesizes a [`ValidationSchema`] from the resolved kinds.
//! 3. [`widgets`] and [`bound_field`] render each field's control.
//! 4. [`session`] holds the entered values, validates them on submit and
//!    hands accepted records to a [`SubmissionSink`].
//!
//! [`builder`] is the authoring side: it composes and edits descriptor lists
//! and saves them through a [`FormRepository`].
//!
//! ## Modules
//!
//! - [`descriptor`] - Field descriptors, kinds, row-groups and documents
//! - [`resolver`] - Type resolution and the label inference table
//! - [`schema`] - Validation schema synthesis and caching
//! - [`validation`] - Coercion and validation of submitted values
//! - [`form_data`] - Parsed urlencoded form bodies
//! - [`widgets`] - One HTML widget per field kind, plus the auxiliary context
//! - [`bound_field`] - A field bound to its value and errors
//! - [`session`] - The form session controller and the submission sink
//! - [`page`] - Loading a published form for the public page
//! - [`builder`] - The builder editor
//! - [`repository`] - The persistence collaborator

pub mod bound_field;
pub mod builder;
pub mod descriptor;
pub mod form_data;
pub mod page;
pub mod repository;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod validation;
pub mod widgets;

pub use builder::{BuilderEditor, FieldPath, FieldUpdate, Navigation, SaveOutcome};
pub use descriptor::{FieldDescriptor, FieldKind, FieldsPayload, FormDocument, FormEntry};
pub use form_data::FormData;
pub use page::LoadState;
pub use repository::{FormPatch, FormRepository, FormSummary, NewForm, PublishedForm};
pub use resolver::resolve;
pub use schema::{synthesize, ValidationSchema};
pub use session::{FormSession, SessionState, Submission, SubmissionAck, SubmissionSink, SubmitOutcome};
pub use widgets::AuxContext;
