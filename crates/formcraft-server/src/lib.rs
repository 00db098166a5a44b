//! # formcraft-server
//!
//! The HTTP surface of formcraft, built on axum: the authoring API (scoped to
//! the bearer-token principal), the public JSON API, server-rendered public
//! form pages, and the management commands behind the `formcraft` binary.
//!
//! ## Modules
//!
//! - [`router`] - Route table, tracing layer and the server loop
//! - [`api`] - JSON handlers
//! - [`pages`] - HTML form pages
//! - [`auth`] - The [`Principal`](auth::Principal) extractor
//! - [`error`] - Error responses
//! - [`state`] - Shared handler state
//! - [`command`], [`commands`] - The management CLI

pub mod api;
pub mod auth;
pub mod command;
pub mod commands;
pub mod error;
pub mod pages;
pub mod router;
pub mod state;

pub use router::{build_router, serve};
pub use state::AppState;
