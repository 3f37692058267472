// SPDX-License-Identifier: MIT
//! Philograph core — a minimal forum for philosophical propositions.
//!
//! The whole persisted state is one JSON document: an ordered list of
//! propositions, each with replies, each reply with evaluations. The
//! [`store`] module round-trips that document against one of three backends
//! (in-process, local file, remote GitHub blob) under an optimistic
//! version-token protocol; [`repo`] implements the structured operations on
//! top of it. The CLI in `main.rs` is the user-facing collaborator.

pub mod config;
pub mod error;
pub mod model;
pub mod repo;
pub mod retry;
pub mod session;
pub mod store;

pub use error::{ForumError, Result};
pub use model::{Document, Evaluation, Proposition, Reply, VersionToken};
pub use repo::Repository;
pub use session::Session;
