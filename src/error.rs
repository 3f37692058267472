// SPDX-License-Identifier: MIT
//! Error taxonomy for the forum core.
//!
//! Every failure mode a store or repository operation can hit is a variant
//! here. The reference behavior this crate replaces swallowed most of these
//! (missing mutation targets, empty input, rejected writes); they are all
//! explicit values now so callers must handle them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForumError {
    /// The remote endpoint was unreachable or the request itself failed.
    /// Fatal to the current interaction; the store never retries internally.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote endpoint answered, but with a status the protocol does not
    /// define (anything other than success, not-found on read, or conflict
    /// on write).
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The version token presented on `save` no longer matches the store's
    /// current revision — another writer committed in between. The caller
    /// must reload and reapply (see [`crate::retry`]).
    #[error("version conflict: the document changed since it was loaded")]
    Conflict,

    /// The targeted proposition id is absent from the document.
    #[error("proposition {id} not found")]
    NotFound { id: String },

    /// The reply index is invalid for the proposition's current reply count.
    /// A real risk: the index may have been computed from a stale snapshot.
    #[error("reply index {index} out of bounds for proposition {id} ({len} replies)")]
    ReplyIndexOutOfBounds {
        id: String,
        index: usize,
        len: usize,
    },

    /// Empty user input that would otherwise have been silently dropped.
    #[error("{field} must not be empty")]
    Validation { field: &'static str },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document: {0}")]
    Serde(#[from] serde_json::Error),

    /// The remote blob was not valid base64.
    #[error("malformed blob encoding: {0}")]
    Encoding(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, ForumError>;
