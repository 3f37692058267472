// SPDX-License-Identifier: MIT
//! Durable round-trip of the [`Document`] as an opaque blob.
//!
//! Three backends behind one trait: in-process memory (tests, embedding), a
//! local JSON file, and a file in a remote GitHub repository via the contents
//! API. All three speak the same optimistic-concurrency protocol: `load`
//! hands out the current [`VersionToken`] alongside the document, and `save`
//! only accepts a write whose token still matches the store's revision.

pub mod file;
pub mod github;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Document, VersionToken};

#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the entire document and its current revision token.
    ///
    /// Returns an empty document and `None` when no blob exists yet.
    /// Transport failures propagate; the store never retries on its own.
    async fn load(&self) -> Result<(Document, Option<VersionToken>)>;

    /// Serialize the entire document and write it back.
    ///
    /// `token` must match the store's current revision or the write fails
    /// with [`ForumError::Conflict`](crate::error::ForumError::Conflict).
    /// Passing `None` asserts that no blob exists yet; it conflicts too if
    /// one does. Returns the token of the new revision.
    async fn save(&self, doc: &Document, token: Option<&VersionToken>) -> Result<VersionToken>;
}
