// SPDX-License-Identifier: MIT
//! Local file store: the whole document as one JSON file on disk.
//!
//! The version token is the SHA-256 hex digest of the file's current bytes,
//! so any out-of-band edit to the file invalidates outstanding tokens exactly
//! like a concurrent writer would. Writes land in a sibling temp file first
//! and are renamed into place, so a crash mid-write leaves the old revision
//! intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ForumError, Result};
use crate::model::{Document, VersionToken};
use crate::store::Store;

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 of the file as it exists right now; `None` if absent.
    async fn current_digest(&self) -> Result<Option<String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(digest(&bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl Store for FileStore {
    async fn load(&self) -> Result<(Document, Option<VersionToken>)> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no blob yet — starting empty");
                return Ok((Document::default(), None));
            }
            Err(e) => return Err(e.into()),
        };
        let token = VersionToken(digest(&bytes));
        let raw = String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
        Ok((Document::from_wire(&raw)?, Some(token)))
    }

    async fn save(&self, doc: &Document, token: Option<&VersionToken>) -> Result<VersionToken> {
        let current = self.current_digest().await?;
        if token.map(|t| t.as_str()) != current.as_deref() {
            return Err(ForumError::Conflict);
        }

        let wire = doc.to_wire()?;
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // Stage then rename — same-directory rename is atomic on POSIX.
        let staged = self.path.with_extension("json.tmp");
        tokio::fs::write(&staged, wire.as_bytes()).await?;
        tokio::fs::rename(&staged, &self.path).await?;

        debug!(path = %self.path.display(), propositions = doc.len(), "document written");
        Ok(VersionToken(digest(wire.as_bytes())))
    }
}
