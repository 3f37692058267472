// SPDX-License-Identifier: MIT
//! In-process store: a single mutex-guarded document with a monotonic
//! revision counter as the version token.
//!
//! This is the backend tests run against and the one an embedding host uses
//! when nothing needs to outlive the process. State starts empty every run,
//! matching the purely in-memory revision of the original forum.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{ForumError, Result};
use crate::model::{Document, VersionToken};
use crate::store::Store;

#[derive(Default)]
struct Inner {
    doc: Document,
    /// 0 = never written. Token is the decimal revision number.
    revision: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> Result<(Document, Option<VersionToken>)> {
        let inner = self.inner.lock().await;
        let token = (inner.revision > 0).then(|| VersionToken(inner.revision.to_string()));
        Ok((inner.doc.clone(), token))
    }

    async fn save(&self, doc: &Document, token: Option<&VersionToken>) -> Result<VersionToken> {
        let mut inner = self.inner.lock().await;
        let current = (inner.revision > 0).then(|| inner.revision.to_string());
        if token.map(|t| t.as_str()) != current.as_deref() {
            return Err(ForumError::Conflict);
        }
        // Round-trip through the wire codec, like the durable backends do.
        let wire = doc.to_wire()?;
        inner.doc = Document::from_wire(&wire)?;
        inner.revision += 1;
        Ok(VersionToken(inner.revision.to_string()))
    }
}
