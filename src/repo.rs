// SPDX-License-Identifier: MIT
//! Structured operations over the document.
//!
//! Every mutation is an explicit optimistic read-modify-write: fetch the full
//! document and its version token, scan linearly for the target, mutate in
//! place, write the full document back under that token. Fetching immediately
//! before each mutation narrows — but cannot close — the window for racing a
//! concurrent writer; when the race is lost, `save` fails with a conflict and
//! the caller decides whether to reload and reapply ([`crate::retry`]).
//!
//! The reference behavior silently dropped empty input and mutations against
//! missing targets; here those are [`Validation`](ForumError::Validation) and
//! [`NotFound`](ForumError::NotFound) errors.

use std::sync::Arc;

use tracing::info;

use crate::error::{ForumError, Result};
use crate::model::{mint_id, now_string, Evaluation, Proposition, Reply};
use crate::session::Session;
use crate::store::Store;

pub struct Repository {
    store: Arc<dyn Store>,
}

impl Repository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Post a new proposition and return it, freshly-minted id included.
    ///
    /// Whitespace-only content counts as empty.
    pub async fn create_proposition(
        &self,
        session: &Session,
        content: &str,
    ) -> Result<Proposition> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ForumError::Validation {
                field: "proposition content",
            });
        }

        let (mut doc, token) = self.store.load().await?;
        let proposition = Proposition {
            id: mint_id(),
            author: session.user.clone(),
            content: content.to_string(),
            time: now_string(),
            replies: Vec::new(),
        };
        doc.push(proposition.clone());
        self.store.save(&doc, token.as_ref()).await?;

        info!(id = %proposition.id, author = %proposition.author, "proposition posted");
        Ok(proposition)
    }

    /// Append a reply (with an empty evaluations sequence) to a proposition.
    pub async fn add_reply(
        &self,
        session: &Session,
        proposition_id: &str,
        content: &str,
    ) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ForumError::Validation {
                field: "reply content",
            });
        }

        let (mut doc, token) = self.store.load().await?;
        let proposition = doc.find_mut(proposition_id).ok_or_else(|| ForumError::NotFound {
            id: proposition_id.to_string(),
        })?;
        proposition.replies.push(Reply {
            author: session.user.clone(),
            content: content.to_string(),
            evaluations: Vec::new(),
        });
        self.store.save(&doc, token.as_ref()).await?;

        info!(id = %proposition_id, author = %session.user, "reply added");
        Ok(())
    }

    /// Append an evaluation to the `reply_index`-th reply of a proposition.
    ///
    /// The index may come from a stale snapshot of the document, so an
    /// out-of-bounds index is an expected error, not a panic.
    pub async fn add_evaluation(
        &self,
        session: &Session,
        proposition_id: &str,
        reply_index: usize,
        text: &str,
    ) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ForumError::Validation {
                field: "evaluation text",
            });
        }

        let (mut doc, token) = self.store.load().await?;
        let proposition = doc.find_mut(proposition_id).ok_or_else(|| ForumError::NotFound {
            id: proposition_id.to_string(),
        })?;
        let len = proposition.replies.len();
        let reply = proposition
            .replies
            .get_mut(reply_index)
            .ok_or(ForumError::ReplyIndexOutOfBounds {
                id: proposition_id.to_string(),
                index: reply_index,
                len,
            })?;
        reply
            .evaluations
            .push(Evaluation::new(session.user.clone(), text));
        self.store.save(&doc, token.as_ref()).await?;

        info!(id = %proposition_id, reply_index, author = %session.user, "evaluation added");
        Ok(())
    }

    /// All propositions in storage (insertion) order. Presentation reverses
    /// for newest-first display.
    pub async fn list_propositions(&self) -> Result<Vec<Proposition>> {
        let (doc, _) = self.store.load().await?;
        Ok(doc.propositions)
    }
}
