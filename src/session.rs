// SPDX-License-Identifier: MIT
//! Session context: who is acting.
//!
//! The original forum kept the logged-in label in global mutable page state;
//! here it is an explicit value passed into every repository operation.
//! "Identity" is only a generated display label — there is no credential
//! check, by design.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const SESSION_FILE: &str = "session.json";

/// The acting user's context for one interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Display label stamped onto everything this session posts.
    pub user: String,
}

impl Session {
    /// Start an identity: mint a `Researcher_xxxx` label.
    pub fn start() -> Self {
        let suffix = &uuid::Uuid::new_v4().simple().to_string()[..4];
        Self {
            user: format!("Researcher_{suffix}"),
        }
    }

    pub fn with_user(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    fn file_path(data_dir: &Path) -> PathBuf {
        data_dir.join(SESSION_FILE)
    }

    /// Persist the session so consecutive CLI invocations act as one session.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        std::fs::write(Self::file_path(data_dir), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The previously started session, if any.
    pub fn load_from(data_dir: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(Self::file_path(data_dir)) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stop the identity: forget the stored session.
    pub fn clear(data_dir: &Path) -> Result<()> {
        match std::fs::remove_file(Self::file_path(data_dir)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
