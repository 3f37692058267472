// SPDX-License-Identifier: MIT
//! Layered configuration.
//!
//! Priority (highest to lowest):
//!   1. CLI flags / env vars — passed as `Some(value)` from clap
//!   2. TOML file at `{data_dir}/config.toml`
//!   3. Built-in defaults
//!
//! The GitHub bearer token is deliberately NOT a config-file field: it comes
//! only from `PHILOGRAPH_GITHUB_TOKEN` (or `GITHUB_TOKEN`) so it never ends
//! up committed alongside the data it guards.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use tracing::error;

use crate::store::file::FileStore;
use crate::store::github::{GithubConfig, GithubStore};
use crate::store::memory::MemoryStore;
use crate::store::Store;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_BLOB_FILE: &str = "propositions.json";

/// Which persistence backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Process-local only; state is gone when the process exits.
    Memory,
    /// One JSON file on local disk.
    File,
    /// A file in a remote GitHub repository via the contents API.
    Github,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "github" => Ok(Self::Github),
            other => bail!("unknown store kind '{other}' — must be one of: memory, file, github"),
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `[github]` section: where the remote blob lives. The token is never read
/// from here.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GithubSection {
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// Path of the JSON file inside the repository (default: `propositions.json`).
    pub path: Option<String>,
    /// Branch to commit to (default: the repository default branch).
    pub branch: Option<String>,
    /// API root override for GitHub Enterprise hosts.
    pub api_base_url: Option<String>,
}

/// `{data_dir}/config.toml` — all fields are optional overrides.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TomlConfig {
    /// Store backend: "memory" | "file" | "github" (default: "file").
    store: Option<String>,
    /// Log level filter string, e.g. "debug", "info,philograph=trace" (default: "info").
    log: Option<String>,
    /// Path of the local JSON blob (default: `{data_dir}/propositions.json`).
    file_path: Option<PathBuf>,
    github: Option<GithubSection>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── Resolved config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Tracing env-filter string.
    pub log: String,
    pub store: StoreKind,
    /// Local blob path (file backend).
    pub file_path: PathBuf,
    /// Remote blob location (github backend).
    pub github: GithubSection,
}

impl Config {
    pub fn new(
        data_dir: Option<PathBuf>,
        store: Option<StoreKind>,
        log: Option<String>,
    ) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // TOML is the lowest-priority override layer.
        let toml = load_toml(&data_dir).unwrap_or_default();

        let store = match store {
            Some(kind) => kind,
            None => toml
                .store
                .as_deref()
                .map(StoreKind::from_str)
                .transpose()
                .context("invalid `store` in config.toml")?
                .unwrap_or(StoreKind::File),
        };
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());
        let file_path = toml
            .file_path
            .unwrap_or_else(|| data_dir.join(DEFAULT_BLOB_FILE));

        Ok(Self {
            data_dir,
            log,
            store,
            file_path,
            github: toml.github.unwrap_or_default(),
        })
    }

    /// Instantiate the configured store backend.
    pub fn build_store(&self) -> Result<Arc<dyn Store>> {
        match self.store {
            StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreKind::File => Ok(Arc::new(FileStore::new(self.file_path.clone()))),
            StoreKind::Github => {
                let gh = &self.github;
                let owner = gh.owner.clone().context("[github] owner not configured")?;
                let repo = gh.repo.clone().context("[github] repo not configured")?;
                let token = github_token()
                    .context("set PHILOGRAPH_GITHUB_TOKEN (or GITHUB_TOKEN) to use the github store")?;
                let store = GithubStore::new(GithubConfig {
                    api_base_url: gh
                        .api_base_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
                    owner,
                    repo,
                    path: gh.path.clone().unwrap_or_else(|| DEFAULT_BLOB_FILE.to_string()),
                    branch: gh.branch.clone(),
                    token,
                })?;
                Ok(Arc::new(store))
            }
        }
    }
}

fn github_token() -> Option<String> {
    std::env::var("PHILOGRAPH_GITHUB_TOKEN")
        .or_else(|_| std::env::var("GITHUB_TOKEN"))
        .ok()
        .filter(|t| !t.is_empty())
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/philograph
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("philograph");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/philograph or ~/.local/share/philograph
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("philograph");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("philograph");
        }
    }
    // Fallback (and Windows): a dot-directory next to the working directory.
    PathBuf::from(".philograph")
}
