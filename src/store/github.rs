// SPDX-License-Identifier: MIT
//! Remote store: a single file in a GitHub repository, driven through the
//! contents API as a makeshift versioned blob store.
//!
//! Protocol:
//! - `GET /repos/{owner}/{repo}/contents/{path}` → `{content: base64, sha}`,
//!   or 404 when the file does not exist yet.
//! - `PUT` the same URL with `{message, content: base64, sha?, branch?}` →
//!   the new blob sha, or 409/422 when the presented sha is stale (another
//!   writer committed first).
//!
//! The bearer token arrives out-of-band (environment) and is never logged.
//! Every request carries an explicit timeout so a hung remote call bounds the
//! interaction instead of blocking it forever.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ForumError, Result};
use crate::model::{Document, VersionToken};
use crate::store::Store;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const COMMIT_MESSAGE: &str = "philograph: update propositions";

/// Where the blob lives and how to reach it.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API root, default `https://api.github.com`. Overridable for tests and
    /// GitHub Enterprise hosts.
    pub api_base_url: String,
    pub owner: String,
    pub repo: String,
    /// Path of the JSON file inside the repository.
    pub path: String,
    /// Branch to read and commit to. `None` = the repository default.
    pub branch: Option<String>,
    /// Bearer credential. Supplied via environment, never hardcoded or logged.
    pub token: String,
}

// ─── API payloads ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    /// Base64 with embedded newlines, as the API returns it.
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: BlobRef,
}

#[derive(Debug, Deserialize)]
struct BlobRef {
    sha: String,
}

// ─── Store ────────────────────────────────────────────────────────────────────

pub struct GithubStore {
    config: GithubConfig,
    client: reqwest::Client,
}

impl GithubStore {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            // GitHub rejects requests without a User-Agent.
            .user_agent(concat!("philograph/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.path
        )
    }
}

/// Decode a contents-API blob: base64 interleaved with newlines.
fn decode_blob(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64.decode(compact)?;
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

#[async_trait]
impl Store for GithubStore {
    async fn load(&self) -> Result<(Document, Option<VersionToken>)> {
        let url = self.contents_url();
        let mut req = self.client.get(&url).bearer_auth(&self.config.token);
        if let Some(branch) = &self.config.branch {
            req = req.query(&[("ref", branch.as_str())]);
        }

        let resp = req.send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => {
                debug!("remote blob absent — starting empty");
                Ok((Document::default(), None))
            }
            status if status.is_success() => {
                let body: ContentsResponse = resp.json().await?;
                let raw = decode_blob(&body.content)?;
                let doc = Document::from_wire(&raw)?;
                debug!(propositions = doc.len(), "remote blob fetched");
                Ok((doc, Some(VersionToken(body.sha))))
            }
            status => Err(ForumError::UnexpectedStatus { status, url }),
        }
    }

    async fn save(&self, doc: &Document, token: Option<&VersionToken>) -> Result<VersionToken> {
        let url = self.contents_url();
        let body = PutRequest {
            message: COMMIT_MESSAGE,
            content: BASE64.encode(doc.to_wire()?),
            sha: token.map(VersionToken::as_str),
            branch: self.config.branch.as_deref(),
        };

        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            // 409 = sha mismatch; 422 = missing sha for an existing file.
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(ForumError::Conflict),
            status if status.is_success() => {
                let body: PutResponse = resp.json().await?;
                debug!(propositions = doc.len(), "remote blob committed");
                Ok(VersionToken(body.content.sha))
            }
            status => Err(ForumError::UnexpectedStatus { status, url }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GithubConfig {
        GithubConfig {
            api_base_url: "https://api.github.com".into(),
            owner: "philograph-io".into(),
            repo: "data".into(),
            path: "propositions.json".into(),
            branch: None,
            token: "t".into(),
        }
    }

    #[test]
    fn contents_url_joins_cleanly() {
        let store = GithubStore::new(config()).unwrap();
        assert_eq!(
            store.contents_url(),
            "https://api.github.com/repos/philograph-io/data/contents/propositions.json"
        );

        let mut trailing = config();
        trailing.api_base_url = "https://ghe.example.com/api/v3/".into();
        let store = GithubStore::new(trailing).unwrap();
        assert_eq!(
            store.contents_url(),
            "https://ghe.example.com/api/v3/repos/philograph-io/data/contents/propositions.json"
        );
    }

    #[test]
    fn decodes_blob_with_embedded_newlines() {
        // "[]\n" as the API would return it, wrapped mid-stream.
        let decoded = decode_blob("W10K\n").unwrap();
        assert_eq!(decoded, "[]\n");

        let wrapped = "WwogICAg\nXQo=\n";
        let decoded = decode_blob(wrapped).unwrap();
        assert_eq!(decoded, "[\n    ]\n");
    }

    #[test]
    fn contents_response_parses_canned_payload() {
        let body: ContentsResponse = serde_json::from_str(
            r#"{
                "name": "propositions.json",
                "path": "propositions.json",
                "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
                "size": 3,
                "content": "W10K\n",
                "encoding": "base64"
            }"#,
        )
        .unwrap();
        assert_eq!(body.sha, "3d21ec53a331a6f037a91c368710b99387d012c1");
        assert_eq!(decode_blob(&body.content).unwrap(), "[]\n");
    }

    #[test]
    fn put_response_yields_new_blob_sha() {
        let body: PutResponse = serde_json::from_str(
            r#"{
                "content": { "name": "propositions.json", "sha": "deadbeef" },
                "commit": { "sha": "cafebabe" }
            }"#,
        )
        .unwrap();
        assert_eq!(body.content.sha, "deadbeef");
    }

    #[test]
    fn put_request_omits_absent_sha_and_branch() {
        let req = PutRequest {
            message: "m",
            content: "W10K".into(),
            sha: None,
            branch: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("sha").is_none());
        assert!(json.get("branch").is_none());
    }
}
