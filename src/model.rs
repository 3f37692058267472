// SPDX-License-Identifier: MIT
//! Data model and wire format.
//!
//! The persisted blob is a UTF-8 JSON array of propositions with fields
//! exactly `id, author, content, time, replies[]`; each reply carries
//! `author, content, evaluations[]`. The blob is pretty-printed with 4-space
//! indentation and non-ASCII text is kept readable (never `\uXXXX`-escaped)
//! because external tools read the file directly.
//!
//! Evaluations are structured `{author, text}` records in memory but remain a
//! single `"author: text"` string on the wire for compatibility with existing
//! blobs; custom serde converts in both directions.

use serde::{Deserialize, Serialize};

/// A philosophical claim or question posted by a user — the unit of discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposition {
    /// 8 upper-cased hex chars, minted at creation. Random; collisions are
    /// not checked.
    pub id: String,
    /// Display label of the posting session. Not an authenticated identity.
    pub author: String,
    pub content: String,
    /// Preformatted local time, `%Y-%m-%d %H:%M:%S`.
    pub time: String,
    pub replies: Vec<Reply>,
}

/// A response to a proposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Reply {
    pub author: String,
    pub content: String,
    pub evaluations: Vec<Evaluation>,
}

/// A comment on a reply.
///
/// On the wire this is the single string `"author: text"` (historical format);
/// a string without the `": "` separator deserializes with an empty author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub author: String,
    pub text: String,
}

impl Serialize for Evaluation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.author.is_empty() {
            serializer.serialize_str(&self.text)
        } else {
            serializer.serialize_str(&format!("{}: {}", self.author, self.text))
        }
    }
}

impl<'de> Deserialize<'de> for Evaluation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.split_once(": ") {
            Some((author, text)) => Evaluation {
                author: author.to_string(),
                text: text.to_string(),
            },
            None => Evaluation {
                author: String::new(),
                text: raw,
            },
        })
    }
}

impl Evaluation {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }

    /// The historical one-string rendering, as stored on the wire.
    pub fn display_string(&self) -> String {
        if self.author.is_empty() {
            self.text.clone()
        } else {
            format!("{}: {}", self.author, self.text)
        }
    }
}

/// The entire persisted state: an append-only, insertion-ordered sequence of
/// propositions, stored and transmitted as a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Document {
    pub propositions: Vec<Proposition>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.propositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.propositions.is_empty()
    }

    /// Linear scan by identifier. The document carries no index.
    pub fn find(&self, id: &str) -> Option<&Proposition> {
        self.propositions.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Proposition> {
        self.propositions.iter_mut().find(|p| p.id == id)
    }

    pub fn push(&mut self, proposition: Proposition) {
        self.propositions.push(proposition);
    }

    /// Serialize to the wire format: 4-space-indented pretty JSON with
    /// non-ASCII text left readable, plus a trailing newline.
    pub fn to_wire(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        // serde_json always emits valid UTF-8
        Ok(String::from_utf8(buf).expect("serde_json emitted invalid UTF-8"))
    }

    pub fn from_wire(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Opaque revision marker required by the store to accept a write.
///
/// Stale the instant any other writer commits; presenting a stale token makes
/// `save` fail with a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken(pub String);

impl VersionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mint a proposition identifier: 8 upper-cased hex chars.
///
/// Random with no collision check — at forum scale the probability is accepted
/// rather than addressed.
pub fn mint_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// Current local time in the blob's historical format.
pub fn now_string() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> Document {
        Document {
            propositions: vec![Proposition {
                id: "AB12CD34".to_string(),
                author: "Researcher_1a2b".to_string(),
                content: "苏格拉底的'精神助产术'在AI时代是否依然有效？".to_string(),
                time: "2026-08-28 10:15:00".to_string(),
                replies: vec![Reply {
                    author: "Researcher_3c4d".to_string(),
                    content: "Maieutics presumes a human interlocutor.".to_string(),
                    evaluations: vec![Evaluation::new("Researcher_1a2b", "well argued")],
                }],
            }],
        }
    }

    #[test]
    fn wire_round_trip_preserves_everything() {
        let doc = sample_doc();
        let wire = doc.to_wire().unwrap();
        let back = Document::from_wire(&wire).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn wire_format_is_four_space_indented_array() {
        let wire = sample_doc().to_wire().unwrap();
        assert!(wire.starts_with("[\n    {"));
        assert!(wire.ends_with("]\n"));
    }

    #[test]
    fn wire_format_keeps_non_ascii_readable() {
        let wire = sample_doc().to_wire().unwrap();
        assert!(wire.contains("苏格拉底"));
        assert!(!wire.contains("\\u"));
    }

    #[test]
    fn evaluation_serializes_as_prefixed_string() {
        let wire = sample_doc().to_wire().unwrap();
        assert!(wire.contains("\"Researcher_1a2b: well argued\""));
    }

    #[test]
    fn evaluation_without_separator_gets_empty_author() {
        let ev: Evaluation = serde_json::from_str("\"just a bare comment\"").unwrap();
        assert_eq!(ev.author, "");
        assert_eq!(ev.text, "just a bare comment");
    }

    #[test]
    fn evaluation_splits_on_first_separator_only() {
        let ev: Evaluation = serde_json::from_str("\"R_1: nice: very nice\"").unwrap();
        assert_eq!(ev.author, "R_1");
        assert_eq!(ev.text, "nice: very nice");
    }

    #[test]
    fn empty_document_is_an_empty_array() {
        assert_eq!(Document::default().to_wire().unwrap(), "[]\n");
        assert!(Document::from_wire("[]").unwrap().is_empty());
    }

    #[test]
    fn minted_ids_are_eight_upper_hex_chars() {
        for _ in 0..32 {
            let id = mint_id();
            assert_eq!(id.len(), 8);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn find_scans_by_id() {
        let doc = sample_doc();
        assert!(doc.find("AB12CD34").is_some());
        assert!(doc.find("ZZZZZZZZ").is_none());
    }
}
