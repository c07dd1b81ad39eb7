//! # Snapshot Codec
//!
//! The block tree travels inside the generated file as a single comment
//! line:
//!
//! ```text
//! /* PAGESMITH_BLOCKS: {"blocks":[...]} */
//! ```
//!
//! Any `*/` inside the JSON is written as `*\/`, and `<` / `>` as
//! `\u003c` / `\u003e`, so the line can neither close the comment nor
//! contain PHP tags. These are all plain JSON escapes, so decoding needs no
//! extra unescaping step.

use pagesmith_document::{BlockInstance, Document, TemplateRegistry};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

pub const SNAPSHOT_MARKER: &str = "PAGESMITH_BLOCKS";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to serialize block tree: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Serialized block tree would terminate its comment early")]
    MarkerInjectionRejected,
}

/// The persisted part of a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub blocks: Vec<BlockInstance>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub element_styles: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            blocks: doc.blocks.clone(),
            element_styles: doc.element_styles.clone(),
        }
    }

    /// Rebuild an editable document, coercing values against the registry
    pub fn into_document(self, slot_name: &str, registry: &TemplateRegistry) -> Document {
        let mut doc = Document::with_blocks(slot_name, self.blocks);
        doc.element_styles = self.element_styles;
        doc.normalize(registry);
        doc
    }
}

/// Embeds a block tree in generated source and recovers it again
pub trait SnapshotCodec {
    /// The full marker line, without a trailing newline
    fn encode(&self, snapshot: &Snapshot) -> Result<String, SnapshotError>;

    /// `None` when the source has no marker or the marker does not parse
    fn decode(&self, source: &str) -> Option<Snapshot>;
}

/// Codec for the `/* PAGESMITH_BLOCKS: ... */` comment line
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentCodec;

fn marker_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(&format!(r"(?m)^/\* {}: (.*) \*/\r?$", SNAPSHOT_MARKER)).ok()
        })
        .as_ref()
}

impl SnapshotCodec for CommentCodec {
    fn encode(&self, snapshot: &Snapshot) -> Result<String, SnapshotError> {
        let json = serde_json::to_string(snapshot)?
            .replace("*/", "*\\/")
            .replace('<', "\\u003c")
            .replace('>', "\\u003e");

        if json.contains("*/") || json.contains("?>") || json.contains('\n') || json.contains('\r') {
            return Err(SnapshotError::MarkerInjectionRejected);
        }

        Ok(format!("/* {}: {} */", SNAPSHOT_MARKER, json))
    }

    fn decode(&self, source: &str) -> Option<Snapshot> {
        let captures = marker_pattern()?.captures(source)?;
        let json = captures.get(1)?.as_str();

        match serde_json::from_str(json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "snapshot marker found but could not be parsed");
                None
            }
        }
    }
}

/// Recover the document stored in `source`, or an empty one for `slot_name`
pub fn load_document(source: &str, slot_name: &str, registry: &TemplateRegistry) -> Document {
    match CommentCodec.decode(source) {
        Some(snapshot) => snapshot.into_document(slot_name, registry),
        None => Document::new(slot_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_document::FieldValue;

    fn registry() -> &'static TemplateRegistry {
        TemplateRegistry::builtin()
    }

    #[test]
    fn test_encode_is_single_line() {
        let mut doc = Document::new("home");
        let id = doc.add_block(registry(), "textview", None).unwrap();
        doc.update_field(registry(), id, "content", "line one\nline two").unwrap();

        let line = CommentCodec.encode(&Snapshot::from_document(&doc)).unwrap();
        assert!(line.starts_with("/* PAGESMITH_BLOCKS: {"));
        assert!(line.ends_with("} */"));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_comment_terminator_in_value_is_neutralised() {
        let mut doc = Document::new("home");
        let id = doc.add_block(registry(), "heading", None).unwrap();
        doc.update_field(registry(), id, "text", "a */ b */").unwrap();

        let line = CommentCodec.encode(&Snapshot::from_document(&doc)).unwrap();
        assert_eq!(line.matches("*/").count(), 1);

        let restored = CommentCodec.decode(&line).unwrap();
        assert_eq!(
            restored.blocks[0].data.get("text"),
            Some(&FieldValue::from("a */ b */"))
        );
    }

    #[test]
    fn test_decode_finds_marker_among_other_lines() {
        let mut doc = Document::new("footer");
        doc.add_block(registry(), "divider", None).unwrap();
        let line = CommentCodec.encode(&Snapshot::from_document(&doc)).unwrap();
        let source = format!("<?php\n{}\n?>\n<footer></footer>\n", line);

        let restored = load_document(&source, "footer", registry());
        assert!(restored.content_eq(&doc));
    }

    #[test]
    fn test_decode_missing_or_broken_marker() {
        assert!(CommentCodec.decode("<p>hand written</p>").is_none());
        assert!(CommentCodec
            .decode("/* PAGESMITH_BLOCKS: {not json} */")
            .is_none());

        let doc = load_document("/* PAGESMITH_BLOCKS: [1, */", "home", registry());
        assert!(doc.is_empty());
        assert_eq!(doc.slot_name, "home");
    }

    #[test]
    fn test_decoded_ids_are_fresh() {
        let mut doc = Document::new("home");
        let id = doc.add_block(registry(), "spacer", None).unwrap();
        let line = CommentCodec.encode(&Snapshot::from_document(&doc)).unwrap();

        let restored = load_document(&line, "home", registry());
        assert_ne!(restored.blocks[0].id, id);
    }
}
