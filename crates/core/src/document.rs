//! Context document domain types.
//!
//! These are the value objects the retrieval pipeline works with:
//! JSON source files deserialize into [`ContextDocument`]s, the matcher
//! selects among them, and the prompt assembler formats them.

use serde::{Deserialize, Serialize};

/// A single retrievable document from a context source file.
///
/// Documents are created once at load time and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDocument {
    /// Unique within its source file.
    pub id: String,

    /// Originating file name (e.g. "blogs.json"). Stamped by the store
    /// at load time, not present in the source JSON itself.
    #[serde(default)]
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Tags used for whole-word matching. A document with no tags is
    /// simply never tag-matched.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Body content — a plain string, a list of typed segments, or absent.
    #[serde(default, skip_serializing_if = "DocumentContent::is_missing")]
    pub content: DocumentContent,
}

impl ContextDocument {
    /// The source file name without its `.json` extension.
    pub fn source_stem(&self) -> &str {
        self.source
            .strip_suffix(".json")
            .unwrap_or(&self.source)
    }

    /// `source_stem/id`, the citation form used in transcript suffixes.
    pub fn citation(&self) -> String {
        format!("{}/{}", self.source_stem(), self.id)
    }
}

/// The shape of a document body.
///
/// Source files are loose about this field: it may be a string, an array
/// of `{type, value}` segments, or missing entirely. Modeled as an explicit
/// variant so the prompt assembler resolves each case deliberately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentContent {
    PlainText(String),
    Segments(Vec<Segment>),
    #[default]
    Missing,
}

impl DocumentContent {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// One typed segment of an array-valued content field.
///
/// The declared type is carried through but all segments are rendered as
/// text regardless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: String,
}
