use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A semantic unit extracted from a source file by the syntax path.
///
/// `content` is always a contiguous, unmodified substring of the original
/// file, with one exception: the synthetic header chunk of an oversized
/// class, whose body is rebuilt from the class name and docstring only.
///
/// Field order matters here: records are serialized in declaration order
/// as `{content, type, name, file_name, parent, docstring}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Exact source text of the unit
    pub content: String,

    /// Semantic kind of the unit
    #[serde(rename = "type")]
    pub kind: ChunkKind,

    /// Identifier of the class/function/attribute group
    pub name: String,

    /// File the unit was extracted from
    #[serde(rename = "file_name")]
    pub origin_file: String,

    /// Enclosing class, absent for top-level units
    pub parent: Option<String>,

    /// Extracted leading docstring, empty when the definition has none;
    /// `None` on grouping chunks
    pub docstring: Option<String>,
}

impl Chunk {
    /// Create a new chunk with no parent and no docstring
    pub fn new(
        content: impl Into<String>,
        kind: ChunkKind,
        name: impl Into<String>,
        origin_file: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            kind,
            name: name.into(),
            origin_file: origin_file.into(),
            parent: None,
            docstring: None,
        }
    }

    /// Builder: set the enclosing class
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder: set the extracted docstring
    #[must_use]
    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Serialize this chunk to its compact record form
    pub fn to_record(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Kind of a syntax chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Combined import block for the whole file
    Import,
    /// Class definition (full class, or the header of an oversized class)
    ClassDefinition,
    /// Packed group of class-level assignments
    ClassAttributes,
    /// Packed group of method definitions
    #[serde(rename = "class_method")]
    MethodGroup,
    /// Top-level function
    Function,
}

impl ChunkKind {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::ClassDefinition => "class_definition",
            Self::ClassAttributes => "class_attributes",
            Self::MethodGroup => "class_method",
            Self::Function => "function",
        }
    }
}

/// The atomic output unit of the document path.
///
/// Documents are assumed single-purpose, so no file or type metadata is
/// attached; the title doubles as the section label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Section title, or `"Q: <question>"` for Q&A pairs
    pub title: String,

    /// Plain text body; Q&A pairs are formatted `"Q: <q>\nA: <a>"`
    pub content: String,
}

impl DocumentChunk {
    /// Create a new document chunk
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Serialize this chunk to its compact record form
    pub fn to_record(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
