//! # Corpus Chunker
//!
//! Structure-aware chunking for Python source files and loosely
//! structured documentation.
//!
//! ## Philosophy
//!
//! The chunker turns whole files into embedding-sized fragments that:
//! - Preserve syntactic boundaries (imports, classes, methods, functions)
//! - Keep each fragment a verbatim slice of the original file
//! - Group small units together instead of splitting large ones
//!
//! ## Architecture
//!
//! ```text
//! Python Source                     Document Text
//!     │                                 │
//!     ├──> Tree-sitter Parsing          ├──> Section Split (=== / ---)
//!     │                                 │
//!     ├──> Unit Extraction              ├──> Q&A / Narrative Split
//!     │    ├─> Combined imports         │
//!     │    ├─> Classes (split if big)   └──> Small-chunk Merge
//!     │    └─> Top-level functions           │
//!     │                                      └──> DocumentChunk[]
//!     └──> Record Batching
//!          └──> JSON record batches
//! ```
//!
//! ## Example
//!
//! ```rust
//! use corpus_chunker::DocumentChunker;
//!
//! let doc = "\
//! Overview
//! ========
//! **Q: What does this index hold?** A: Metadata records.
//! ";
//!
//! let chunks = DocumentChunker::new(doc, "overview.md").create_chunks();
//! assert!(!chunks.is_empty());
//! for chunk in &chunks {
//!     println!("{}: {} bytes", chunk.title, chunk.content.len());
//! }
//! ```

mod document;
mod error;
mod pack;
mod syntax;
mod types;

pub use document::{DocumentChunker, DEFAULT_DOC_BUDGET};
pub use error::{ChunkerError, Result};
pub use pack::{pack_by_size, OverflowRule};
pub use syntax::{SyntaxChunker, DEFAULT_CODE_BUDGET};
pub use types::{Chunk, ChunkKind, DocumentChunk};
