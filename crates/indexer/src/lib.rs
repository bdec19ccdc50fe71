//! # Corpus Indexer
//!
//! Walks a corpus directory, chunks every supported file and embeds the
//! chunks into the vector store. Python sources go through the syntax
//! chunker, documentation files through the document chunker; everything
//! else is ignored.

mod error;
mod indexer;
mod scanner;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::CorpusIndexer;
pub use scanner::{source_kind, FileScanner, SourceKind};
pub use stats::IndexStats;
