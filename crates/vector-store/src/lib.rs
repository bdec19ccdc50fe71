//! # Corpus Vector Store
//!
//! Embedding providers and a flat on-disk store for embedded chunks.
//!
//! The store keeps one record per chunk, tagged with its source file, and
//! persists to a single JSON file. Embedding generation sits behind the
//! [`EmbeddingProvider`] trait so the pipeline can run against a real
//! model or the deterministic [`HashEmbedding`] stub interchangeably.

mod embeddings;
mod error;
mod store;
mod types;

pub use embeddings::{cosine_similarity, EmbeddingProvider, HashEmbedding};
pub use error::{Result, VectorStoreError};
pub use store::EmbeddingStore;
pub use types::StoredRecord;
