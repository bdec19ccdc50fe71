use crate::error::{IndexerError, Result};
use crate::scanner::{source_kind, FileScanner, SourceKind};
use crate::stats::IndexStats;
use corpus_chunker::{
    pack_by_size, DocumentChunker, OverflowRule, SyntaxChunker, DEFAULT_CODE_BUDGET,
    DEFAULT_DOC_BUDGET,
};
use corpus_vector_store::{EmbeddingProvider, EmbeddingStore, StoredRecord};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Chunk texts extracted from one file, with the pre-batching unit count
struct FileChunks {
    units: usize,
    texts: Vec<String>,
}

/// Drives the full pipeline: scan a corpus, chunk each file, embed the
/// chunk texts and persist them to the store.
///
/// Files already present in the store are skipped, so re-running over the
/// same corpus only picks up new files. A failure in one file is recorded
/// in the stats and does not abort the run.
pub struct CorpusIndexer<P: EmbeddingProvider> {
    root: PathBuf,
    store_path: PathBuf,
    code_budget: usize,
    doc_budget: usize,
    embedder: P,
}

impl<P: EmbeddingProvider> CorpusIndexer<P> {
    pub fn new(root: impl Into<PathBuf>, store_path: impl Into<PathBuf>, embedder: P) -> Self {
        Self {
            root: root.into(),
            store_path: store_path.into(),
            code_budget: DEFAULT_CODE_BUDGET,
            doc_budget: DEFAULT_DOC_BUDGET,
            embedder,
        }
    }

    /// Builder: override the byte budget for code record batches
    #[must_use]
    pub const fn with_code_budget(mut self, budget: usize) -> Self {
        self.code_budget = budget;
        self
    }

    /// Builder: override the byte budget for document chunks
    #[must_use]
    pub const fn with_doc_budget(mut self, budget: usize) -> Self {
        self.doc_budget = budget;
        self
    }

    /// Index the corpus, returning statistics about the run
    pub async fn index(&self) -> Result<IndexStats> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(
                self.root.display().to_string(),
            ));
        }

        let started = Instant::now();
        let mut stats = IndexStats::new();
        let mut store =
            EmbeddingStore::load_or_new(&self.store_path, self.embedder.dimension()).await?;

        let files = FileScanner::new(&self.root).scan();
        for path in files {
            let name = self.relative_name(&path);

            if store.contains_file(&name) {
                log::debug!("Skipping already indexed {name}");
                stats.add_skipped();
                continue;
            }

            match self.index_file(&path, &name, &mut store).await {
                Ok(Some(chunks)) => stats.add_file(chunks.units, chunks.texts.len()),
                Ok(None) => stats.add_skipped(),
                Err(e) => {
                    log::warn!("Failed to index {name}: {e}");
                    stats.add_error(format!("{name}: {e}"));
                }
            }
        }

        store.save().await?;
        stats.time_ms = started.elapsed().as_millis() as u64;
        log::info!("Indexing finished: {stats}");
        Ok(stats)
    }

    /// Chunk, embed and store one file. Returns `None` when the file
    /// yields no chunks.
    async fn index_file(
        &self,
        path: &Path,
        name: &str,
        store: &mut EmbeddingStore,
    ) -> Result<Option<FileChunks>> {
        let content = tokio::fs::read_to_string(path).await?;
        let chunks = self.chunk_file(path, name, &content)?;

        if chunks.texts.is_empty() {
            return Ok(None);
        }

        let vectors = self.embedder.embed_batch(&chunks.texts).await?;
        let records = chunks
            .texts
            .iter()
            .zip(vectors)
            .map(|(text, vector)| StoredRecord::new(name, text.clone(), vector))
            .collect();
        store.insert_batch(records)?;

        Ok(Some(chunks))
    }

    fn chunk_file(&self, path: &Path, name: &str, content: &str) -> Result<FileChunks> {
        match source_kind(path) {
            Some(SourceKind::Code) => {
                let chunker =
                    SyntaxChunker::new(content, name).with_budget(self.code_budget);
                let units = chunker.chunk_records()?;

                let records = units
                    .iter()
                    .map(corpus_chunker::Chunk::to_record)
                    .collect::<corpus_chunker::Result<Vec<_>>>()?;
                let texts = pack_by_size(records, self.code_budget, String::len, OverflowRule::Reach)
                    .into_iter()
                    .map(|group| group.concat())
                    .collect();

                Ok(FileChunks {
                    units: units.len(),
                    texts,
                })
            }
            Some(SourceKind::Document) => {
                let chunks = DocumentChunker::new(content, name)
                    .with_budget(self.doc_budget)
                    .create_chunks();
                let texts = chunks
                    .iter()
                    .map(corpus_chunker::DocumentChunk::to_record)
                    .collect::<corpus_chunker::Result<Vec<_>>>()?;

                Ok(FileChunks {
                    units: chunks.len(),
                    texts,
                })
            }
            None => Ok(FileChunks {
                units: 0,
                texts: Vec::new(),
            }),
        }
    }

    fn relative_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}
