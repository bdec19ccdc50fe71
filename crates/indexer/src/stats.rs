use serde::{Deserialize, Serialize};

/// Statistics about an indexing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of files chunked and embedded
    pub files: usize,

    /// Number of files skipped (already indexed)
    pub skipped: usize,

    /// Number of chunks produced across all files
    pub chunks: usize,

    /// Number of records written to the store
    pub records: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Errors encountered, one message per failed file
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self {
            files: 0,
            skipped: 0,
            chunks: 0,
            records: 0,
            time_ms: 0,
            errors: Vec::new(),
        }
    }

    pub fn add_file(&mut self, chunks: usize, records: usize) {
        self.files += 1;
        self.chunks += chunks;
        self.records += records;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files indexed, {} skipped, {} chunks, {} records, {} errors in {} ms",
            self.files,
            self.skipped,
            self.chunks,
            self.records,
            self.errors.len(),
            self.time_ms
        )
    }
}
