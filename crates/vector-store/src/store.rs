use crate::error::{Result, VectorStoreError};
use crate::types::StoredRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// On-disk JSON layout of a persisted store
#[derive(Serialize, Deserialize)]
struct StoreFile {
    dimension: usize,
    records: Vec<StoredRecord>,
}

/// Flat embedding store backed by a single JSON file.
///
/// Records are kept in insertion order. The set of indexed files is
/// tracked separately so the indexer can skip files it has already seen
/// without scanning every record.
pub struct EmbeddingStore {
    path: PathBuf,
    dimension: usize,
    records: Vec<StoredRecord>,
    files: HashSet<String>,
}

impl EmbeddingStore {
    /// Create an empty store that will persist to `path`
    pub fn new(path: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            path: path.into(),
            dimension,
            records: Vec::new(),
            files: HashSet::new(),
        }
    }

    /// Load a previously saved store, verifying the vector dimension
    pub async fn load(path: impl Into<PathBuf>, dimension: usize) -> Result<Self> {
        let path = path.into();
        let raw = tokio::fs::read_to_string(&path).await?;
        let file: StoreFile = serde_json::from_str(&raw)?;

        if file.dimension != dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: dimension,
                actual: file.dimension,
            });
        }

        let files = file
            .records
            .iter()
            .map(|r| r.origin_file.clone())
            .collect();
        log::debug!(
            "Loaded {} records from {}",
            file.records.len(),
            path.display()
        );

        Ok(Self {
            path,
            dimension,
            records: file.records,
            files,
        })
    }

    /// Load the store at `path`, or create an empty one if the file does
    /// not exist yet
    pub async fn load_or_new(path: impl Into<PathBuf>, dimension: usize) -> Result<Self> {
        let path = path.into();
        if tokio::fs::try_exists(&path).await? {
            Self::load(path, dimension).await
        } else {
            Ok(Self::new(path, dimension))
        }
    }

    /// Persist the store to its backing file
    pub async fn save(&self) -> Result<()> {
        let file = StoreFile {
            dimension: self.dimension,
            records: self.records.clone(),
        };
        let raw = serde_json::to_string(&file)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, raw).await?;
        log::debug!(
            "Saved {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Insert a batch of records, rejecting any with the wrong dimension.
    /// Nothing is inserted on rejection.
    pub fn insert_batch(&mut self, records: Vec<StoredRecord>) -> Result<()> {
        for record in &records {
            if record.vector.len() != self.dimension {
                return Err(VectorStoreError::InvalidDimension {
                    expected: self.dimension,
                    actual: record.vector.len(),
                });
            }
        }

        for record in records {
            self.files.insert(record.origin_file.clone());
            self.records.push(record);
        }
        Ok(())
    }

    /// Whether any record from `origin_file` is present
    #[must_use]
    pub fn contains_file(&self, origin_file: &str) -> bool {
        self.files.contains(origin_file)
    }

    /// Remove all records from `origin_file`; errors if none exist
    pub fn remove_file(&mut self, origin_file: &str) -> Result<usize> {
        if !self.files.remove(origin_file) {
            return Err(VectorStoreError::NotFound(origin_file.to_string()));
        }
        let before = self.records.len();
        self.records.retain(|r| r.origin_file != origin_file);
        Ok(before - self.records.len())
    }

    /// Iterate over all records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &StoredRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct files with records in the store
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(file: &str, text: &str, dim: usize) -> StoredRecord {
        StoredRecord::new(file, text, vec![0.5; dim])
    }

    #[test]
    fn insert_tracks_files_and_records() {
        let mut store = EmbeddingStore::new("unused.json", 4);
        store
            .insert_batch(vec![record("a.py", "x", 4), record("a.py", "y", 4)])
            .unwrap();
        store.insert_batch(vec![record("b.md", "z", 4)]).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.file_count(), 2);
        assert!(store.contains_file("a.py"));
        assert!(!store.contains_file("c.py"));
    }

    #[test]
    fn insert_rejects_wrong_dimension_atomically() {
        let mut store = EmbeddingStore::new("unused.json", 4);
        let result = store.insert_batch(vec![record("a.py", "x", 4), record("a.py", "y", 3)]);

        assert!(matches!(
            result,
            Err(VectorStoreError::InvalidDimension {
                expected: 4,
                actual: 3
            })
        ));
        assert!(store.is_empty());
        assert!(!store.contains_file("a.py"));
    }

    #[test]
    fn remove_file_drops_all_its_records() {
        let mut store = EmbeddingStore::new("unused.json", 2);
        store
            .insert_batch(vec![
                record("a.py", "x", 2),
                record("b.py", "y", 2),
                record("a.py", "z", 2),
            ])
            .unwrap();

        let removed = store.remove_file("a.py").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(!store.contains_file("a.py"));

        assert!(matches!(
            store.remove_file("a.py"),
            Err(VectorStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = EmbeddingStore::new(&path, 3);
        store
            .insert_batch(vec![record("a.py", "hello", 3)])
            .unwrap();
        store.save().await.unwrap();

        let loaded = EmbeddingStore::load(&path, 3).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_file("a.py"));
        assert_eq!(loaded.records().next().unwrap().text, "hello");
    }

    #[tokio::test]
    async fn load_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = EmbeddingStore::new(&path, 3);
        store.save().await.unwrap();

        assert!(matches!(
            EmbeddingStore::load(&path, 8).await,
            Err(VectorStoreError::InvalidDimension {
                expected: 8,
                actual: 3
            })
        ));
    }

    #[tokio::test]
    async fn load_or_new_creates_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let store = EmbeddingStore::load_or_new(&path, 5).await.unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), 5);
    }
}
