use serde::{Deserialize, Serialize};

/// One embedded chunk as persisted in the store.
///
/// The wire names mirror the collection schema this store replaces, so
/// dumps stay interchangeable with existing tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    /// Source file the text came from, relative to the indexed root
    #[serde(rename = "file_name")]
    pub origin_file: String,

    /// The chunk text that was embedded
    pub text: String,

    /// Embedding vector, normalized to unit length
    #[serde(rename = "vector_embeddings")]
    pub vector: Vec<f32>,
}

impl StoredRecord {
    pub fn new(origin_file: impl Into<String>, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            origin_file: origin_file.into(),
            text: text.into(),
            vector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_uses_collection_field_names() {
        let record = StoredRecord::new("a.py", "x = 1", vec![0.0, 1.0]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"file_name":"a.py","text":"x = 1","vector_embeddings":[0.0,1.0]}"#
        );
    }
}
