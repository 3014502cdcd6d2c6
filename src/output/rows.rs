use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while serializing rows
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize rows: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One extracted article, as stored in the day artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRow {
    /// Section the article was filed under
    pub category: String,

    /// Article headline
    pub title: String,

    /// Extracted body text
    pub content: String,
}

/// Serializes a day's article rows into the uploaded artifact
pub trait RowSink: Send {
    /// Serializes the rows to the artifact's byte representation
    fn write(&self, rows: &[ArticleRow]) -> Result<Vec<u8>, OutputError>;

    /// File name of the artifact under the day partition
    fn artifact_name(&self) -> &'static str;

    /// Content type the artifact is uploaded with
    fn content_type(&self) -> &'static str;
}

/// JSON implementation of [`RowSink`]
#[derive(Debug, Default)]
pub struct JsonRowSink;

impl RowSink for JsonRowSink {
    fn write(&self, rows: &[ArticleRow]) -> Result<Vec<u8>, OutputError> {
        Ok(serde_json::to_vec_pretty(rows)?)
    }

    fn artifact_name(&self) -> &'static str {
        "articles.json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sink_roundtrip() {
        let rows = vec![
            ArticleRow {
                category: "Politics".to_string(),
                title: "Council session".to_string(),
                content: "Body text.".to_string(),
            },
            ArticleRow {
                category: "Economy".to_string(),
                title: "Oil prices".to_string(),
                content: "More text.".to_string(),
            },
        ];

        let bytes = JsonRowSink.write(&rows).unwrap();
        let parsed: Vec<ArticleRow> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_empty_rows_serialize_to_empty_array() {
        let bytes = JsonRowSink.write(&[]).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "[]");
    }
}
