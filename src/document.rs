use serde::{Deserialize, Serialize};
use std::fmt;

/// Document identifier, supplied by the caller. Negative ids are rejected at
/// insertion time.
pub type DocId = i32;

/// Classification tag attached to a document when it is added.
///
/// The status never affects how a document is stored or indexed; it only
/// becomes visible at query time, where results can be filtered on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

/// A single ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: i32) -> Self {
        Self {
            id,
            relevance,
            rating,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}
