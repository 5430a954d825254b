use crate::document::Document;
use std::cmp::Ordering;

/// Upper bound on the number of documents a ranked search returns.
pub const MAX_RESULT_COUNT: usize = 5;

/// Relevances closer than this are considered equal when sorting.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Inverse document frequency of a word:
/// `ln(total_documents / containing_documents)`.
///
/// A word contained in no document contributes nothing.
pub fn inverse_document_frequency(total_documents: usize, containing_documents: usize) -> f64 {
    if containing_documents == 0 {
        return 0.0;
    }
    (total_documents as f64 / containing_documents as f64).ln()
}

/// Order results by descending relevance. Relevances within
/// [`RELEVANCE_EPSILON`] count as tied and fall back to descending rating,
/// then ascending id so equal-rating output stays deterministic. The list is
/// cut to [`MAX_RESULT_COUNT`] entries.
pub fn sort_and_truncate(mut documents: Vec<Document>) -> Vec<Document> {
    documents.sort_by(|lhs, rhs| {
        if (lhs.relevance - rhs.relevance).abs() < RELEVANCE_EPSILON {
            rhs.rating.cmp(&lhs.rating).then(lhs.id.cmp(&rhs.id))
        } else {
            rhs.relevance
                .partial_cmp(&lhs.relevance)
                .unwrap_or(Ordering::Equal)
        }
    });
    documents.truncate(MAX_RESULT_COUNT);
    documents
}
