use crate::document::{DocId, Document, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::index::{IndexStats, TermIndex};
use crate::query::{parse_query, Query};
use crate::ranking::{inverse_document_frequency, sort_and_truncate};
use crate::tokenizer::{is_valid_word, split_into_words};
use std::collections::{BTreeMap, BTreeSet};

/// Rating and status fixed when the document is added.
#[derive(Debug, Clone, Copy)]
struct DocumentRecord {
    rating: i32,
    status: DocumentStatus,
}

/// In-memory ranked full-text search engine.
///
/// Owns every structure it needs: the dual term index, the per-document
/// rating/status records, and the ordered set of known ids. Single-threaded;
/// a concurrent host must serialize access.
pub struct SearchEngine {
    stop_words: BTreeSet<String>,
    index: TermIndex,
    documents: BTreeMap<DocId, DocumentRecord>,
    document_ids: BTreeSet<DocId>,
}

impl SearchEngine {
    /// Create an engine with the given stop words. Blank entries are dropped
    /// and duplicates collapsed before validation; a stop word containing
    /// control characters is rejected.
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words: BTreeSet<String> = stop_words
            .into_iter()
            .map(Into::into)
            .filter(|word| !word.is_empty())
            .collect();
        if let Some(word) = stop_words.iter().find(|word| !is_valid_word(word)) {
            return Err(SearchError::invalid(format!(
                "stop word {word:?} contains control characters"
            )));
        }
        Ok(Self {
            stop_words,
            index: TermIndex::new(),
            documents: BTreeMap::new(),
            document_ids: BTreeSet::new(),
        })
    }

    /// Convenience constructor taking stop words as one whitespace-separated
    /// string.
    pub fn from_text(stop_words: &str) -> Result<Self> {
        Self::new(split_into_words(stop_words))
    }

    /// Add a document under a caller-chosen id.
    ///
    /// Fails on a negative or already used id, an empty ratings list, or
    /// content with control characters. Validation happens before any index
    /// mutation, so a failed call leaves the engine untouched. A document
    /// whose every word is a stop word is legal and indexes nothing.
    pub fn add_document(
        &mut self,
        doc_id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if doc_id < 0 || self.documents.contains_key(&doc_id) {
            return Err(SearchError::invalid(format!(
                "negative or duplicate document id {doc_id}"
            )));
        }
        if ratings.is_empty() {
            return Err(SearchError::invalid(format!(
                "document {doc_id} has an empty ratings list"
            )));
        }
        let words: Vec<String> = split_into_words(text)
            .into_iter()
            .filter(|word| !self.stop_words.contains(word))
            .collect();
        if let Some(word) = words.iter().find(|word| !is_valid_word(word)) {
            return Err(SearchError::invalid(format!(
                "invalid document content: word {word:?} contains control characters"
            )));
        }

        self.index.add_document(doc_id, &words);
        self.documents.insert(
            doc_id,
            DocumentRecord {
                rating: average_rating(ratings),
                status,
            },
        );
        self.document_ids.insert(doc_id);
        Ok(())
    }

    /// Ranked retrieval with a caller-supplied filter over
    /// `(id, status, rating)`. Returns at most [`crate::ranking::MAX_RESULT_COUNT`]
    /// documents, most relevant first.
    pub fn find_top_documents_with<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let query = parse_query(raw_query, &self.stop_words)?;
        Ok(sort_and_truncate(self.find_all_documents(&query, predicate)))
    }

    /// Ranked retrieval keeping only documents with the given status.
    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with(raw_query, move |_, document_status, _| {
            document_status == status
        })
    }

    /// Ranked retrieval over documents with [`DocumentStatus::Actual`].
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Actual)
    }

    /// Which plus words of the query the document contains, in ascending
    /// lexical order, together with the document's status. One matching minus
    /// word vetoes the whole match and yields an empty word list.
    ///
    /// Query parse errors take precedence over the unknown-id check.
    pub fn match_document(
        &self,
        raw_query: &str,
        doc_id: DocId,
    ) -> Result<(Vec<String>, DocumentStatus)> {
        let query = parse_query(raw_query, &self.stop_words)?;
        let record = self
            .documents
            .get(&doc_id)
            .ok_or(SearchError::DocumentNotFound(doc_id))?;

        let frequencies = self.index.word_frequencies(doc_id);
        let document_has =
            |word: &str| frequencies.is_some_and(|frequencies| frequencies.contains_key(word));

        if query.minus_words.iter().any(|word| document_has(word)) {
            return Ok((Vec::new(), record.status));
        }
        let matched_words = query
            .plus_words
            .iter()
            .filter(|word| document_has(word.as_str()))
            .cloned()
            .collect();
        Ok((matched_words, record.status))
    }

    /// Word -> term frequency for the given document. Unknown ids yield an
    /// empty map, not an error.
    pub fn word_frequencies(&self, doc_id: DocId) -> BTreeMap<String, f64> {
        self.index
            .word_frequencies(doc_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a document and every index entry pointing at it. Unknown ids
    /// are a guaranteed no-op.
    pub fn remove_document(&mut self, doc_id: DocId) {
        if !self.documents.contains_key(&doc_id) {
            return;
        }
        self.index.remove_document(doc_id);
        self.documents.remove(&doc_id);
        self.document_ids.remove(&doc_id);
    }

    /// Number of known documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Ascending traversal over known document ids.
    pub fn document_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.document_ids.iter().copied()
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    /// Score every document containing a plus word and passing the predicate,
    /// then drop documents containing any minus word.
    fn find_all_documents<P>(&self, query: &Query, predicate: P) -> Vec<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let mut relevance_by_doc: BTreeMap<DocId, f64> = BTreeMap::new();
        for plus_word in &query.plus_words {
            let Some(postings) = self.index.postings(plus_word) else {
                continue;
            };
            let idf = inverse_document_frequency(self.documents.len(), postings.len());
            for (&doc_id, &term_frequency) in postings {
                let record = &self.documents[&doc_id];
                if predicate(doc_id, record.status, record.rating) {
                    *relevance_by_doc.entry(doc_id).or_insert(0.0) += idf * term_frequency;
                }
            }
        }
        for minus_word in &query.minus_words {
            let Some(postings) = self.index.postings(minus_word) else {
                continue;
            };
            for doc_id in postings.keys() {
                relevance_by_doc.remove(doc_id);
            }
        }
        relevance_by_doc
            .into_iter()
            .map(|(doc_id, relevance)| {
                Document::new(doc_id, relevance, self.documents[&doc_id].rating)
            })
            .collect()
    }
}

/// Integer mean of the ratings, truncating toward zero.
fn average_rating(ratings: &[i32]) -> i32 {
    let sum: i64 = ratings.iter().copied().map(i64::from).sum();
    (sum / ratings.len() as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_DOC_ID: DocId = 42;
    const FIRST_CONTENT: &str = "cat in the city";
    const FIRST_RATINGS: &[i32] = &[1, 2, 3];

    const SECOND_DOC_ID: DocId = 1;
    const SECOND_CONTENT: &str = "orange cat near the library";
    const SECOND_RATINGS: &[i32] = &[4, 5, 6];

    fn engine_without_stop_words() -> SearchEngine {
        SearchEngine::from_text("").unwrap()
    }

    #[test]
    fn test_document_addition() {
        let mut engine = engine_without_stop_words();
        assert_eq!(engine.document_count(), 0);

        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        assert_eq!(engine.document_count(), 1);

        let found = engine.find_top_documents("in").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, FIRST_DOC_ID);

        assert!(engine.find_top_documents("").unwrap().is_empty());
        assert!(engine.find_top_documents("word").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_ids_and_ratings_are_rejected() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();

        assert!(matches!(
            engine.add_document(-1, "cat", DocumentStatus::Actual, &[1]),
            Err(SearchError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.add_document(FIRST_DOC_ID, "cat", DocumentStatus::Actual, &[1]),
            Err(SearchError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.add_document(2, "cat", DocumentStatus::Actual, &[]),
            Err(SearchError::InvalidArgument(_))
        ));
        assert_eq!(engine.document_count(), 1);
    }

    #[test]
    fn test_invalid_content_leaves_engine_untouched() {
        let mut engine = engine_without_stop_words();
        assert!(matches!(
            engine.add_document(7, "nice cat\u{1}dog", DocumentStatus::Actual, &[1]),
            Err(SearchError::InvalidArgument(_))
        ));
        assert_eq!(engine.document_count(), 0);
        // no partial index entries either: "nice" came before the bad word
        assert!(engine.find_top_documents("nice").unwrap().is_empty());
    }

    #[test]
    fn test_stop_words_excluded_from_documents() {
        let mut engine = SearchEngine::from_text("in the").unwrap();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();

        assert!(engine.find_top_documents("in").unwrap().is_empty());
        assert!(engine.find_top_documents("the").unwrap().is_empty());
        assert_eq!(engine.find_top_documents("cat").unwrap().len(), 1);
        assert_eq!(engine.find_top_documents("city").unwrap().len(), 1);
    }

    #[test]
    fn test_stop_word_construction_validation() {
        assert!(SearchEngine::new(["in", "the"]).is_ok());
        // blank entries are dropped before validation
        assert!(SearchEngine::new(["", "in"]).is_ok());
        assert!(matches!(
            SearchEngine::new(["in\u{2}"]),
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_minus_words_exclude_documents() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine
            .add_document(SECOND_DOC_ID, SECOND_CONTENT, DocumentStatus::Actual, SECOND_RATINGS)
            .unwrap();

        assert!(engine.find_top_documents("cat -in -near").unwrap().is_empty());

        let found = engine.find_top_documents("cat -city").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, SECOND_DOC_ID);
    }

    #[test]
    fn test_minus_wins_over_plus_for_same_word() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        assert!(engine.find_top_documents("cat -cat").unwrap().is_empty());
    }

    #[test]
    fn test_document_matching() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();

        let (words, status) = engine.match_document("word", FIRST_DOC_ID).unwrap();
        assert!(words.is_empty());
        assert_eq!(status, DocumentStatus::Actual);

        // matched plus words come back in ascending lexical order
        let (words, _) = engine.match_document("city cat", FIRST_DOC_ID).unwrap();
        assert_eq!(words, vec!["cat", "city"]);

        let (words, _) = engine.match_document("cat -city", FIRST_DOC_ID).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_matching_with_stop_words() {
        let mut engine = SearchEngine::from_text("in the").unwrap();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();

        let (words, _) = engine.match_document("cat in the city", FIRST_DOC_ID).unwrap();
        assert_eq!(words, vec!["cat", "city"]);
    }

    #[test]
    fn test_matching_unknown_document() {
        let engine = engine_without_stop_words();
        assert_eq!(
            engine.match_document("cat", 5),
            Err(SearchError::DocumentNotFound(5))
        );
        // a malformed query is reported before the unknown id
        assert!(matches!(
            engine.match_document("--cat", 5),
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_relevance_calculation() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine
            .add_document(
                SECOND_DOC_ID,
                "orange cat near the library cat",
                DocumentStatus::Actual,
                SECOND_RATINGS,
            )
            .unwrap();

        let result = engine.find_top_documents("cat city").unwrap();
        assert_eq!(result.len(), 2);

        // "cat" is in both documents, so its idf is 0; "city" only in doc 42
        let idf_city = 2.0_f64.ln();
        let expected_first = idf_city * (1.0 / 4.0);
        assert_eq!(result[0].id, FIRST_DOC_ID);
        assert!((result[0].relevance - expected_first).abs() < 1e-6);
        assert!(result[1].relevance.abs() < 1e-6);
    }

    #[test]
    fn test_results_sorted_by_descending_relevance() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine
            .add_document(SECOND_DOC_ID, "cat cat cat cat", DocumentStatus::Actual, SECOND_RATINGS)
            .unwrap();
        engine
            .add_document(2, "black dog train station", DocumentStatus::Actual, &[7, 8, 9])
            .unwrap();
        engine
            .add_document(3, "black cat train cat", DocumentStatus::Actual, &[2, 2, 2])
            .unwrap();

        let result = engine.find_top_documents("cat").unwrap();
        assert!(result
            .windows(2)
            .all(|pair| pair[0].relevance >= pair[1].relevance - 1e-6));
    }

    #[test]
    fn test_equal_relevance_orders_by_rating() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine
            .add_document(SECOND_DOC_ID, SECOND_CONTENT, DocumentStatus::Actual, SECOND_RATINGS)
            .unwrap();

        // "cat" is in both documents: idf 0, relevance 0 for both, so the
        // higher-rated document comes first
        let result = engine.find_top_documents("cat").unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, SECOND_DOC_ID);
        assert_eq!(result[1].id, FIRST_DOC_ID);
    }

    #[test]
    fn test_rating_is_truncated_integer_mean() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(2, "black cat near train station", DocumentStatus::Actual, &[1, 1, 3])
            .unwrap();
        engine
            .add_document(3, "grey dog", DocumentStatus::Actual, &[-1, -2])
            .unwrap();

        let result = engine.find_top_documents("cat").unwrap();
        assert_eq!(result[0].rating, (1 + 1 + 3) / 3);

        // truncation toward zero for negative means
        let result = engine.find_top_documents("dog").unwrap();
        assert_eq!(result[0].rating, -1);
    }

    #[test]
    fn test_filter_by_status() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine
            .add_document(SECOND_DOC_ID, FIRST_CONTENT, DocumentStatus::Banned, SECOND_RATINGS)
            .unwrap();
        engine
            .add_document(2, FIRST_CONTENT, DocumentStatus::Removed, &[1, 1, 3])
            .unwrap();
        engine
            .add_document(3, FIRST_CONTENT, DocumentStatus::Irrelevant, &[2, 2, 2])
            .unwrap();

        let result = engine
            .find_top_documents_by_status("cat", DocumentStatus::Banned)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, SECOND_DOC_ID);

        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Removed, FIRST_RATINGS)
            .unwrap();
        assert!(engine.find_top_documents("cat").unwrap().is_empty());
    }

    #[test]
    fn test_filter_with_predicate() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine
            .add_document(SECOND_DOC_ID, FIRST_CONTENT, DocumentStatus::Banned, SECOND_RATINGS)
            .unwrap();
        engine
            .add_document(2, FIRST_CONTENT, DocumentStatus::Removed, &[3, 3, 3])
            .unwrap();

        let result = engine
            .find_top_documents_with("cat", |_, status, _| status == DocumentStatus::Banned)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, SECOND_DOC_ID);

        // relevance ties resolve by rating: doc 2 (rating 3) before doc 42 (rating 2)
        let result = engine
            .find_top_documents_with("cat", |doc_id, _, _| doc_id % 2 == 0)
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 2);
        assert_eq!(result[1].id, FIRST_DOC_ID);
    }

    #[test]
    fn test_never_more_than_five_results() {
        let mut engine = engine_without_stop_words();
        for doc_id in 0..7 {
            let text = format!("cat {}", "meow ".repeat(doc_id as usize + 1));
            engine
                .add_document(doc_id, &text, DocumentStatus::Actual, &[doc_id])
                .unwrap();
        }
        let result = engine.find_top_documents("cat").unwrap();
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_ascending_id_iteration() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine
            .add_document(SECOND_DOC_ID, SECOND_CONTENT, DocumentStatus::Actual, SECOND_RATINGS)
            .unwrap();

        let ids: Vec<DocId> = engine.document_ids().collect();
        assert_eq!(ids, vec![SECOND_DOC_ID, FIRST_DOC_ID]);
    }

    #[test]
    fn test_word_frequencies() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();

        assert!(engine.word_frequencies(SECOND_DOC_ID).is_empty());

        let frequencies = engine.word_frequencies(FIRST_DOC_ID);
        assert_eq!(frequencies.len(), 4);
        for word in ["cat", "in", "the", "city"] {
            assert!((frequencies[word] - 0.25).abs() < 1e-6);
        }
        let total: f64 = frequencies.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_remove_document_clears_every_structure() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine.remove_document(FIRST_DOC_ID);

        assert_eq!(engine.document_count(), 0);
        assert_eq!(engine.document_ids().count(), 0);
        assert!(engine.word_frequencies(FIRST_DOC_ID).is_empty());
        assert!(engine.find_top_documents("cat").unwrap().is_empty());
        assert_eq!(engine.stats().total_terms, 0);

        // removing an unknown id is a no-op
        engine.remove_document(FIRST_DOC_ID);
        assert_eq!(engine.document_count(), 0);
    }

    #[test]
    fn test_add_remove_add_round_trip() {
        let mut engine = engine_without_stop_words();
        engine
            .add_document(FIRST_DOC_ID, FIRST_CONTENT, DocumentStatus::Actual, FIRST_RATINGS)
            .unwrap();
        engine.remove_document(FIRST_DOC_ID);
        engine
            .add_document(FIRST_DOC_ID, "black dog", DocumentStatus::Actual, &[5])
            .unwrap();

        // no residual frequencies from the first life of the id
        let frequencies = engine.word_frequencies(FIRST_DOC_ID);
        assert_eq!(frequencies.len(), 2);
        assert!(!frequencies.contains_key("cat"));
        assert_eq!(engine.find_top_documents("dog").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_document_is_legal() {
        let mut engine = SearchEngine::from_text("in the").unwrap();
        engine
            .add_document(FIRST_DOC_ID, "in the", DocumentStatus::Actual, &[1])
            .unwrap();
        assert_eq!(engine.document_count(), 1);
        assert!(engine.word_frequencies(FIRST_DOC_ID).is_empty());
        assert!(engine.find_top_documents("in").unwrap().is_empty());
    }
}
