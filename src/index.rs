use crate::document::DocId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Term index kept as two synchronized views of the same (term, doc, tf)
/// triples:
///
/// - inverted: term -> (doc id -> term frequency)
/// - forward:  doc id -> (term -> term frequency)
///
/// Invariant: a triple present in one view is present in the other. All
/// mutation goes through [`add_document`](Self::add_document) and
/// [`remove_document`](Self::remove_document), which update both views.
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    word_to_docs: BTreeMap<String, BTreeMap<DocId, f64>>,
    doc_to_words: BTreeMap<DocId, BTreeMap<String, f64>>,
}

impl TermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document's words. Each occurrence contributes
    /// `1 / words.len()` to the word's frequency in this document, so the
    /// frequencies of a document sum to 1.
    ///
    /// The word list must already be stop-word-free and validated; an empty
    /// list indexes nothing.
    pub fn add_document(&mut self, doc_id: DocId, words: &[String]) {
        if words.is_empty() {
            return;
        }
        let occurrence_weight = 1.0 / words.len() as f64;
        for word in words {
            *self
                .word_to_docs
                .entry(word.clone())
                .or_default()
                .entry(doc_id)
                .or_insert(0.0) += occurrence_weight;
            *self
                .doc_to_words
                .entry(doc_id)
                .or_default()
                .entry(word.clone())
                .or_insert(0.0) += occurrence_weight;
        }
    }

    /// Drop a document from both views. Words whose posting map becomes empty
    /// are deleted entirely. Unknown ids are a no-op.
    pub fn remove_document(&mut self, doc_id: DocId) {
        let Some(word_frequencies) = self.doc_to_words.remove(&doc_id) else {
            return;
        };
        for word in word_frequencies.keys() {
            if let Some(postings) = self.word_to_docs.get_mut(word) {
                postings.remove(&doc_id);
                if postings.is_empty() {
                    self.word_to_docs.remove(word);
                }
            }
        }
    }

    /// Posting map of a word: doc id -> term frequency.
    pub fn postings(&self, word: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.word_to_docs.get(word)
    }

    /// Forward entry of a document: word -> term frequency.
    pub fn word_frequencies(&self, doc_id: DocId) -> Option<&BTreeMap<String, f64>> {
        self.doc_to_words.get(&doc_id)
    }

    /// Number of documents containing a word (for IDF calculation).
    pub fn doc_frequency(&self, word: &str) -> usize {
        self.word_to_docs.get(word).map_or(0, BTreeMap::len)
    }

    /// Whether the given document contains the given word.
    pub fn contains(&self, word: &str, doc_id: DocId) -> bool {
        self.word_to_docs
            .get(word)
            .is_some_and(|postings| postings.contains_key(&doc_id))
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        let total_postings = self.word_to_docs.values().map(BTreeMap::len).sum::<usize>();
        IndexStats {
            total_terms: self.word_to_docs.len(),
            total_postings,
            avg_docs_per_term: if self.word_to_docs.is_empty() {
                0.0
            } else {
                total_postings as f64 / self.word_to_docs.len() as f64
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexStats {
    pub total_terms: usize,
    pub total_postings: usize,
    pub avg_docs_per_term: f64,
}
