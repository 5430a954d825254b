use crate::engine::SearchEngine;
use std::collections::BTreeSet;

/// Remove every document whose word set repeats the word set of an
/// earlier-added (lower-id) document. Term frequencies are ignored on
/// purpose: two documents built from the same words are duplicates even when
/// the word counts differ.
///
/// Uses only the engine's public surface: ascending id iteration,
/// [`SearchEngine::word_frequencies`] and [`SearchEngine::remove_document`].
pub fn remove_duplicates(engine: &mut SearchEngine) {
    let mut seen_word_sets: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut duplicate_ids = Vec::new();

    for doc_id in engine.document_ids() {
        let word_set: Vec<String> = engine.word_frequencies(doc_id).into_keys().collect();
        if !seen_word_sets.insert(word_set) {
            duplicate_ids.push(doc_id);
        }
    }

    for doc_id in duplicate_ids {
        tracing::info!(doc_id, "removing duplicate document");
        engine.remove_document(doc_id);
    }
}
