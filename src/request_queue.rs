use crate::document::{DocId, Document, DocumentStatus};
use crate::engine::SearchEngine;
use crate::error::Result;
use std::collections::VecDeque;

/// Length of the sliding window, in requests. Each request advances the
/// queue's clock by one simulated minute.
const MINUTES_IN_DAY: u64 = 1440;

#[derive(Debug)]
struct QueryOutcome {
    timestamp: u64,
    result_count: usize,
}

/// Sliding-window log over the engine's query API.
///
/// Counts how many of the last day's requests produced no results. The queue
/// borrows the engine only for the duration of each call, so the host can
/// interleave document mutations between requests.
#[derive(Debug, Default)]
pub struct RequestQueue {
    requests: VecDeque<QueryOutcome>,
    no_result_requests: usize,
    current_time: u64,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a predicate-filtered search through the log.
    pub fn add_find_request_with<P>(
        &mut self,
        engine: &SearchEngine,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let documents = engine.find_top_documents_with(raw_query, predicate)?;
        self.record(documents.len());
        Ok(documents)
    }

    /// Run a status-filtered search through the log.
    pub fn add_find_request_by_status(
        &mut self,
        engine: &SearchEngine,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.add_find_request_with(engine, raw_query, move |_, document_status, _| {
            document_status == status
        })
    }

    /// Run a default (`Actual`-status) search through the log.
    pub fn add_find_request(
        &mut self,
        engine: &SearchEngine,
        raw_query: &str,
    ) -> Result<Vec<Document>> {
        self.add_find_request_by_status(engine, raw_query, DocumentStatus::Actual)
    }

    /// How many requests inside the current window returned nothing.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    fn record(&mut self, result_count: usize) {
        self.current_time += 1;
        while let Some(oldest) = self.requests.front() {
            if self.current_time - oldest.timestamp < MINUTES_IN_DAY {
                break;
            }
            if oldest.result_count == 0 {
                self.no_result_requests -= 1;
            }
            self.requests.pop_front();
        }
        if result_count == 0 {
            self.no_result_requests += 1;
        }
        self.requests.push_back(QueryOutcome {
            timestamp: self.current_time,
            result_count,
        });
    }
}
