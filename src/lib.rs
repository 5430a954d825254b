// Re-export main components
pub mod api;
pub mod dedup;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod paginator;
pub mod query;
pub mod ranking;
pub mod request_queue;
pub mod tokenizer;

// Re-export commonly used types
pub use dedup::remove_duplicates;
pub use document::{DocId, Document, DocumentStatus};
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use index::TermIndex;
pub use paginator::paginate;
pub use request_queue::RequestQueue;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
