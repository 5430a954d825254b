use crate::document::DocId;

/// Errors returned by the search engine.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    /// Malformed caller input: bad stop word, negative or duplicate document
    /// id, invalid document content, or a query that does not parse.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation that requires the document to exist was given an unknown id.
    #[error("document {0} not found")]
    DocumentNotFound(DocId),
}

pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }
}
