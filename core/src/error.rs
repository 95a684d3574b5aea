use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the query-time core.
///
/// `InvalidQuery`, `NotFound` and `InvalidIdentifier` are caller-facing
/// outcomes; the other two report storage trouble. The display strings are
/// the messages clients see in the `error` field.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing query parameter q")]
    InvalidQuery,

    #[error("Document {0} not found")]
    NotFound(i64),

    #[error("Invalid document ID")]
    InvalidIdentifier(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Search error: {0}")]
    SearchError(String),
}

impl Error {
    /// Storage failures that happened while a query was executing.
    pub(crate) fn into_search(self) -> Self {
        match self {
            Error::StoreUnavailable(msg) => Error::SearchError(msg),
            other => other,
        }
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::InvalidQuery | Error::NotFound(_) | Error::InvalidIdentifier(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self { Error::StoreUnavailable(err.to_string()) }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self { Error::StoreUnavailable(format!("corrupt index: {err}")) }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self { Error::StoreUnavailable(format!("corrupt index meta: {err}")) }
}

/// Parse a document id taken from a request path.
pub fn parse_document_id(raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| Error::InvalidIdentifier(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(Error::InvalidQuery.to_string(), "Missing query parameter q");
        assert_eq!(Error::NotFound(999).to_string(), "Document 999 not found");
        assert_eq!(Error::InvalidIdentifier("abc".into()).to_string(), "Invalid document ID");
    }

    #[test]
    fn parses_integer_ids_only() {
        assert_eq!(parse_document_id("42").unwrap(), 42);
        assert_eq!(parse_document_id("-3").unwrap(), -3);
        assert!(matches!(parse_document_id("abc"), Err(Error::InvalidIdentifier(_))));
        assert!(matches!(parse_document_id(""), Err(Error::InvalidIdentifier(_))));
    }

    #[test]
    fn storage_errors_become_search_errors_during_queries() {
        let err = Error::StoreUnavailable("disk gone".into()).into_search();
        assert_eq!(err.to_string(), "Search error: disk gone");
        assert!(!err.is_caller_error());
    }
}
