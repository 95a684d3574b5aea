//! Read-only full-text search over a fixed corpus of text documents.

pub mod build;
pub mod catalog;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod search;
pub mod snippet;
pub mod store;
pub mod tokenizer;

pub use error::{Error, Result};
pub use index::{CorpusStats, DocId, DocMeta, Document, DocumentSummary, IndexHeader, MetaFile, Posting, TermId};
pub use search::{QueryEngine, SearchOptions, SearchResult, SearchResults, MAX_RESULTS};
pub use store::DocumentStore;
