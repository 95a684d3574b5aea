use crate::error::{parse_document_id, Result};
use crate::store::DocumentStore;
use crate::{Document, DocumentSummary};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentListing {
    pub total: usize,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_documents: u64,
    pub total_size: u64,
    pub index_version: u32,
    pub index_created_at: String,
    pub stemming: bool,
}

/// Shapes the catalog reads exposed to clients.
pub struct Catalog<'a> {
    store: &'a DocumentStore,
}

impl<'a> Catalog<'a> {
    pub fn new(store: &'a DocumentStore) -> Self { Self { store } }

    pub fn list(&self) -> DocumentListing {
        let documents = self.store.list_documents();
        DocumentListing { total: documents.len(), documents }
    }

    pub fn stats(&self) -> StatsReport {
        let stats = self.store.stats();
        let meta = self.store.meta();
        StatsReport {
            total_documents: stats.total_documents,
            total_size: stats.total_content_bytes,
            index_version: meta.version,
            index_created_at: meta.created_at.clone(),
            stemming: meta.policy.stem,
        }
    }

    /// Fetch a document by the raw id segment of a request.
    pub fn document(&self, raw_id: &str) -> Result<Document> {
        let id = parse_document_id(raw_id)?;
        self.store.get_document(id)
    }
}
