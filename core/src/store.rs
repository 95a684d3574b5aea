//! Read-only document store over an on-disk index.

use crate::error::{Error, Result};
use crate::persist::{load_index_header, load_postings_for_term, load_text, IndexPaths};
use crate::tokenizer::TokenizerPolicy;
use crate::{CorpusStats, DocId, DocMeta, Document, DocumentSummary, IndexHeader, MetaFile, Posting};
use std::path::Path;

/// Holds the index header in memory; postings and texts are read from disk on
/// demand, each file scoped to the call that reads it. Shareable across threads.
#[derive(Debug)]
pub struct DocumentStore {
    paths: IndexPaths,
    header: IndexHeader,
}

impl DocumentStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let paths = IndexPaths::new(root);
        let header = load_index_header(&paths).map_err(|e| match e {
            Error::StoreUnavailable(msg) => Error::StoreUnavailable(format!("{}: {msg}", paths.root.display())),
            other => other,
        })?;
        tracing::info!(root = %paths.root.display(), num_docs = header.meta.num_docs, terms = header.dictionary.len(), "document store opened");
        Ok(Self { paths, header })
    }

    pub fn meta(&self) -> &MetaFile { &self.header.meta }

    pub fn policy(&self) -> TokenizerPolicy { self.header.meta.policy }

    pub fn num_docs(&self) -> u32 { self.header.docs.len() as u32 }

    pub fn avg_doc_len(&self) -> f64 { self.header.meta.avg_doc_len() }

    pub fn doc_meta(&self, id: DocId) -> Option<&DocMeta> { self.header.docs.get(&id) }

    /// Every document, ascending by id.
    pub fn list_documents(&self) -> Vec<DocumentSummary> {
        self.header
            .docs
            .iter()
            .map(|(id, meta)| DocumentSummary { id: *id, filename: meta.filename.clone(), size: meta.size })
            .collect()
    }

    /// Look up a document by a caller-supplied id. Ids outside the id space are
    /// simply not found.
    pub fn get_document(&self, id: i64) -> Result<Document> {
        let doc_id = DocId::try_from(id).map_err(|_| Error::NotFound(id))?;
        let meta = self.doc_meta(doc_id).ok_or(Error::NotFound(id))?;
        let content = load_text(&self.paths, &meta.text_path)?;
        Ok(Document { id: doc_id, filename: meta.filename.clone(), content })
    }

    pub(crate) fn content(&self, meta: &DocMeta) -> Result<String> {
        load_text(&self.paths, &meta.text_path)
    }

    pub fn stats(&self) -> CorpusStats {
        self.header.docs.values().fold(CorpusStats::default(), |mut acc, meta| {
            acc.total_documents += 1;
            acc.total_content_bytes += meta.size;
            acc
        })
    }

    /// Posting list of a folded term, sorted by doc id. Unknown terms have none.
    pub fn postings(&self, term: &str) -> Result<Vec<Posting>> {
        match self.header.dictionary.get(term) {
            Some(tid) => load_postings_for_term(&self.paths, *tid),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::IndexBuilder;
    use tempfile::tempdir;

    #[test]
    fn missing_index_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = DocumentStore::open(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
    }

    #[test]
    fn stats_agree_with_listing() {
        let dir = tempdir().unwrap();
        let mut b = IndexBuilder::new(TokenizerPolicy::default());
        b.add_document("one.txt", "Zażółć gęślą jaźń");
        b.add_document("two.txt", "plain ascii");
        b.write(dir.path()).unwrap();

        let store = DocumentStore::open(dir.path()).unwrap();
        let listing = store.list_documents();
        let stats = store.stats();
        assert_eq!(stats.total_documents as usize, listing.len());
        assert_eq!(stats.total_content_bytes, listing.iter().map(|d| d.size).sum::<u64>());
        assert_eq!(listing[0].size, "Zażółć gęślą jaźń".len() as u64);
    }

    #[test]
    fn out_of_range_ids_are_not_found() {
        let dir = tempdir().unwrap();
        let mut b = IndexBuilder::new(TokenizerPolicy::default());
        b.add_document("one.txt", "text");
        b.write(dir.path()).unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        assert!(matches!(store.get_document(-1), Err(Error::NotFound(-1))));
        assert!(matches!(store.get_document(i64::MAX), Err(Error::NotFound(_))));
        assert!(matches!(store.get_document(0), Err(Error::NotFound(0))));
    }
}
