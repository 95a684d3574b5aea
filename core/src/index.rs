use crate::tokenizer::TokenizerPolicy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;
pub type DocId = u32;

/// Catalog entry for one ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub filename: String,
    /// Content length in bytes.
    pub size: u64,
    /// Number of tokens, used for length normalization when ranking.
    pub length: u32,
    /// Relative path to the stored content, e.g. texts/{doc_id}.txt
    pub text_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>, // sorted token positions
}

impl Posting {
    pub fn tf(&self) -> u32 { self.positions.len() as u32 }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub total_tokens: u64,
    pub created_at: String,
    pub version: u32,
    #[serde(default)]
    pub policy: TokenizerPolicy,
}

impl MetaFile {
    pub const VERSION: u32 = 1;

    pub fn avg_doc_len(&self) -> f64 {
        if self.num_docs == 0 { return 0.0; }
        self.total_tokens as f64 / self.num_docs as f64
    }
}

/// Header structures loaded once per store: dictionary, df, catalog and meta.
/// Posting lists and document texts stay on disk and are read per call.
#[derive(Debug, Clone)]
pub struct IndexHeader {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub docs: BTreeMap<DocId, DocMeta>, // ordered by id
    pub meta: MetaFile,
}

/// A stored document, returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorpusStats {
    pub total_documents: u64,
    pub total_content_bytes: u64,
}
