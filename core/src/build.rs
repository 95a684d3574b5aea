//! Corpus build: assigns document ids, tokenizes content and writes the
//! on-disk index read by [`DocumentStore`](crate::store::DocumentStore).

use crate::error::Result;
use crate::persist::{save_dictionary, save_docs, save_meta, save_postings_for_term, save_text, IndexPaths};
use crate::tokenizer::TokenizerPolicy;
use crate::{DocId, DocMeta, MetaFile, Posting, TermId};
use std::collections::{BTreeMap, HashMap};
use std::fs::{create_dir_all, remove_dir_all};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

pub struct IndexBuilder {
    policy: TokenizerPolicy,
    next_doc_id: DocId,
    next_term_id: TermId,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    postings: HashMap<TermId, Vec<Posting>>, // appended in doc_id order
    docs: BTreeMap<DocId, DocMeta>,
    texts: Vec<(String, String)>,
    total_tokens: u64,
}

impl IndexBuilder {
    pub fn new(policy: TokenizerPolicy) -> Self {
        Self {
            policy,
            next_doc_id: 1,
            next_term_id: 0,
            dictionary: HashMap::new(),
            df: Vec::new(),
            postings: HashMap::new(),
            docs: BTreeMap::new(),
            texts: Vec::new(),
            total_tokens: 0,
        }
    }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    /// Add one document and return its id. Ids start at 1 and follow insertion order.
    pub fn add_document(&mut self, filename: impl Into<String>, content: impl Into<String>) -> DocId {
        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;
        let content = content.into();

        let tokens = self.policy.tokenize(&content);
        let length = tokens.len() as u32;
        let mut positions: HashMap<TermId, Vec<u32>> = HashMap::new();
        for tok in tokens {
            let next_term_id = &mut self.next_term_id;
            let df = &mut self.df;
            let tid = *self.dictionary.entry(tok.term).or_insert_with(|| {
                let id = *next_term_id;
                *next_term_id += 1;
                df.push(0);
                id
            });
            positions.entry(tid).or_default().push(tok.position);
        }
        for (tid, positions) in positions {
            self.df[tid as usize] += 1;
            self.postings.entry(tid).or_default().push(Posting { doc_id, positions });
        }

        let text_path = IndexPaths::text_rel(doc_id);
        self.docs.insert(doc_id, DocMeta { filename: filename.into(), size: content.len() as u64, length, text_path: text_path.clone() });
        self.texts.push((text_path, content));
        self.total_tokens += length as u64;
        doc_id
    }

    /// Persist the index under `root`, replacing any index files already there.
    pub fn write<P: AsRef<Path>>(&self, root: P) -> Result<MetaFile> {
        let paths = IndexPaths::new(root);
        // Files of an earlier, larger build would otherwise linger.
        for dir in [paths.postings_dir(), paths.texts_dir()] {
            if dir.exists() {
                remove_dir_all(&dir)?;
            }
        }
        create_dir_all(paths.texts_dir())?;

        for (rel, content) in &self.texts {
            save_text(&paths, rel, content)?;
        }
        for (term_id, plist) in &self.postings {
            save_postings_for_term(&paths, *term_id, plist)?;
        }
        save_dictionary(&paths, &(self.dictionary.clone(), self.df.clone()))?;
        save_docs(&paths, &self.docs)?;

        let meta = MetaFile {
            num_docs: self.docs.len() as u32,
            total_tokens: self.total_tokens,
            created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            version: MetaFile::VERSION,
            policy: self.policy,
        };
        save_meta(&paths, &meta)?;
        tracing::info!(num_docs = meta.num_docs, num_terms = self.dictionary.len(), root = %paths.root.display(), "index written");
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use tempfile::tempdir;

    #[test]
    fn ids_start_at_one_and_df_counts_documents() {
        let mut b = IndexBuilder::new(TokenizerPolicy::default());
        assert_eq!(b.add_document("a.txt", "light light dark"), 1);
        assert_eq!(b.add_document("b.txt", "light"), 2);
        let tid = b.dictionary["light"] as usize;
        assert_eq!(b.df[tid], 2);
        let plist = &b.postings[&(tid as TermId)];
        assert_eq!(plist[0].positions, vec![0, 1]);
        assert_eq!(plist[1].doc_id, 2);
        assert_eq!(b.total_tokens, 4);
    }

    #[test]
    fn rebuild_drops_stale_files() {
        let dir = tempdir().unwrap();
        let mut big = IndexBuilder::new(TokenizerPolicy::default());
        big.add_document("a.txt", "first book of many words");
        big.add_document("b.txt", "second volume entirely different");
        big.add_document("c.txt", "third part");
        big.write(dir.path()).unwrap();

        let mut small = IndexBuilder::new(TokenizerPolicy::default());
        small.add_document("a.txt", "only");
        small.write(dir.path()).unwrap();

        let paths = IndexPaths::new(dir.path());
        assert!(!dir.path().join("texts/3.txt").exists());
        assert_eq!(std::fs::read_dir(paths.texts_dir()).unwrap().count(), 1);
        assert_eq!(std::fs::read_dir(paths.postings_dir()).unwrap().count(), 1);
        let store = DocumentStore::open(dir.path()).unwrap();
        assert_eq!(store.num_docs(), 1);
        assert!(store.get_document(3).is_err());
    }
}
