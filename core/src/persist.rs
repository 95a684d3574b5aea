use crate::error::Result;
use crate::{DocId, DocMeta, IndexHeader, MetaFile, Posting, TermId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
    fn postings(&self, term_id: TermId) -> PathBuf {
        self.postings_dir().join(format!("{term_id:08}.postings.bin"))
    }
    pub fn texts_dir(&self) -> PathBuf { self.root.join("texts") }
    pub fn text_rel(doc_id: DocId) -> String { format!("texts/{doc_id}.txt") }
}

fn write_bin<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_dictionary(paths: &IndexPaths, dict: &(HashMap<String, TermId>, Vec<u32>)) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.dictionary(), dict)
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<(HashMap<String, TermId>, Vec<u32>)> {
    read_bin(&paths.dictionary())
}

pub fn save_docs(paths: &IndexPaths, docs: &BTreeMap<DocId, DocMeta>) -> Result<()> {
    write_bin(&paths.docs(), docs)
}

pub fn load_docs(paths: &IndexPaths) -> Result<BTreeMap<DocId, DocMeta>> {
    read_bin(&paths.docs())
}

pub fn save_postings_for_term(paths: &IndexPaths, term_id: TermId, postings: &[Posting]) -> Result<()> {
    create_dir_all(paths.postings_dir())?;
    write_bin(&paths.postings(term_id), postings)
}

/// The file is opened and closed within this call.
pub fn load_postings_for_term(paths: &IndexPaths, term_id: TermId) -> Result<Vec<Posting>> {
    read_bin(&paths.postings(term_id))
}

pub fn save_text(paths: &IndexPaths, rel: &str, content: &str) -> Result<()> {
    create_dir_all(paths.texts_dir())?;
    let mut f = File::create(paths.root.join(rel))?;
    f.write_all(content.as_bytes())?;
    Ok(())
}

pub fn load_text(paths: &IndexPaths, rel: &str) -> Result<String> {
    let mut f = File::open(paths.root.join(rel))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    Ok(buf)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load only the header structures required to search: dictionary, df, docs, meta.
pub fn load_index_header(paths: &IndexPaths) -> Result<IndexHeader> {
    let meta = load_meta(paths)?;
    let (dictionary, df) = load_dictionary(paths)?;
    let docs = load_docs(paths)?;
    Ok(IndexHeader { dictionary, df, docs, meta })
}
