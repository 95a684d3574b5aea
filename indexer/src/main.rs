use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lexis_core::build::IndexBuilder;
use lexis_core::catalog::Catalog;
use lexis_core::tokenizer::TokenizerPolicy;
use lexis_core::DocumentStore;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One record of a `.jsonl` corpus file.
#[derive(Debug, Deserialize)]
struct InputDoc {
    filename: String,
    content: String,
}

#[derive(Parser)]
#[command(name = "lexis-indexer")]
#[command(about = "Build and inspect the corpus search index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of text files (or a single file)
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Apply English stemming to indexed and queried terms
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// File extensions treated as plain-text documents; .jsonl files are always read as records
        #[arg(long, value_delimiter = ',', default_value = "txt")]
        ext: Vec<String>,
    },
    /// Print corpus statistics of an existing index
    Stats {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stem, ext } => {
            let policy = TokenizerPolicy { stem };
            build_index(Path::new(&input), Path::new(&output), policy, &ext)
        }
        Commands::Stats { index } => print_stats(&index),
    }
}

fn build_index(input: &Path, output: &Path, policy: TokenizerPolicy, exts: &[String]) -> Result<()> {
    let files = collect_files(input, exts)?;
    let mut builder = IndexBuilder::new(policy);

    for file in &files {
        if has_extension(file, "jsonl") {
            ingest_jsonl(file, &mut builder)?;
        } else {
            ingest_text(file, input, &mut builder)?;
        }
    }
    tracing::info!(num_docs = builder.num_docs(), files = files.len(), "ingested documents");

    builder.write(output).with_context(|| format!("writing index to {}", output.display()))?;
    tracing::info!(output = %output.display(), "index build complete");
    Ok(())
}

/// Corpus files in a stable order, so ids are reproducible across builds.
fn collect_files(input: &Path, exts: &[String]) -> Result<Vec<PathBuf>> {
    let wanted = |p: &Path| has_extension(p, "jsonl") || exts.iter().any(|e| has_extension(p, e.trim_start_matches('.')));
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && wanted(p) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input path {} does not exist", input.display());
    }
    Ok(files)
}

fn has_extension(p: &Path, ext: &str) -> bool {
    p.extension().and_then(|s| s.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn ingest_text(file: &Path, root: &Path, builder: &mut IndexBuilder) -> Result<()> {
    let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let filename = match file.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().replace('\\', "/"),
        _ => file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
    };
    let id = builder.add_document(filename, content);
    tracing::debug!(id, file = %file.display(), "document added");
    Ok(())
}

fn ingest_jsonl(file: &Path, builder: &mut IndexBuilder) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid record", file.display(), lineno + 1))?;
        builder.add_document(doc.filename, doc.content);
    }
    Ok(())
}

fn print_stats(index: &str) -> Result<()> {
    let store = DocumentStore::open(index)?;
    let stats = Catalog::new(&store).stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
