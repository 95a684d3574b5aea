use criterion::{criterion_group, criterion_main, Criterion};
use lexis_core::query::Query;
use lexis_core::snippet::SnippetExtractor;
use lexis_core::tokenizer::{tokenize, TokenizerPolicy};

const TEXT: &str = "And the earth was without form, and void; and darkness was upon the face of the deep. \
And the Spirit of God moved upon the face of the waters. And God said, Let there be light: and there was light. \
And God saw the light, that it was good: and God divided the light from the darkness.";

fn bench_tokenize(c: &mut Criterion) {
    let text = TEXT.repeat(50);
    c.bench_function("tokenize_passage", |b| b.iter(|| tokenize(&text)));
}

fn bench_snippet(c: &mut Criterion) {
    let text = TEXT.repeat(50);
    let query = Query::parse("light \"face of the deep\"", TokenizerPolicy::default()).expect("valid query");
    let extractor = SnippetExtractor::default();
    c.bench_function("snippet_passage", |b| b.iter(|| extractor.extract(&text, &query)));
}

criterion_group!(benches, bench_tokenize, bench_snippet);
criterion_main!(benches);
