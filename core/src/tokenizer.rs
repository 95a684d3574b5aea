use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}\p{M}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Term-matching rules shared by index build and query time.
///
/// Tokens are maximal runs of letters, numbers and combining marks. Each token
/// is folded with NFKD, stripped of combining marks and lowercased, so `Café`
/// and `cafe` are the same term. English stemming is optional and fixed when
/// the index is built; the policy is stored in the index meta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerPolicy {
    #[serde(default)]
    pub stem: bool,
}

/// One token of a text: folded term, ordinal position and byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub position: u32,
    pub start: usize,
    pub end: usize,
}

impl TokenizerPolicy {
    pub fn stemmed() -> Self { Self { stem: true } }

    /// Fold a single raw word into its index term. Returns an empty string for
    /// words made only of marks.
    pub fn fold(&self, raw: &str) -> String {
        let folded = raw
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase();
        if self.stem && !folded.is_empty() {
            STEMMER.stem(&folded).into_owned()
        } else {
            folded
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;
        for mat in RE.find_iter(text) {
            let term = self.fold(mat.as_str());
            if term.is_empty() { continue; }
            tokens.push(Token { term, position, start: mat.start(), end: mat.end() });
            position += 1;
        }
        tokens
    }
}

/// Tokenize with the default policy (no stemming).
pub fn tokenize(text: &str) -> Vec<Token> {
    TokenizerPolicy::default().tokenize(text)
}
