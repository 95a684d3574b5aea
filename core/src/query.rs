use crate::error::{Error, Result};
use crate::tokenizer::TokenizerPolicy;

/// A run of folded terms that must occur at adjacent positions. A bare query
/// word is a one-term phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub terms: Vec<String>,
}

impl Phrase {
    /// Start positions where the phrase occurs, given each term's sorted
    /// positions within one document (same order as `terms`).
    pub fn starts(positions: &[&[u32]]) -> Vec<u32> {
        let Some((first, rest)) = positions.split_first() else { return Vec::new() };
        first
            .iter()
            .copied()
            .filter(|p| {
                rest.iter()
                    .enumerate()
                    .all(|(k, plist)| plist.binary_search(&(p + k as u32 + 1)).is_ok())
            })
            .collect()
    }
}

/// Parsed search request. Whitespace-separated words and double-quoted
/// phrases, all of which must match. An unterminated quote runs to the end.
#[derive(Debug, Clone)]
pub struct Query {
    phrases: Vec<Phrase>,
    policy: TokenizerPolicy,
}

impl Query {
    pub fn parse(raw: &str, policy: TokenizerPolicy) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidQuery);
        }
        let mut phrases = Vec::new();
        for (i, segment) in raw.split('"').enumerate() {
            let terms = policy.tokenize(segment).into_iter().map(|t| t.term);
            if i % 2 == 1 {
                let terms: Vec<String> = terms.collect();
                if !terms.is_empty() {
                    phrases.push(Phrase { terms });
                }
            } else {
                phrases.extend(terms.map(|t| Phrase { terms: vec![t] }));
            }
        }
        Ok(Self { phrases, policy })
    }

    pub fn phrases(&self) -> &[Phrase] { &self.phrases }

    pub fn policy(&self) -> TokenizerPolicy { self.policy }

    /// True when the text held no indexable tokens; such a query matches nothing.
    pub fn is_empty(&self) -> bool { self.phrases.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(q: &Query) -> Vec<Vec<&str>> {
        q.phrases().iter().map(|p| p.terms.iter().map(String::as_str).collect()).collect()
    }

    #[test]
    fn blank_queries_are_rejected() {
        assert!(matches!(Query::parse("", TokenizerPolicy::default()), Err(Error::InvalidQuery)));
        assert!(matches!(Query::parse("   \t", TokenizerPolicy::default()), Err(Error::InvalidQuery)));
    }

    #[test]
    fn words_and_phrases() {
        let q = Query::parse(r#"Light "the Word was" God"#, TokenizerPolicy::default()).unwrap();
        assert_eq!(terms(&q), vec![vec!["light"], vec!["the", "word", "was"], vec!["god"]]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let q = Query::parse(r#"love "one another"#, TokenizerPolicy::default()).unwrap();
        assert_eq!(terms(&q), vec![vec!["love"], vec!["one", "another"]]);
    }

    #[test]
    fn punctuation_only_query_is_empty_not_invalid() {
        let q = Query::parse("?!", TokenizerPolicy::default()).unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn phrase_starts_require_adjacency() {
        let first: &[u32] = &[1, 5, 9];
        let second: &[u32] = &[2, 7, 10];
        assert_eq!(Phrase::starts(&[first, second]), vec![1, 9]);
        assert_eq!(Phrase::starts(&[first]), vec![1, 5, 9]);
    }
}
