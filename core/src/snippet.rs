use crate::query::Query;
use crate::tokenizer::Token;
use crate::Document;

pub const DEFAULT_WINDOW: usize = 50;

/// Builds a bounded, highlighted excerpt around the densest run of matches.
#[derive(Debug, Clone)]
pub struct SnippetExtractor {
    /// Excerpt length in tokens, never zero.
    window: usize,
    pub open: String,
    pub close: String,
    pub ellipsis: String,
}

impl Default for SnippetExtractor {
    fn default() -> Self {
        Self { window: DEFAULT_WINDOW, open: "<mark>".into(), close: "</mark>".into(), ellipsis: "...".into() }
    }
}

impl SnippetExtractor {
    pub fn with_window(window: usize) -> Self {
        Self { window: window.max(1), ..Self::default() }
    }

    pub fn window(&self) -> usize { self.window }

    pub fn extract_document(&self, document: &Document, query: &Query) -> String {
        self.extract(&document.content, query)
    }

    /// Excerpt of `content` with every match span inside it wrapped in markers.
    /// Text outside markers is HTML-escaped, so markers are unambiguous.
    pub fn extract(&self, content: &str, query: &Query) -> String {
        let tokens = query.policy().tokenize(content);
        let spans = match_spans(&tokens, query);
        let n = tokens.len();
        let (first, last) = if n <= self.window { (0, n) } else { self.best_window(&spans, n) };

        let start_byte = if first == 0 { 0 } else { tokens[first].start };
        let end_byte = if last == n { content.len() } else { tokens[last - 1].end };

        let mut out = String::with_capacity(end_byte - start_byte + 32);
        if first > 0 {
            out.push_str(&self.ellipsis);
        }
        let mut cursor = start_byte;
        for &(s, e) in spans.iter().filter(|(s, e)| *s >= first && *e <= last) {
            let (from, to) = (tokens[s].start, tokens[e - 1].end);
            push_escaped(&mut out, &content[cursor..from]);
            out.push_str(&self.open);
            push_escaped(&mut out, &content[from..to]);
            out.push_str(&self.close);
            cursor = to;
        }
        push_escaped(&mut out, &content[cursor..end_byte]);
        if last < n {
            out.push_str(&self.ellipsis);
        }
        out
    }

    /// Token range `[start, start + window)` holding the most spans. Each
    /// candidate leads its anchoring span by a quarter window; earliest wins ties.
    fn best_window(&self, spans: &[(usize, usize)], n: usize) -> (usize, usize) {
        let w = self.window;
        let lead = w / 4;
        let mut best_start = 0;
        let mut best_count = 0;
        for span in spans {
            let start = span.0.saturating_sub(lead).min(n - w);
            let count = spans.iter().filter(|(s, e)| *s >= start && *e <= start + w).count();
            if count > best_count {
                best_count = count;
                best_start = start;
            }
        }
        (best_start, best_start + w)
    }
}

/// Non-overlapping token spans `[start, end)` where a query phrase occurs,
/// ordered by position. Longer spans win when two start together.
fn match_spans(tokens: &[Token], query: &Query) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for phrase in query.phrases() {
        let len = phrase.terms.len();
        if len == 0 || len > tokens.len() { continue; }
        for i in 0..=tokens.len() - len {
            if phrase.terms.iter().enumerate().all(|(k, t)| tokens[i + k].term == *t) {
                spans.push((i, i + len));
            }
        }
    }
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for span in spans {
        if merged.last().map_or(true, |prev| span.0 >= prev.1) {
            merged.push(span);
        }
    }
    merged
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
}
