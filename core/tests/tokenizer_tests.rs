use lexis_core::tokenizer::{tokenize, TokenizerPolicy};

#[test]
fn it_folds_case_and_diacritics() {
    let toks = tokenize("Café CAFÉ naïve Zażółć");
    let words: Vec<String> = toks.into_iter().map(|t| t.term).collect();
    assert_eq!(words, vec!["cafe", "cafe", "naive", "zazołc"]);
}

#[test]
fn it_keeps_stopwords_and_numbers() {
    let toks = tokenize("The 3 wise men and the star");
    let words: Vec<String> = toks.into_iter().map(|t| t.term).collect();
    assert!(words.contains(&"the".to_string()));
    assert!(words.contains(&"3".to_string()));
    assert_eq!(words.len(), 7);
}

#[test]
fn it_stems_when_asked() {
    let toks = TokenizerPolicy::stemmed().tokenize("Running Runners RUN!");
    let words: Vec<String> = toks.into_iter().map(|t| t.term).collect();
    assert!(words.iter().all(|w| w.starts_with("run")));
    assert_eq!(words[0], "run");
}

#[test]
fn spans_point_into_original_text() {
    let text = "Łaska — grace, χάρις.";
    for tok in tokenize(text) {
        let raw = &text[tok.start..tok.end];
        assert_eq!(TokenizerPolicy::default().fold(raw), tok.term);
    }
}
