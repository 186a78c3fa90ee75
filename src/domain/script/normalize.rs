use regex::Regex;
use std::sync::LazyLock;

static MARKDOWN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*+|_{2,}|~~|`+|#+\s+").expect("markdown pattern"));

static UNDERSCORE_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_([^_\s][^_]*?)_\b").expect("underscore emphasis pattern"));

static ROLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:host|expert|questioner|correspondent)\s*:\s*").expect("role prefix pattern")
});

static HONORIFIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:Dr|Prof|Mr|Mrs|Ms)\.\s*").expect("honorific pattern"));

static JSON_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[{}\[\]"“”\\]"#).expect("json punctuation pattern"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Drop emphasis and heading markers. Paired `_word_` emphasis is unwrapped
/// while snake_case identifiers keep their underscores.
pub fn strip_markdown(text: &str) -> String {
    let text = MARKDOWN.replace_all(text, "");
    UNDERSCORE_EMPHASIS.replace_all(&text, "$1").into_owned()
}

pub fn strip_role_prefixes(text: &str) -> String {
    ROLE_PREFIX.replace_all(text, "").into_owned()
}

pub fn strip_honorifics(text: &str) -> String {
    HONORIFIC.replace_all(text, "").into_owned()
}

pub fn strip_json_punctuation(text: &str) -> String {
    JSON_PUNCTUATION.replace_all(text, "").into_owned()
}

/// Collapse every whitespace run to one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Clean up a turn body produced by an upstream language model
pub fn normalize_turn_text(text: &str) -> String {
    let text = strip_markdown(text);
    let text = strip_role_prefixes(&text);
    let text = strip_honorifics(&text);
    let text = strip_json_punctuation(&text);
    collapse_whitespace(&text)
}
