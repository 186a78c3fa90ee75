use crate::domain::script::normalize::{
    collapse_whitespace, strip_honorifics, strip_markdown, strip_role_prefixes,
};
use crate::domain::voice::role_for_name;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern"));

static NAMED_SPEAKER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+):\s").expect("speaker token pattern"));

static BRACKETED_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\s*(?:host|expert|questioner|correspondent)\s*\]").expect("bracketed role pattern")
});

fn decode_entity(caps: &Captures) -> String {
    let body = &caps[1];
    let decoded = match body {
        "amp" => Some('&'),
        "nbsp" | "ensp" | "emsp" | "thinsp" => Some(' '),
        "mdash" | "ndash" => Some(','),
        "hellip" => Some('.'),
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32).filter(|c| !c.is_control())
        }
    };

    match decoded {
        Some('&') => " and ".to_string(),
        Some(c) => c.to_string(),
        None => " ".to_string(),
    }
}

/// Prepare a turn's text for a speech provider: drop leftover speaker labels,
/// markdown, honorifics and HTML entity artifacts, then normalise whitespace.
pub fn prepare_text(text: &str) -> String {
    let text = BRACKETED_ROLE.replace_all(text, " ");
    let text = strip_markdown(&text);
    let text = strip_role_prefixes(&text);
    let text = NAMED_SPEAKER_TOKEN.replace_all(&text, |caps: &Captures| {
        if role_for_name(&caps[1]).is_some() {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let text = strip_honorifics(&text);
    let text = ENTITY.replace_all(&text, decode_entity);
    collapse_whitespace(&text)
}
