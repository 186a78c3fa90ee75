use super::model::ScriptTurn;
use super::normalize::normalize_turn_text;
use crate::domain::voice::{role_for_name, Role};
use regex::Regex;
use std::sync::LazyLock;

/// Minimum normalized length of a paragraph kept by the paragraph fallback
pub const DEFAULT_FALLBACK_MIN_CHARS: usize = 20;

/// Role assignment order used when the transcript carries no speaker labels
const FALLBACK_ROTATION: [Role; 3] = [Role::Host, Role::Expert, Role::Questioner];

static ROLE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\*{1,3}|_{1,3})?\s*\[?(host|expert|questioner|correspondent)\]?\s*(?:\*{1,3}|_{1,3})?\s*(?::|[-–—](?:\s|$))\s*(.*)$",
    )
    .expect("role label pattern")
});

static NAMED_SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:\*{1,3}|_{1,3})?\s*(?:(?:Dr|Prof|Mr|Mrs|Ms)\.?\s+)?([A-Z][a-z]+)\s*(?:\*{1,3}|_{1,3})?\s*:\s*(.*)$",
    )
    .expect("named speaker pattern")
});

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\r?\n)+").expect("paragraph pattern"));

/// Splits an unstructured dialogue transcript into ordered speaker turns
#[derive(Debug, Clone)]
pub struct SegmentParser {
    fallback_min_chars: usize,
}

impl Default for SegmentParser {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_MIN_CHARS)
    }
}

impl SegmentParser {
    pub fn new(fallback_min_chars: usize) -> Self {
        Self { fallback_min_chars }
    }

    /// Parse a transcript. Never fails: without any recognisable speaker label the
    /// transcript is split into paragraphs assigned round-robin across roles.
    pub fn parse(&self, transcript: &str) -> Vec<ScriptTurn> {
        let mut turns = Vec::new();
        let mut current_role = Role::Host;
        let mut buffer: Vec<&str> = Vec::new();
        let mut labels_seen = 0usize;

        for line in transcript.lines() {
            if let Some((role, rest)) = Self::match_label(line) {
                labels_seen += 1;
                Self::flush(&mut turns, current_role, &mut buffer);
                current_role = role;
                let rest = rest.trim();
                if !rest.is_empty() {
                    buffer.push(rest);
                }
            } else {
                let line = line.trim();
                if !line.is_empty() {
                    buffer.push(line);
                }
            }
        }
        Self::flush(&mut turns, current_role, &mut buffer);

        if labels_seen == 0 {
            tracing::warn!(
                transcript_length = transcript.len(),
                "No speaker labels recognised, falling back to paragraph rotation"
            );
            return self.paragraph_fallback(transcript);
        }

        tracing::debug!(
            labels_seen = labels_seen,
            turn_count = turns.len(),
            "Transcript parsed into turns"
        );

        turns
    }

    /// Recognise a role label line or a known named-speaker line
    fn match_label(line: &str) -> Option<(Role, &str)> {
        if let Some(caps) = ROLE_LABEL.captures(line) {
            let role = caps.get(1).and_then(|m| Role::from_keyword(m.as_str()))?;
            let rest = caps.get(2).map_or("", |m| m.as_str());
            return Some((role, rest));
        }

        let caps = NAMED_SPEAKER.captures(line)?;
        let role = caps.get(1).and_then(|m| role_for_name(m.as_str()))?;
        let rest = caps.get(2).map_or("", |m| m.as_str());
        Some((role, rest))
    }

    fn flush(turns: &mut Vec<ScriptTurn>, role: Role, buffer: &mut Vec<&str>) {
        if buffer.is_empty() {
            return;
        }
        let text = normalize_turn_text(&buffer.join(" "));
        buffer.clear();
        if text.is_empty() {
            return;
        }
        turns.push(ScriptTurn {
            role,
            text,
            ordinal: turns.len(),
        });
    }

    fn paragraph_fallback(&self, transcript: &str) -> Vec<ScriptTurn> {
        let mut turns: Vec<ScriptTurn> = Vec::new();
        for paragraph in PARAGRAPH_BREAK.split(transcript) {
            let text = normalize_turn_text(paragraph);
            if text.chars().count() < self.fallback_min_chars {
                continue;
            }
            let role = FALLBACK_ROTATION[turns.len() % FALLBACK_ROTATION.len()];
            turns.push(ScriptTurn {
                role,
                text,
                ordinal: turns.len(),
            });
        }

        if turns.is_empty() {
            let text = normalize_turn_text(transcript);
            if !text.is_empty() {
                turns.push(ScriptTurn {
                    role: FALLBACK_ROTATION[0],
                    text,
                    ordinal: 0,
                });
            }
        }

        turns
    }
}
