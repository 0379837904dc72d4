//! Ordered-fallback extraction of a JSON document from a free-text reply.
//!
//! Upstream pipelines hand back model output that may be bare JSON, JSON in
//! a fenced block, or JSON embedded in prose. Each strategy returns an
//! optional record or sequence; the first success wins.

use crate::error::CoalesceError;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

pub type Strategy = fn(&str) -> Option<Value>;

/// Strategies in evaluation order.
pub const STRATEGIES: [(&str, Strategy); 4] = [
    ("direct", direct),
    ("fenced_json", fenced_json),
    ("fenced_any", fenced_any),
    ("balanced_span", balanced_span),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Name of the strategy that produced `value`.
    pub strategy: &'static str,
    pub value: Value,
}

pub fn extract_json(text: &str) -> Option<Extraction> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        strategy(text).map(|value| Extraction {
            strategy: *name,
            value,
        })
    })
}

pub fn extract_json_or_err(text: &str) -> Result<Extraction, CoalesceError> {
    extract_json(text).ok_or(CoalesceError::NoJsonFound {
        strategies: STRATEGIES.len(),
    })
}

fn parse_container(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate.trim())
        .ok()
        .filter(|value| value.is_object() || value.is_array())
}

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)```json[ \t]*\r?\n?(.*?)```").expect("fenced json regex must compile")
    })
}

fn fenced_any_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```")
            .expect("fenced block regex must compile")
    })
}

fn direct(text: &str) -> Option<Value> {
    parse_container(text)
}

fn fenced_json(text: &str) -> Option<Value> {
    fenced_json_re()
        .captures_iter(text)
        .find_map(|caps| parse_container(caps.get(1)?.as_str()))
}

fn fenced_any(text: &str) -> Option<Value> {
    fenced_any_re()
        .captures_iter(text)
        .find_map(|caps| parse_container(caps.get(1)?.as_str()))
}

/// First `{...}` or `[...]` span, by opening position, whose brackets
/// balance and which parses.
fn balanced_span(text: &str) -> Option<Value> {
    bracket_spans(text.as_bytes())
        .into_iter()
        .find_map(|(open, close)| parse_container(&text[open..=close]))
}

/// Balanced bracket spans in one pass, sorted by opening offset. Brackets
/// inside string literals are skipped; strings are only tracked while some
/// bracket is open. Unmatched openers yield no span.
fn bracket_spans(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut stack = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (index, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' if !stack.is_empty() => in_string = true,
            b'{' | b'[' => stack.push(index),
            b'}' | b']' => {
                if let Some(open) = stack.pop() {
                    spans.push((open, index));
                }
            }
            _ => {}
        }
    }
    spans.sort_unstable();
    spans
}
