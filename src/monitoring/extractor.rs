//! Numeric extraction from free-form log lines
//!
//! Log lines look like `08-09-25, 00:00:02, 1.1613e-02`; the reading is the
//! rightmost number on the line.

use regex::Regex;
use std::sync::LazyLock;

/// Float literal: `1`, `1.`, `.5`, `1.23e-04`, optionally signed
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:\d*\.?\d+|\d+\.)(?:[eE][-+]?\d+)?").expect("valid float regex")
});

/// Whole-token float literal, used to reject `inf`/`nan` that `f64::from_str` accepts
static STRICT_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").expect("valid strict float regex")
});

/// Extract the rightmost numeric value from a comma-separated line.
///
/// Tokens are scanned right to left as plain numbers first. Only when no
/// token is a plain number are they scanned again for an embedded number.
/// If that also fails, the last number anywhere in the line wins.
/// Never fails: `None` means "no number".
pub fn extract_rightmost_float(line: &str) -> Option<f64> {
    if line.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = line.trim().split(',').map(str::trim).collect();

    if let Some(value) = tokens.iter().rev().find_map(|token| parse_strict(token)) {
        return Some(value);
    }

    let embedded = tokens
        .iter()
        .rev()
        .find_map(|token| FLOAT_RE.find(token).and_then(|m| m.as_str().parse().ok()));
    if embedded.is_some() {
        return embedded;
    }

    FLOAT_RE
        .find_iter(line)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_strict(token: &str) -> Option<f64> {
    if !STRICT_FLOAT_RE.is_match(token) {
        return None;
    }
    token.parse().ok()
}
