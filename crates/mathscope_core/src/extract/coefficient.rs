//! Numeric defaults shared by every grammar.
//!
//! A grammar captures raw substrings; these helpers turn them into numbers.
//! Each returns `None` for a malformed or non-finite value so the calling
//! grammar fails as a whole instead of producing a partial record.

use regex::Captures;

/// Explicit literal. Empty text and bare signs are malformed.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == "+" || text == "-" {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Multiplicative coefficient: absent or `+` is 1, a lone `-` is -1.
pub fn parse_coefficient(text: Option<&str>) -> Option<f64> {
    match text.map(str::trim) {
        None | Some("") | Some("+") => Some(1.0),
        Some("-") => Some(-1.0),
        Some(literal) => parse_number(literal),
    }
}

/// Additive offset: absent is 0. A bare sign is malformed.
pub fn parse_offset(text: Option<&str>) -> Option<f64> {
    match text.map(str::trim) {
        None | Some("") => Some(0.0),
        Some(literal) => parse_number(literal),
    }
}

pub(crate) fn coefficient_at(caps: &Captures, index: usize) -> Option<f64> {
    parse_coefficient(caps.get(index).map(|m| m.as_str()))
}

pub(crate) fn offset_at(caps: &Captures, index: usize) -> Option<f64> {
    parse_offset(caps.get(index).map(|m| m.as_str()))
}

/// Optional polynomial term: absent is 0, present follows coefficient rules.
pub(crate) fn term_at(caps: &Captures, index: usize) -> Option<f64> {
    match caps.get(index) {
        Some(m) => parse_coefficient(Some(m.as_str())),
        None => Some(0.0),
    }
}

pub(crate) fn number_at(caps: &Captures, index: usize) -> Option<f64> {
    caps.get(index).and_then(|m| parse_number(m.as_str()))
}

/// Comma-separated literals; any malformed entry fails the whole list.
pub(crate) fn number_list(text: &str) -> Option<Vec<f64>> {
    text.split(',').map(parse_number).collect()
}
