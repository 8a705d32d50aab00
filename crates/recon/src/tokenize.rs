//! Free-text property parsing: well name, well numbers, registry numbers and
//! the normalized forms used for matching.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Replacement;
use crate::model::{PropertyTokens, WellNumbers};

/// Delimiters between several well numbers, tried in this order per level.
pub const WELL_NUMBER_DELIMITERS: [char; 4] = [',', '-', '&', '/'];

/// Trailing multi-number run such as `1/3/4/5`.
static MULTI_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:/\d+)+\b").expect("multi-number pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellNumberMode {
    /// Everything after the last `#` is the number.
    Anchored,
    /// The text after the last `#` is parsed again.
    Recursive,
}

/// Tokenize a property description. Missing text yields no name and no numbers.
pub fn tokenize_property(text: Option<&str>) -> PropertyTokens {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return PropertyTokens::default();
    };

    let numbers = |mode| {
        extract_well_number(text, mode)
            .map(|raw| split_well_numbers(&raw))
            .unwrap_or_default()
    };

    PropertyTokens {
        well_name: extract_well_name(text),
        well_numbers: numbers(WellNumberMode::Anchored),
        recursive_well_numbers: numbers(WellNumberMode::Recursive),
    }
}

// ---------------------------------------------------------------------------
// Well name
// ---------------------------------------------------------------------------

/// Extract the well name portion of a property description.
pub fn extract_well_name(text: &str) -> Option<String> {
    let name = cut_well_name(text);
    let name = MULTI_NUMBER.replace_all(&name, "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn cut_well_name(text: &str) -> Cow<'_, str> {
    match (text.find('#'), text.find('(')) {
        (Some(hash), Some(paren)) => {
            let close = text[paren..].find(')').map(|i| paren + i);
            let inner = match close {
                Some(close) => &text[paren + 1..close],
                None => &text[paren + 1..],
            };
            if inner.contains('#') {
                let rest = close.map(|c| &text[c + 1..]).unwrap_or("");
                return Cow::Owned(format!("{}{}", &text[..paren], rest).trim().to_string());
            }
            let cut = if hash.abs_diff(paren) == 1 {
                hash.min(paren)
            } else {
                hash.max(paren)
            };
            Cow::Borrowed(text[..cut].trim())
        }
        (Some(hash), None) => Cow::Borrowed(text[..hash].trim()),
        (None, Some(_)) => match text.rsplit_once('(') {
            Some((head, tail)) if has_digit(tail) => Cow::Borrowed(head.trim()),
            _ => Cow::Borrowed(text.trim()),
        },
        (None, None) => match text.split_once('-') {
            Some((head, _)) => Cow::Borrowed(head.trim()),
            None => Cow::Borrowed(text),
        },
    }
}

// ---------------------------------------------------------------------------
// Well numbers
// ---------------------------------------------------------------------------

/// Extract the raw (possibly multi-valued) well number from a property description.
pub fn extract_well_number(text: &str, mode: WellNumberMode) -> Option<String> {
    let text = text.trim();

    if let Some(open) = text.rfind('(') {
        let tail = &text[open + 1..];
        let inner = tail.find(')').map_or(tail, |close| &tail[..close]);
        return extract_well_number(inner, mode);
    }

    if let Some(hash) = text.rfind('#') {
        let tail = text[hash + 1..].trim();
        return match mode {
            WellNumberMode::Anchored => (!tail.is_empty()).then(|| tail.to_string()),
            WellNumberMode::Recursive => extract_well_number(tail, mode),
        };
    }

    if let Some(dash) = text.rfind('-') {
        return extract_well_number(&text[dash + 1..], mode);
    }

    if text.contains(' ') {
        let first = text.split(' ').next().unwrap_or_default();
        let last = text.rsplit(' ').next().unwrap_or_default();
        let next = if has_digit(first) { first } else { last };
        return extract_well_number(next, mode);
    }

    has_digit(text).then(|| text.to_string())
}

/// Split a raw well-number token into individual numbers.
pub fn split_well_numbers(raw: &str) -> WellNumbers {
    let mut numbers = WellNumbers::default();
    collect_numbers(raw.trim(), &mut numbers);
    numbers
}

fn collect_numbers(raw: &str, out: &mut WellNumbers) {
    match WELL_NUMBER_DELIMITERS.iter().find(|d| raw.contains(**d)) {
        Some(&delimiter) => {
            for part in raw.split(delimiter) {
                collect_numbers(part.trim(), out);
            }
        }
        None if !raw.is_empty() => out.insert(raw),
        None => {}
    }
}

fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Strip characters, collapse whitespace, apply replacements. Case is preserved.
pub fn clean_text(text: &str, strip_chars: &str, replacements: &[Replacement]) -> String {
    let stripped: String = text.chars().filter(|c| !strip_chars.contains(*c)).collect();
    let mut cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    for r in replacements {
        cleaned = cleaned.replace(&r.from, &r.to);
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized well name used in composite keys.
pub fn normalize_well_name(name: &str, strip_chars: &str, replacements: &[Replacement]) -> String {
    clean_text(&name.to_uppercase(), strip_chars, replacements)
}

/// `"<name> <number>"`, or the name alone when there is no number.
pub fn composite_key(normalized_name: &str, well_number: Option<&str>) -> String {
    match well_number.map(str::trim).filter(|n| !n.is_empty()) {
        Some(number) => format!("{normalized_name} {}", number.to_uppercase()),
        None => normalized_name.to_string(),
    }
}

/// Normalize a registry number: keep the part after the last `#`, render
/// integral numbers without a fractional part. Blank values are absent.
pub fn normalize_registry_number(raw: &str) -> Option<String> {
    let value = match raw.rsplit_once('#') {
        Some((_, tail)) => tail.trim(),
        None => raw.trim(),
    };
    if value.is_empty() {
        return None;
    }
    if let Some(int) = value.strip_suffix(".0").filter(|v| is_integer(v)) {
        return Some(strip_leading_zeros(int));
    }
    if is_integer(value) {
        return Some(strip_leading_zeros(value));
    }
    Some(value.to_string())
}

fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn strip_leading_zeros(s: &str) -> String {
    let trimmed = s.trim_start_matches('0');
    if trimmed.is_empty() { "0".into() } else { trimmed.into() }
}

/// County token compared against the registry: first word, uppercased.
pub fn county_token(county: Option<&str>) -> Option<String> {
    county
        .and_then(|c| c.split_whitespace().next())
        .map(str::to_uppercase)
}

/// State token compared against the registry: uppercased and trimmed.
pub fn state_token(state: Option<&str>) -> Option<String> {
    state
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(text: &str) -> Vec<String> {
        tokenize_property(Some(text))
            .well_numbers
            .iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn hash_separated_property() {
        let tokens = tokenize_property(Some("SMITH UNIT #3"));
        assert_eq!(tokens.well_name.as_deref(), Some("SMITH UNIT"));
        assert_eq!(numbers("SMITH UNIT #3"), vec!["3"]);
    }

    #[test]
    fn parenthesized_number() {
        let tokens = tokenize_property(Some("JONES LEASE (2)"));
        assert_eq!(tokens.well_name.as_deref(), Some("JONES LEASE"));
        assert_eq!(numbers("JONES LEASE (2)"), vec!["2"]);
    }

    #[test]
    fn slash_separated_numbers() {
        let tokens = tokenize_property(Some("ROGERS BILLIE NEAL GU 1/3/4/5"));
        assert_eq!(tokens.well_name.as_deref(), Some("ROGERS BILLIE NEAL GU"));
        assert_eq!(numbers("ROGERS BILLIE NEAL GU 1/3/4/5"), vec!["1", "3", "4", "5"]);
    }

    #[test]
    fn dash_separated_number() {
        let tokens = tokenize_property(Some("BAKER-7"));
        assert_eq!(tokens.well_name.as_deref(), Some("BAKER"));
        assert_eq!(numbers("BAKER-7"), vec!["7"]);
    }

    #[test]
    fn missing_property() {
        assert_eq!(tokenize_property(None), PropertyTokens::default());
        assert_eq!(tokenize_property(Some("   ")), PropertyTokens::default());
    }

    #[test]
    fn name_with_non_numeric_parenthetical_is_kept() {
        assert_eq!(
            extract_well_name("STATE LEASE (DEEP)").as_deref(),
            Some("STATE LEASE (DEEP)")
        );
        assert_eq!(extract_well_number("STATE LEASE (DEEP)", WellNumberMode::Anchored), None);
    }

    #[test]
    fn name_hash_and_paren() {
        // `#` inside the parenthetical: drop the whole segment
        assert_eq!(extract_well_name("MOORE (#2, #3) UNIT").as_deref(), Some("MOORE  UNIT"));
        // adjacent: cut at the earlier one
        assert_eq!(extract_well_name("MOORE #(2)").as_deref(), Some("MOORE"));
        // apart: cut at the later one
        assert_eq!(extract_well_name("MOORE (A) #2").as_deref(), Some("MOORE (A)"));
    }

    #[test]
    fn number_anchored_vs_recursive() {
        let text = "MOORE #A-4";
        assert_eq!(
            extract_well_number(text, WellNumberMode::Anchored).as_deref(),
            Some("A-4")
        );
        assert_eq!(
            extract_well_number(text, WellNumberMode::Recursive).as_deref(),
            Some("4")
        );
    }

    #[test]
    fn number_space_rule_prefers_leading_digits() {
        assert_eq!(
            extract_well_number("2H HARRIS RANCH", WellNumberMode::Anchored).as_deref(),
            Some("2H")
        );
        assert_eq!(extract_well_number("HARRIS RANCH", WellNumberMode::Anchored), None);
    }

    #[test]
    fn paren_without_close() {
        assert_eq!(
            extract_well_number("WEST TEXAS (12", WellNumberMode::Anchored).as_deref(),
            Some("12")
        );
    }

    #[test]
    fn split_nested_delimiters() {
        let set = split_well_numbers("1, 2&3 / 4-2");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["1", "2", "3", "4"]);
        assert_eq!(split_well_numbers("7").iter().collect::<Vec<_>>(), vec!["7"]);
        assert!(split_well_numbers("").is_empty());
        assert_eq!(split_well_numbers("1,").iter().collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn tokenize_is_deterministic() {
        let a = tokenize_property(Some("ROGERS BILLIE NEAL GU 1/3/4/5"));
        let b = tokenize_property(Some("ROGERS BILLIE NEAL GU 1/3/4/5"));
        assert_eq!(a, b);
    }

    #[test]
    fn well_name_normalization() {
        let replacements = [Replacement::new("GAS UNIT", "GU")];
        assert_eq!(
            normalize_well_name(" Smith  Gas Unit, No. \"A\" ", ".,\"", &replacements),
            "SMITH GU NO A"
        );
        assert_eq!(composite_key("SMITH GU", Some(" 2h ")), "SMITH GU 2H");
        assert_eq!(composite_key("SMITH GU", None), "SMITH GU");
        assert_eq!(composite_key("SMITH GU", Some("")), "SMITH GU");
    }

    #[test]
    fn operator_cleaning() {
        let replacements = [Replacement::new("PRODUCTION", "PROD")];
        assert_eq!(
            clean_text("  Acme PRODUCTION  Co., Inc. ", ".,", &replacements),
            "Acme PROD Co Inc"
        );
    }

    #[test]
    fn registry_number_formatting() {
        assert_eq!(normalize_registry_number("Permit #12345").as_deref(), Some("12345"));
        assert_eq!(normalize_registry_number("#12345").as_deref(), Some("12345"));
        assert_eq!(normalize_registry_number("12345.0").as_deref(), Some("12345"));
        assert_eq!(normalize_registry_number("012345").as_deref(), Some("12345"));
        assert_eq!(normalize_registry_number("  ").as_deref(), None);
        assert_eq!(normalize_registry_number("#").as_deref(), None);
        assert_eq!(normalize_registry_number("ABC-1").as_deref(), Some("ABC-1"));
    }

    #[test]
    fn location_tokens() {
        assert_eq!(county_token(Some(" Reeves County ")).as_deref(), Some("REEVES"));
        assert_eq!(county_token(Some("  ")), None);
        assert_eq!(state_token(Some(" tx ")).as_deref(), Some("TX"));
        assert_eq!(state_token(None), None);
    }
}
