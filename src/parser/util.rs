//! Regex-heavy string helpers shared across the shape extractors.

use std::sync::LazyLock;

use regex::Regex;

use super::tuning;

/// "(6)", "(4,3)", "(5-2)", "(2 3)", optionally with a trailing word like
/// "(6, two words)"; anchored at end of cell.
pub static ENUMERATION_AT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9,\- ]+(?:[\w.]+)?\)$").unwrap());

/// Same pattern, anywhere in the string.
pub static ENUMERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9,\- ]+(?:[\w.]+)?\)").unwrap());

/// Bare clue number, optionally already direction-suffixed: "12", "3a", "7d".
pub static CLUE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(a|d)?$").unwrap());

pub static CLUE_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[ad]?").unwrap());

/// Dash/colon variants used to split "ANSWER - annotation" lines, in fixed
/// preference order; first one found in the line wins.
pub const ANSWER_DIVIDERS: &[&str] = &[" - ", " — ", " – ", " : ", ": "];

pub const DASHES: &[char] = &['-', '—', '–'];

/// Python-style `str.isupper()`: at least one cased character, and every
/// cased character uppercase.
pub fn is_upperish(s: &str) -> bool {
    let mut seen_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            seen_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    seen_alpha
}

/// Common post-extraction validation: an answer span must be mostly uppercase
/// letters (a small deficit tolerates inline wordplay like "M(E)ETS") and not
/// longer than any plausible entry. Mis-segmented spans fail this and their
/// rows are dropped, not corrected.
pub fn is_plausible_answer(s: &str, max_len: usize) -> bool {
    let s = s.trim();
    if s.is_empty() || s.chars().count() > max_len {
        return false;
    }
    if !s.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    let deficit = s
        .chars()
        .filter(|c| !(c.is_uppercase() || c.is_whitespace() || *c == '-' || *c == '\''))
        .count();
    deficit <= tuning::ANSWER_LOWERCASE_DEFICIT
}

/// Split an "ANSWER - annotation" line on the first divider variant present.
/// The prefix must look like an answer (optionally brace-wrapped) for a
/// divider to count; a divider-free line that is entirely an answer yields an
/// empty annotation. Returns `None` when the line has no recognizable answer.
pub fn split_answer_annotation(line: &str, max_len: usize) -> Option<(String, String)> {
    let line = line.trim();
    for divider in ANSWER_DIVIDERS {
        if let Some(pos) = line.find(divider) {
            let answer = strip_answer_decoration(&line[..pos]);
            if is_plausible_answer(&answer, max_len) {
                let annotation = line[pos + divider.len()..].trim().to_string();
                return Some((answer, annotation));
            }
        }
    }
    let answer = strip_answer_decoration(line);
    if is_plausible_answer(&answer, max_len) {
        return Some((answer, String::new()));
    }
    None
}

fn strip_answer_decoration(s: &str) -> String {
    s.trim()
        .trim_matches(|c: char| c == '{' || c == '}' || DASHES.contains(&c) || c.is_whitespace())
        .to_string()
}

pub fn delete_chars(s: &str, chars: &[char]) -> String {
    s.chars().filter(|c| !chars.contains(c)).collect()
}

/// `"financial-times-16790-by-leonidas"` → `"Financial Times 16790 by Leonidas"`.
/// Title-cases each hyphen-separated word, then lowercases the connective
/// "By" the way the source slugs use it.
pub fn slug_to_title(slug: &str) -> String {
    let titled: Vec<String> = slug
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .map(|word| if word == "By" { "by".to_string() } else { word })
        .collect();
    titled.join(" ")
}

/// Validate a `/`-separated definition against its clue; anything that is not
/// a case-insensitive substring forfeits the whole definition.
pub fn definition_if_substring(definition: &str, clue: &str) -> Option<String> {
    let definition = definition.trim();
    if definition.is_empty() {
        return None;
    }
    let clue_lower = clue.to_lowercase();
    if definition
        .split('/')
        .all(|part| clue_lower.contains(&part.trim().to_lowercase()))
    {
        Some(definition.to_string())
    } else {
        None
    }
}
