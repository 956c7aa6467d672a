//! The National Post blog's house style: one tiny table per clue, with the
//! answers and annotations as loose dash-separated lines between the tables.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::align::align_suspected_definitions;
use super::dom;
use super::util::{delete_chars, CLUE_NUMBER_PREFIX};
use super::{tuning, Document};
use crate::error::{ExtractError, ShapeError};
use crate::record::{ClueRecord, ClueTable};

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static U_IN_TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table u").unwrap());

static ANSWER_DIVIDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[-—–]\s+").unwrap());

/// Markup noise the blog scatters through annotations and answers.
const PUNCTUATION_IN_ANNOTATION: &[char] = &['-', '—', '–', '{', '}', '~', '*', '/', '\\'];
const PUNCTUATION_IN_ANSWERS: &[char] =
    &['-', '—', '–', '(', ')', '{', '}', '|', '~', '*', '/', '\\', '_'];

const SIGNATURE_PHRASES: &[&str] = &[
    "cox",
    "rathvon",
    "signing off for today",
    "falcon",
    "key to reference sources",
];
const STOP_PHRASES: &[&str] = &["introduction", "epilogue", "signing off for today"];

pub fn is_special_type_1(doc: &Document) -> bool {
    let Some(body) = dom::entry_content(&doc.html) else { return false };
    if body.select(&TABLE).count() < tuning::SPECIAL_1_MIN_TABLES {
        return false;
    }
    let text = dom::text_with_breaks(body);
    let lines = text.lines().filter(|line| !line.trim().is_empty()).count();
    if lines < tuning::SPECIAL_1_MIN_LINES {
        return false;
    }
    let lower = text.to_lowercase();
    let phrases = SIGNATURE_PHRASES
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .count();
    phrases >= tuning::SPECIAL_1_MIN_PHRASES
}

pub fn parse_special_type_1(doc: &Document) -> Result<ClueTable, ShapeError> {
    let body = body(doc)?;

    // Clue numbers and clue texts come from the per-clue tables.
    let mut clue_numbers = Vec::new();
    let mut clues = Vec::new();
    for table in body.select(&TABLE) {
        let text = dom::element_text(table);
        let text = text.trim();
        let Some(number) = CLUE_NUMBER_PREFIX.find(text) else { continue };
        let clue = text[number.end()..].replace('\n', " ").trim().to_string();
        clue_numbers.push(number.as_str().to_string());
        clues.push(delete_chars(&clue, PUNCTUATION_IN_ANNOTATION));
    }

    // Answers and annotations are the dash-separated lines outside them.
    let mut answers = Vec::new();
    let mut annotations = Vec::new();
    for line in dom::text_with_breaks_excluding(body, &["table"]).lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        if STOP_PHRASES.iter().any(|p| lower.starts_with(p)) {
            continue;
        }
        let Some(divider) = ANSWER_DIVIDER.find(line) else { continue };
        let answer = &line[..divider.start()];
        let annotation = &line[divider.end()..];
        if !answer.chars().any(|c| c.is_alphabetic()) {
            continue;
        }
        answers.push(delete_chars(answer, PUNCTUATION_IN_ANSWERS));
        annotations.push(
            annotation
                .trim_matches(|c: char| PUNCTUATION_IN_ANNOTATION.contains(&c) || c == ' ')
                .to_string(),
        );
    }

    if answers.len() != clues.len() {
        return Err(ExtractError::new(format!(
            "{} clue tables but {} answer lines",
            clues.len(),
            answers.len()
        ))
        .into());
    }

    let fragments = dom::select_texts(body, &U_IN_TABLE);
    let definitions = align_suspected_definitions(&clues, &fragments)?;

    Ok(clue_numbers
        .into_iter()
        .zip(clues)
        .zip(answers.into_iter().zip(annotations))
        .zip(definitions)
        .map(|(((number, clue), (answer, annotation)), definition)| {
            ClueRecord::bare(number, clue, answer, definition, Some(annotation))
        })
        .collect())
}

fn body(doc: &Document) -> Result<ElementRef<'_>, ExtractError> {
    dom::entry_content(&doc.html).ok_or_else(|| ExtractError::new("no post body"))
}
