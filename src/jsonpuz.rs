//! Maps the crossword-app JSON puzzle format onto clue tables. These captures
//! are already structured, so there is no shape classification step; the only
//! work is field mapping and stripping the markup embedded in clue strings.

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use scraper::Html;
use serde::Deserialize;

use crate::record::{ClueRecord, ClueTable};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPuzzle {
    #[serde(default)]
    pub title: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub publish_time: Option<i64>,
    pub placed_words: Vec<PlacedWord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedWord {
    pub clue: JsonClue,
    /// Newer captures use `word`, older ones `originalTerm`.
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub original_term: Option<String>,
    pub clue_num: u32,
    pub across_not_down: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonClue {
    pub clue: String,
    #[serde(default)]
    pub ref_text: Option<String>,
}

/// Clue strings arrive with inline HTML ("<i>…</i>", entities); keep the text.
fn strip_markup(s: &str) -> String {
    let fragment = Html::parse_fragment(s);
    fragment.root_element().text().collect()
}

pub fn parse_json(raw: &str, source: &str, source_url: &str) -> Result<ClueTable> {
    let puzzle: JsonPuzzle = serde_json::from_str(raw).context("malformed puzzle json")?;

    let puzzle_date = puzzle
        .publish_time
        .and_then(|ms| DateTime::from_timestamp(ms / 1000, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string());

    let mut rows = Vec::with_capacity(puzzle.placed_words.len());
    for placed in &puzzle.placed_words {
        let answer = match placed.word.as_deref().or(placed.original_term.as_deref()) {
            Some(answer) => strip_markup(answer),
            None => bail!("placed word {} has neither word nor originalTerm", placed.clue_num),
        };
        let direction = if placed.across_not_down { "a" } else { "d" };

        rows.push(ClueRecord {
            clue_number: format!("{}{}", placed.clue_num, direction),
            clue: strip_markup(&placed.clue.clue),
            answer,
            definition: None,
            annotation: placed.clue.ref_text.clone(),
            puzzle_name: puzzle.title.clone(),
            puzzle_date: puzzle_date.clone(),
            puzzle_url: Some(source_url.to_string()),
            source_url: source_url.to_string(),
            source: source.to_string(),
        });
    }
    Ok(rows)
}
