//! Text-shape classifiers and extractors: pages that are effectively plain
//! text once `<br>` tags are rendered as newlines, parsed line by line.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::align::align_suspected_definitions;
use super::dom;
use super::{tuning, Document};
use crate::error::{ExtractError, ShapeError};
use crate::record::{ClueRecord, ClueTable};

static U_OR_MARKED_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"u, span[style*="underline"], span[style*="color"]"#).unwrap());
static UNDERLINE_MARKUP: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"u, span[style*="underline"]"#).unwrap());
static B_TAG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b").unwrap());

/// "ANSWER - annotation" line, answer possibly brace-wrapped.
static ANSWER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[A-Z ]+\s*[-—–:]\s+").unwrap());
static BRACED_ANSWER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\{[A-Z ]+\}\s*").unwrap());
/// "12a clue goes here (6,3)" line.
static CLUE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[0-9]+[ad]?\.?\s+.*\([0-9, ]+\)").unwrap());

/// Leading answer of an answer line, with its optional divider.
static ANSWER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{?\s?[A-Z ]+\s?\}?(?:\s[-—–:|]\s)?").unwrap());

fn body(doc: &Document) -> Result<ElementRef<'_>, ExtractError> {
    dom::entry_content(&doc.html).ok_or_else(|| ExtractError::new("no post body"))
}

// ── text-type-1 ─────────────────────────────────────────────────────────────
//
// ACROSS
// 1  Dad, to irritate, gets into row about mending equipment (6,3)
// REPAIR KIT - PA IRK in TIER reversed
// ...

pub fn is_text_type_1(doc: &Document) -> bool {
    let Some(body) = dom::entry_content(&doc.html) else { return false };
    let marked = body.select(&U_OR_MARKED_SPAN).count();
    if marked < tuning::TEXT_1_MIN_UNDERLINES {
        return false;
    }

    let text = dom::text_with_breaks(body);
    let answer_lines = ANSWER_LINE.find_iter(&text).count();
    let braced_lines = BRACED_ANSWER_LINE.find_iter(&text).count();
    let clue_lines = CLUE_LINE.find_iter(&text).count();

    (answer_lines >= tuning::TEXT_1_MIN_ANSWER_LINES
        || braced_lines >= tuning::TEXT_1_MIN_ANSWER_LINES)
        && clue_lines >= tuning::TEXT_1_MIN_CLUE_LINES
}

pub fn parse_text_type_1(doc: &Document) -> Result<ClueTable, ShapeError> {
    let body = body(doc)?;
    let mut lines: VecDeque<String> = dom::text_lines(body).into();

    // Drop the preamble: everything before the first ACROSS/DOWN heading.
    loop {
        match lines.front() {
            Some(line) => {
                let lower = line.to_lowercase();
                if lower.contains("across") || lower.contains("down") {
                    break;
                }
                lines.pop_front();
            }
            None => return Err(ExtractError::new("no across/down heading").into()),
        }
    }

    let mut rows: Vec<ClueRecord> = Vec::new();
    let mut direction: Option<&str> = None;
    let mut pending_number: Option<String> = None;

    while let Some(line_1) = lines.pop_front() {
        let trimmed = line_1.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if lower == "across" || lower == "down" {
            direction = Some(if lower == "across" { "a" } else { "d" });
            continue;
        }
        // The clue number can be a line of its own when the source renders a
        // numbers column separately.
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            pending_number = Some(trimmed.to_string());
            continue;
        }

        let Some(line_2) = lines.pop_front() else { break };

        let (clue_number, clue) = match pending_number.take() {
            Some(number) => (number, line_1.clone()),
            None => match line_1.split_once(char::is_whitespace) {
                Some((number, clue)) => (number.to_string(), clue.trim().to_string()),
                None => {
                    // Not a clue line after all; realign on the second line.
                    lines.push_front(line_2);
                    continue;
                }
            },
        };

        let Some(answer_match) = ANSWER_PREFIX.find(&line_2) else {
            lines.push_front(line_2);
            continue;
        };
        let answer = line_2[..answer_match.end()]
            .trim_matches(|c: char| {
                c.is_whitespace() || matches!(c, '-' | '—' | '–' | ':' | '{' | '}')
            })
            .to_string();
        let annotation = line_2[answer_match.end()..]
            .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation() || c == '—')
            .to_string();

        let clue_number = clue_number
            .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .to_string();
        if clue_number.is_empty() || answer.is_empty() {
            lines.push_front(line_2);
            continue;
        }
        let suffixed = match (direction, clue_number.ends_with(['a', 'd'])) {
            (Some(direction), false) => format!("{}{}", clue_number, direction),
            _ => clue_number,
        };

        rows.push(ClueRecord::bare(suffixed, clue, answer, None, Some(annotation)));
    }

    let clues: Vec<String> = rows.iter().map(|r| r.clue.clone()).collect();
    let fragments = dom::select_texts(dom::root_element(&doc.html), &UNDERLINE_MARKUP);
    let definitions = align_suspected_definitions(&clues, &fragments)?;
    for (row, definition) in rows.iter_mut().zip(definitions) {
        row.definition = definition;
    }

    Ok(rows)
}

// ── text-type-2 ─────────────────────────────────────────────────────────────
//
// Everything on one line per clue:
// 1   Emotionally sensitive to mice running (8) EMPATHIC {EM{PAT}{H}IC*}

pub fn is_text_type_2(doc: &Document) -> bool {
    let Some(body) = dom::entry_content(&doc.html) else { return false };
    let text = dom::text_with_breaks(body);
    let clue_lines = CLUE_LINE.find_iter(&text).count();
    let bolds = body.select(&B_TAG).count();
    let (lo, hi) = (
        tuning::TEXT_2_EXPECTED_BOLDS - tuning::TEXT_2_BOLD_TOLERANCE,
        tuning::TEXT_2_EXPECTED_BOLDS + tuning::TEXT_2_BOLD_TOLERANCE,
    );
    clue_lines >= tuning::TEXT_2_MIN_CLUE_LINES && (lo..=hi).contains(&bolds)
}

pub fn parse_text_type_2(doc: &Document) -> Result<ClueTable, ShapeError> {
    static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+[ad]?").unwrap());
    static ENUMERATION: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\([0-9,\- ]*\)").unwrap());
    static ANSWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z\s\-]+\b").unwrap());

    let body = body(doc)?;
    let mut rows = Vec::new();
    let mut direction = "a";

    for line in dom::text_lines(body) {
        if line.eq_ignore_ascii_case("down") {
            direction = "d";
            continue;
        }

        let Some(number_match) = NUMBER.find(&line) else { continue };
        let Some(enumeration) = ENUMERATION.find(&line) else { continue };
        if enumeration.end() <= number_match.end() {
            continue;
        }
        let clue = line[number_match.end()..enumeration.end()].trim();
        // Lines like "21 See 14 (7)" carry no answer; skip them.
        let Some(answer_match) = ANSWER.find(&line[enumeration.end()..]) else { continue };

        let annotation = line[enumeration.end() + answer_match.end()..].trim();
        let number = number_match.as_str();
        let number = if number.ends_with(['a', 'd']) {
            number.to_string()
        } else {
            format!("{}{}", number, direction)
        };

        rows.push(ClueRecord::bare(
            number,
            clue,
            answer_match.as_str().trim(),
            None,
            Some(annotation.to_string()),
        ));
    }

    let clues: Vec<String> = rows.iter().map(|r| r.clue.clone()).collect();
    let fragments = dom::select_texts(body, &B_TAG);
    let definitions = align_suspected_definitions(&clues, &fragments)?;
    for (row, definition) in rows.iter_mut().zip(definitions) {
        row.definition = definition;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(html, "https://times-xwd-times.livejournal.com/2550896.html")
    }

    fn text_type_1_page() -> String {
        let body = concat!(
            "Solving time: 22 minutes, no real holdups.<br><br>",
            "ACROSS<br>",
            "1 Dad, to irritate, gets into row about <u>mending equipment</u> (6,3)<br>",
            "REPAIR KIT - PA IRK in TIER reversed<br>",
            "6 Carbon copies for <u>heads</u> (5)<br>",
            "CAPES — C APES; geographical heads (promontories)<br>",
            "DOWN<br>",
            "1 <u>Holy object</u> oddly laid in playing field (5)<br>",
            "RELIC : L I in REC<br>",
            "2 <u>Sweet complexion</u> (7,3,5)<br>",
            "{PEACHES AND CREAM} - DD<br>",
        );
        format!(r#"<html><body><div class="asset-body">{body}</div></body></html>"#)
    }

    #[test]
    fn text_type_1_two_line_state_machine() {
        let page = text_type_1_page();
        let rows = parse_text_type_1(&doc(&page)).unwrap();
        assert_eq!(rows.len(), 4);

        let numbers: Vec<&str> = rows.iter().map(|r| r.clue_number.as_str()).collect();
        assert_eq!(numbers, vec!["1a", "6a", "1d", "2d"]);

        // All three dash/colon variants split the same way.
        assert_eq!(rows[0].answer, "REPAIR KIT");
        assert_eq!(rows[0].annotation.as_deref(), Some("PA IRK in TIER reversed"));
        assert_eq!(rows[1].answer, "CAPES");
        assert_eq!(rows[2].answer, "RELIC");
        // Braces around the answer are decoration, not content.
        assert_eq!(rows[3].answer, "PEACHES AND CREAM");
        assert_eq!(rows[3].annotation.as_deref(), Some("DD"));

        assert_eq!(rows[0].definition.as_deref(), Some("mending equipment"));
        assert_eq!(rows[3].definition.as_deref(), Some("Sweet complexion"));
    }

    #[test]
    fn text_type_1_number_on_its_own_line() {
        let body = concat!(
            "ACROSS<br>",
            "1<br>",
            "Dad, to irritate, gets into row about mending equipment (6,3)<br>",
            "REPAIR KIT - PA IRK in TIER reversed<br>",
        );
        let page = format!(r#"<html><body><div class="asset-body">{body}</div></body></html>"#);
        let rows = parse_text_type_1(&doc(&page)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].clue, "Dad, to irritate, gets into row about mending equipment (6,3)");
    }

    #[test]
    fn text_type_1_requeues_after_stray_line() {
        let body = concat!(
            "ACROSS<br>",
            "A stray editorial remark with no number<br>",
            "1 Carbon copies for heads (5)<br>",
            "CAPES - C APES<br>",
        );
        let page = format!(r#"<html><body><div class="asset-body">{body}</div></body></html>"#);
        let rows = parse_text_type_1(&doc(&page)).unwrap();
        // The stray line consumes the clue line as its partner, fails on the
        // answer pattern, and the clue line is pushed back for realignment.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].answer, "CAPES");
    }

    fn text_type_2_page() -> String {
        let mut body = String::from("<h4>ACROSS</h4>");
        body.push_str(
            "1 Emotionally sensitive to <b>mice running all over girl's house</b> (8) EMPATHIC {EM{PAT}{H}IC*}<br>",
        );
        body.push_str("6 Network <b>heads</b> of many engineering start-ups (4) MESH Acrostic<br>");
        body.push_str("21 See 14 (7)<br>");
        body.push_str("<h4>DOWN</h4>");
        body.push_str("1 Negligent Milan admits <b>university's past pupils</b> (6) ALUMNI {AL{U}MNI*}<br>");
        format!(r#"<html><body><div class="entry-content">{body}</div></body></html>"#)
    }

    #[test]
    fn text_type_2_single_line_clues() {
        let page = text_type_2_page();
        let rows = parse_text_type_2(&doc(&page)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].answer, "EMPATHIC");
        assert_eq!(rows[0].annotation.as_deref(), Some("{EM{PAT}{H}IC*}"));
        assert_eq!(
            rows[0].definition.as_deref(),
            Some("mice running all over girl's house")
        );
        // "See 14" cross-references are skipped, and DOWN flips the suffix.
        assert_eq!(rows[2].clue_number, "1d");
        assert_eq!(rows[2].answer, "ALUMNI");
    }

    #[test]
    fn text_type_2_classifier_counts_bolds() {
        let page = text_type_2_page();
        // Far fewer than the expected ~64 bolded entries.
        assert!(!is_text_type_2(&doc(&page)));
    }
}
