//! List-shape classifiers and extractors: pages where each clue is a run of
//! paragraphs, divs, or bare lines rather than a table row.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::align::align_suspected_definitions;
use super::dom;
use super::util::{is_plausible_answer, is_upperish, CLUE_NUMBER, ENUMERATION_AT_END};
use super::{tuning, Document};
use crate::error::{ExtractError, ShapeError};
use crate::record::{ClueRecord, ClueTable};

static P: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());
static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static FTS_DEFINITION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[class*="fts-definition"]"#).unwrap());
static UNDERLINE_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[style*="underline"]"#).unwrap());

fn body(doc: &Document) -> Result<ElementRef<'_>, ExtractError> {
    dom::entry_content(&doc.html).ok_or_else(|| ExtractError::new("no post body"))
}

// ── list-type-1 ─────────────────────────────────────────────────────────────
//
// One paragraph per clue, direction given by bare "Across"/"Down" paragraphs:
//
//     <p>21 <span><span style="...underline">Avoid</span> newspaper offered
//     around hotel (4)</span><br><strong>SHUN</strong><br>SUN round H</p>

pub fn is_list_type_1(doc: &Document) -> bool {
    let Some(body) = dom::entry_content(&doc.html) else { return false };
    let paragraphs: Vec<_> = body.select(&P).collect();
    if paragraphs.is_empty() {
        return false;
    }
    let with_span_and_strong = paragraphs
        .iter()
        .filter(|p| {
            let tags = dom::descendant_tag_names(**p);
            tags.iter().any(|t| t == "span") && tags.iter().any(|t| t == "strong")
        })
        .count();
    with_span_and_strong as f64 / paragraphs.len() as f64 >= tuning::LIST_1_PARAGRAPH_PROPORTION
}

pub fn parse_list_type_1(doc: &Document) -> Result<ClueTable, ShapeError> {
    let body = body(doc)?;
    let mut direction: Option<&str> = None;
    let mut rows = Vec::new();

    for paragraph in body.select(&P) {
        let full_text = dom::element_text(paragraph);
        match full_text.trim().to_lowercase().as_str() {
            "across" => direction = Some("a"),
            "down" => direction = Some("d"),
            _ => {}
        }

        let tags = dom::descendant_tag_names(paragraph);
        let has = |t: &str| tags.iter().any(|name| name == t);
        if !(has("br") && has("span") && has("strong")) {
            continue;
        }

        // Descendant texts in order: optional number, clue, definition
        // fragments, answer, annotation pieces.
        let mut texts: Vec<String> = dom::descendant_element_texts(paragraph)
            .into_iter()
            .filter(|(tag, _)| tag != "br")
            .map(|(_, text)| text)
            .collect();

        let mut clue_number = None;
        if texts
            .first()
            .is_some_and(|t| CLUE_NUMBER.is_match(t.trim()))
        {
            clue_number = Some(texts.remove(0));
        }
        if texts.is_empty() {
            return Err(ExtractError::new("paragraph has no clue tag").into());
        }
        let clue = texts.remove(0);

        let answer_index = texts
            .iter()
            .position(|t| is_upperish(t.trim()))
            .ok_or_else(|| ExtractError::new("paragraph has no uppercase answer tag"))?;
        let answer = texts[answer_index].clone();
        let definition = texts[..answer_index].join("/");

        let clue_number = match clue_number {
            Some(n) => n,
            // No dedicated number tag: the number is the paragraph text
            // preceding the clue.
            None => {
                let start = full_text
                    .find(&clue)
                    .ok_or_else(|| ExtractError::new("clue text not found in paragraph"))?;
                full_text[..start].to_string()
            }
        };
        let answer_end = full_text
            .find(&answer)
            .map(|start| start + answer.len())
            .ok_or_else(|| ExtractError::new("answer text not found in paragraph"))?;
        let annotation = full_text[answer_end..].trim().to_string();

        let clue_number = clue_number.trim().to_string();
        let suffix = if clue_number.chars().all(|c| c.is_ascii_digit()) {
            direction.unwrap_or("")
        } else {
            ""
        };

        rows.push(ClueRecord::bare(
            format!("{}{}", clue_number, suffix),
            clue,
            answer,
            if definition.is_empty() { None } else { Some(definition) },
            Some(annotation),
        ));
    }

    Ok(rows)
}

// ── list-type-2 ─────────────────────────────────────────────────────────────
//
// Three leaf divs per clue: a clue div with the number in a span and the
// definition in `fts-definition` spans, an answer div, an annotation div.

fn leaf_divs(body: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    body.select(&DIV)
        .filter(|div| div.select(&DIV).next().is_none())
        .filter(|div| !dom::element_text(*div).trim().is_empty())
        .collect()
}

pub fn is_list_type_2(doc: &Document) -> bool {
    let Some(body) = dom::entry_content(&doc.html) else { return false };
    let n = leaf_divs(body).len();
    let (lo, hi) = (
        tuning::LIST_2_EXPECTED_DIVS - tuning::LIST_2_DIV_TOLERANCE,
        tuning::LIST_2_EXPECTED_DIVS + tuning::LIST_2_DIV_TOLERANCE,
    );
    (lo..=hi).contains(&n)
}

pub fn parse_list_type_2(doc: &Document) -> Result<ClueTable, ShapeError> {
    let body = body(doc)?;
    let divs = leaf_divs(body);
    let text_of = |i: usize| dom::element_text(divs[i]);

    let divider = |word: &str| {
        divs.iter()
            .position(|d| dom::element_text(*d).trim().eq_ignore_ascii_case(word))
    };
    let across = divider("across").ok_or_else(|| ExtractError::new("no across divider"))?;
    let down = divider("down").ok_or_else(|| ExtractError::new("no down divider"))?;

    let mut rows = Vec::new();
    let mut i = 1;
    while i + 3 < divs.len() {
        if [i, i + 1, i + 2].contains(&across) || [i, i + 1, i + 2].contains(&down) {
            i += 1;
            continue;
        }

        match parse_list_type_2_group(divs[i], &text_of(i + 1), &text_of(i + 2)) {
            Some((number, clue, definition, answer, annotation)) => {
                let direction = if across < i && i < down { "a" } else { "d" };
                rows.push(ClueRecord::bare(
                    format!("{}{}", number, direction),
                    clue,
                    answer,
                    definition,
                    Some(annotation),
                ));
                i += 3;
            }
            None => i += 1,
        }
    }
    Ok(rows)
}

/// One candidate 3-div group; `None` means "not a clue here, slide by one".
fn parse_list_type_2_group(
    clue_div: ElementRef<'_>,
    answer_text: &str,
    annotation_text: &str,
) -> Option<(String, String, Option<String>, String, String)> {
    let number = clue_div
        .select(&SPAN)
        .map(|span| dom::element_text(span).trim().to_string())
        .find(|t| {
            let bare = t.trim_matches(|c: char| c == '.' || c == ' ');
            !bare.is_empty() && bare.chars().all(|c| c.is_ascii_digit())
        })?;

    let div_text = dom::element_text(clue_div);
    let clue = div_text.strip_prefix(&number)?.to_string();
    let number = number
        .trim_matches(|c: char| c == '.' || c == ' ')
        .to_string();

    let definition = dom::select_texts(clue_div, &FTS_DEFINITION).join("/");
    if !is_upperish(answer_text.trim()) {
        return None;
    }

    Some((
        number,
        clue,
        if definition.is_empty() { None } else { Some(definition) },
        answer_text.to_string(),
        annotation_text.trim().to_string(),
    ))
}

// ── list-type-3 ─────────────────────────────────────────────────────────────
//
// Two paragraphs per clue: "1. <u>Advantageous</u> to be young … (6)" then
// "USEFUL : annotation".

pub fn is_list_type_3(doc: &Document) -> bool {
    let Some(body) = dom::entry_content(&doc.html) else { return false };
    let n = body
        .select(&P)
        .filter(|p| p.select(&SPAN).next().is_some())
        .count();
    let (lo, hi) = (
        tuning::LIST_3_EXPECTED_PARAGRAPHS - tuning::LIST_3_PARAGRAPH_TOLERANCE,
        tuning::LIST_3_EXPECTED_PARAGRAPHS + tuning::LIST_3_PARAGRAPH_TOLERANCE,
    );
    (lo..=hi).contains(&n)
}

pub fn parse_list_type_3(doc: &Document) -> Result<ClueTable, ShapeError> {
    static NUMBER_PREFIX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[0-9]+\.?\s*").unwrap());

    let body = body(doc)?;
    let paragraphs: Vec<_> = body.select(&P).collect();
    let divider = |word: &str| {
        paragraphs
            .iter()
            .position(|p| dom::element_text(*p).trim().eq_ignore_ascii_case(word))
    };
    let across = divider("across").ok_or_else(|| ExtractError::new("no across divider"))?;
    let down = divider("down").ok_or_else(|| ExtractError::new("no down divider"))?;

    let mut rows = Vec::new();
    let mut i = 1;
    while i + 3 < paragraphs.len() {
        if [i, i + 1, i + 2].contains(&across) || [i, i + 1, i + 2].contains(&down) {
            i += 1;
            continue;
        }

        let p1_text = dom::element_text(paragraphs[i]);
        let Some(number_match) = NUMBER_PREFIX.find(p1_text.trim()) else {
            i += 1;
            continue;
        };
        let clue = p1_text.trim()[number_match.end()..].trim().to_string();
        let definition = dom::select_texts(paragraphs[i], &UNDERLINE_SPAN).join("/");

        let p2_text = dom::element_text(paragraphs[i + 1]);
        let (answer, annotation) = match p2_text.split_once(':') {
            Some((answer, rest)) => (answer.trim().to_string(), rest.trim().to_string()),
            None => (p2_text.trim().to_string(), String::new()),
        };
        if !is_upperish(&answer) {
            i += 1;
            continue;
        }

        let number = number_match
            .as_str()
            .trim_matches(|c: char| c == '.' || c.is_whitespace());
        let direction = if across < i && i < down { "a" } else { "d" };
        rows.push(ClueRecord::bare(
            format!("{}{}", number, direction),
            clue,
            answer,
            if definition.is_empty() { None } else { Some(definition) },
            Some(annotation),
        ));
        i += 2;
    }
    Ok(rows)
}

// ── list-type-4 ─────────────────────────────────────────────────────────────
//
// The markup carries no structure at all: a flat run of text blocks cycling
// number / clue / ANSWER / annotation, with "Across" and "Down" blocks
// switching direction. Blocks are parsed purely positionally; definitions
// come from underline markup aligned against the extracted clues.

pub fn is_list_type_4(doc: &Document) -> bool {
    let Some(body) = dom::entry_content(&doc.html) else { return false };
    let blocks = dom::text_lines(body);
    let numbers = blocks
        .iter()
        .filter(|b| CLUE_NUMBER.is_match(b))
        .count();
    let answers = blocks
        .iter()
        .filter(|b| is_upperish(b) && is_plausible_answer(b, tuning::ANSWER_MAX_LEN))
        .count();
    let has_across = blocks.iter().any(|b| b.eq_ignore_ascii_case("across"));
    numbers >= tuning::LIST_4_MIN_CLUE_BLOCKS
        && answers >= tuning::LIST_4_MIN_CLUE_BLOCKS
        && has_across
}

pub fn parse_list_type_4(doc: &Document) -> Result<ClueTable, ShapeError> {
    let body = body(doc)?;
    let mut rows = parse_blocks(&dom::text_lines(body));

    let clues: Vec<String> = rows.iter().map(|r| r.clue.clone()).collect();
    let fragments = dom::suspected_definition_texts(body, &[&UNDERLINE_SPAN]);
    let definitions = align_suspected_definitions(&clues, &fragments)?;
    for (row, definition) in rows.iter_mut().zip(definitions) {
        row.definition = definition;
    }
    Ok(rows)
}

/// The positional state machine behind list-type-4, over pre-split blocks.
/// A candidate clue is number, enumerated clue, plausible uppercase answer,
/// then an optional annotation block (anything that is not the next clue's
/// number or a direction marker). Anything else slides the window by one.
fn parse_blocks(blocks: &[String]) -> ClueTable {
    let is_marker =
        |b: &str| b.eq_ignore_ascii_case("across") || b.eq_ignore_ascii_case("down");

    let mut direction = "a";
    let mut rows = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        let block = blocks[i].as_str();
        if block.eq_ignore_ascii_case("across") {
            direction = "a";
            i += 1;
            continue;
        }
        if block.eq_ignore_ascii_case("down") {
            direction = "d";
            i += 1;
            continue;
        }

        let fits = i + 2 < blocks.len()
            && CLUE_NUMBER.is_match(block)
            && ENUMERATION_AT_END.is_match(&blocks[i + 1])
            && is_upperish(&blocks[i + 2])
            && is_plausible_answer(&blocks[i + 2], tuning::ANSWER_MAX_LEN);
        if !fits {
            i += 1;
            continue;
        }

        let number = block.to_lowercase();
        let number = if number.ends_with(['a', 'd']) {
            number
        } else {
            format!("{}{}", number, direction)
        };

        let annotation = blocks
            .get(i + 3)
            .filter(|next| !CLUE_NUMBER.is_match(next) && !is_marker(next))
            .cloned();
        let consumed = if annotation.is_some() { 4 } else { 3 };

        rows.push(ClueRecord::bare(
            number,
            blocks[i + 1].clone(),
            blocks[i + 2].clone(),
            None,
            annotation,
        ));
        i += consumed;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(html, "https://www.fifteensquared.net/2021/05/20/test/")
    }

    fn list_type_1_page() -> String {
        let mut paragraphs = String::from("<p>Across</p>");
        let clues = [
            ("21", "Avoid", " newspaper offered around hotel (4)", "SHUN", "SUN (newspaper) round H (hotel)"),
            ("22", "Heads", " of state caper around (5)", "CAPES", "C + APES"),
        ];
        for (n, def, rest, answer, ann) in clues {
            paragraphs.push_str(&format!(
                "<p>{n} <span><span style=\"text-decoration: underline\">{def}</span>{rest}</span><br><strong>{answer}</strong><br>{ann}</p>"
            ));
        }
        format!(r#"<html><body><div class="entry-content">{paragraphs}</div></body></html>"#)
    }

    #[test]
    fn list_type_1_reads_paragraph_anatomy() {
        let page = list_type_1_page();
        let d = doc(&page);
        let rows = parse_list_type_1(&d).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].clue_number, "21a");
        assert_eq!(rows[0].definition.as_deref(), Some("Avoid"));
        assert_eq!(rows[0].answer, "SHUN");
        assert_eq!(rows[0].annotation.as_deref(), Some("SUN (newspaper) round H (hotel)"));
        assert_eq!(rows[1].clue_number, "22a");
    }

    #[test]
    fn list_type_1_classifier_needs_span_strong_majority() {
        let page = list_type_1_page();
        assert!(is_list_type_1(&doc(&page)));
        let plain = r#"<html><body><div class="entry-content"><p>one</p><p>two</p><p>three</p></div></body></html>"#;
        assert!(!is_list_type_1(&doc(plain)));
    }

    fn list_type_2_page() -> String {
        let mut divs = String::from("<div>Across</div>");
        for n in 1..=3 {
            divs.push_str(&format!(
                r#"<div><span class="fts-clue">{n}. </span><em><span class="fts-clue">Needs a slap when drunk </span><span class="fts-definition">walks by the sea</span><span class="fts-clue"> (10)</span></em></div>
                <div class="fts-answer"><span>ESPLANADES</span></div>
                <div><p><span>An anagram of NEEDS A SLAP</span></p></div>"#
            ));
        }
        divs.push_str("<div>Down</div>");
        for n in 4..=5 {
            divs.push_str(&format!(
                r#"<div><span>{n}. </span><em><span class="fts-definition">Turn</span><span> in pins, awkwardly (4)</span></em></div>
                <div><span>SPIN</span></div>
                <div><span>Anagram of PINS</span></div>"#
            ));
        }
        divs.push_str("<div>That's all for today.</div>");
        format!(r#"<html><body><div class="entry-content">{divs}</div></body></html>"#)
    }

    #[test]
    fn list_type_2_walks_three_div_groups() {
        let page = list_type_2_page();
        let rows = parse_list_type_2(&doc(&page)).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].definition.as_deref(), Some("walks by the sea"));
        assert_eq!(rows[0].answer, "ESPLANADES");
        assert_eq!(rows[3].clue_number, "4d");
        assert_eq!(rows[3].answer, "SPIN");
    }

    fn list_type_3_page(clues_per_direction: usize) -> String {
        let mut paragraphs = String::from("<p>Across</p>");
        for n in 1..=clues_per_direction {
            paragraphs.push_str(&format!(
                r#"<p><span>{n}. <span style="text-decoration: underline">Advantageous</span> to be young with a lisp (6)</span></p>
                <p><span><strong>USEFUL</strong></span> : "youthful" pronounced with a lisp</p>"#
            ));
        }
        paragraphs.push_str("<p>Down</p>");
        for n in 1..=clues_per_direction {
            paragraphs.push_str(&format!(
                r#"<p><span>{n}. <span style="text-decoration: underline">Turn</span> in pins, awkwardly (4)</span></p>
                <p><span>SPIN</span> : anagram of PINS</p>"#
            ));
        }
        format!(r#"<html><body><div class="entry-content">{paragraphs}</div></body></html>"#)
    }

    #[test]
    fn list_type_3_pairs_paragraphs() {
        let page = list_type_3_page(16);
        let d = doc(&page);
        assert!(is_list_type_3(&d));
        let rows = parse_list_type_3(&d).unwrap();
        assert!(rows.len() >= 30);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].definition.as_deref(), Some("Advantageous"));
        assert_eq!(rows[0].answer, "USEFUL");
        let first_down = rows.iter().find(|r| r.clue_number.ends_with('d')).unwrap();
        assert_eq!(first_down.answer, "SPIN");
    }

    #[test]
    fn blocks_state_machine_cycles_through_quads() {
        let blocks: Vec<String> = [
            "Setter's midweek puzzle",
            "Across",
            "1",
            "Avoid newspaper offered around hotel (4)",
            "SHUN",
            "SUN (newspaper) round H (hotel)",
            "2",
            "Carbon copies for heads (5)",
            "CAPES",
            "C APES",
            "Down",
            "2",
            "Holy object oddly laid in playing field (5)",
            "RELIC",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let rows = parse_blocks(&blocks);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].answer, "SHUN");
        assert_eq!(rows[0].annotation.as_deref(), Some("SUN (newspaper) round H (hotel)"));
        assert_eq!(rows[1].clue_number, "2a");
        assert_eq!(rows[2].clue_number, "2d");
        // Trailing clue without an annotation block still parses.
        assert_eq!(rows[2].annotation, None);
    }

    #[test]
    fn blocks_state_machine_skips_noise() {
        let blocks: Vec<String> = [
            "Across",
            "not a number",
            "1",
            "no enumeration here",
            "1",
            "A proper clue at last (6)",
            "ANSWER",
            "Down",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let rows = parse_blocks(&blocks);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].answer, "ANSWER");
        assert_eq!(rows[0].annotation, None);
    }

    #[test]
    fn list_type_4_aligns_underlined_definitions() {
        let blocks = [
            "Across",
            "1",
            "<u>Avoid</u> newspaper offered around hotel (4)",
            "SHUN",
            "SUN (newspaper) round H (hotel)",
            "2",
            "Carbon copies for <u>heads</u> (5)",
            "CAPES",
            "C APES",
        ];
        let paragraphs: String = blocks.iter().map(|b| format!("<p>{b}</p>")).collect();
        let page = format!(
            r#"<html><body><div class="entry-content">{paragraphs}</div></body></html>"#
        );

        let rows = parse_list_type_4(&doc(&page)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].clue, "Avoid newspaper offered around hotel (4)");
        assert_eq!(rows[0].answer, "SHUN");
        assert_eq!(rows[0].definition.as_deref(), Some("Avoid"));
        assert_eq!(rows[0].annotation.as_deref(), Some("SUN (newspaper) round H (hotel)"));
        assert_eq!(rows[1].definition.as_deref(), Some("heads"));
    }

    #[test]
    fn blocks_keep_existing_direction_suffix() {
        let blocks: Vec<String> = ["Across", "3d", "A cross-referenced clue (4)", "WORD", "note"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = parse_blocks(&blocks);
        assert_eq!(rows[0].clue_number, "3d");
    }
}
