//! Table-shape classifiers and extractors: pages whose clues live in an HTML
//! table grid. Five layout families, each a conjunction of structural and
//! statistical checks over the lowered [`Grid`], each paired with a state
//! machine reading fixed column positions.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::align::align_suspected_definitions;
use super::dom;
use super::grid::Grid;
use super::util::{
    self, definition_if_substring, is_plausible_answer, is_upperish, ENUMERATION,
    ENUMERATION_AT_END,
};
use super::{tuning, Document};
use crate::error::{ExtractError, ShapeError};
use crate::record::{ClueRecord, ClueTable};

static UNDERLINE_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[style*="underline"]"#).unwrap());
static FTS_DEFINITION_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[class*="fts-definition"]"#).unwrap());
static U_TAG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("u").unwrap());

fn contains_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

fn is_direction(s: &str) -> bool {
    s.eq_ignore_ascii_case("across") || s.eq_ignore_ascii_case("down")
}

/// Attach aligned definitions to rows in place. Align failures are contract
/// violations and propagate.
fn attach_definitions(rows: &mut [ClueRecord], fragments: &[String]) -> Result<(), ShapeError> {
    let clues: Vec<String> = rows.iter().map(|r| r.clue.clone()).collect();
    let definitions = align_suspected_definitions(&clues, fragments)?;
    for (row, definition) in rows.iter_mut().zip(definitions) {
        row.definition = definition;
    }
    Ok(())
}

fn drop_implausible_answers(rows: Vec<ClueRecord>, max_len: usize) -> Vec<ClueRecord> {
    rows.into_iter()
        .filter(|r| is_plausible_answer(&r.answer, max_len))
        .collect()
}

// ── table-type-1 ────────────────────────────────────────────────────────────
//
// Three columns; an all-cell ACROSS row and an all-cell DOWN row; each clue
// takes two stacked rows sharing one number/answer pair:
//
//     1   ORGANIST   Key worker possibly having to pedal (8)
//                    Cryptic definition
//     6   MEASLY     Paltry bite to eat finally snaffled with cunning (6)
//                    MEA(l) + SLY ("cunning")

pub fn is_table_type_1(doc: &Document) -> bool {
    Grid::all_in(&doc.html)
        .iter()
        .any(|(grid, _)| grid_is_table_type_1(grid))
}

fn grid_is_table_type_1(grid: &Grid) -> bool {
    let Some(across) = grid.divider_row("across") else { return false };
    let Some(down) = grid.divider_row("down") else { return false };
    if down <= across || grid.n_rows() < 4 {
        return false;
    }

    let clue_rows = grid.n_rows() as i64 - 2;

    // The number and answer columns are blank on every second (annotation) row.
    let both_blank = (0..grid.n_rows())
        .filter(|&r| grid.cell(r, 0).is_none() && grid.cell(r, 1).is_none())
        .count() as i64;
    if 2 * both_blank != clue_rows {
        return false;
    }

    let numbers_ok = grid
        .column_values(0)
        .iter()
        .all(|(_, s)| is_direction(s) || contains_digit(s));
    let answers_ok = grid
        .column_values(1)
        .iter()
        .all(|(_, s)| is_direction(s) || is_upperish(s));

    // Around half of the clue/annotation cells end in an enumeration: clues
    // do, annotations don't, and not every enumeration survives transcription.
    let enumeration_hits = grid
        .column_values(2)
        .iter()
        .filter(|(_, s)| is_direction(s) || ENUMERATION_AT_END.is_match(s))
        .count() as i64;
    let enumerations_ok =
        ((enumeration_hits - 2) - clue_rows / 2).abs() <= tuning::TABLE_1_ENUMERATION_TOLERANCE;

    numbers_ok && answers_ok && enumerations_ok
}

pub fn parse_table_type_1(doc: &Document) -> Result<ClueTable, ShapeError> {
    let grids = Grid::all_in(&doc.html);
    let (grid, _) = grids
        .iter()
        .find(|(grid, _)| grid_is_table_type_1(grid))
        .ok_or_else(|| ExtractError::new("no table-type-1 grid"))?;

    let across = grid.divider_row("across").ok_or_else(|| ExtractError::new("no across row"))?;
    let down = grid.divider_row("down").ok_or_else(|| ExtractError::new("no down row"))?;

    let body: Vec<usize> = (0..grid.n_rows())
        .filter(|&r| r != across && r != down && r > across)
        .collect();

    let mut rows = Vec::new();
    for pair in body.chunks(2) {
        let [first, second] = pair else {
            return Err(ExtractError::new("unbalanced clue/annotation rows").into());
        };
        let direction = if *first > down { "d" } else { "a" };
        if (*second > down) != (*first > down) {
            return Err(ExtractError::new("clue pair straddles the down divider").into());
        }
        let number = grid.cell(*first, 0).ok_or_else(|| ExtractError::new("missing clue number"))?;
        let answer = grid.cell(*first, 1).ok_or_else(|| ExtractError::new("missing answer"))?;
        let clue = grid.cell(*first, 2).ok_or_else(|| ExtractError::new("missing clue"))?;
        let annotation = grid.cell(*second, 2).unwrap_or_default();

        rows.push(ClueRecord::bare(
            format!("{}{}", number.trim(), direction),
            clue,
            answer.to_uppercase(),
            None,
            Some(annotation.to_string()),
        ));
    }

    // Definitions are underlined spans (fifteensquared also uses a dedicated
    // span class); whole-page harvest, aligned back onto the clues.
    let root = dom::root_element(&doc.html);
    let mut fragments = dom::select_texts(root, &UNDERLINE_SPAN);
    fragments.extend(dom::select_texts(root, &FTS_DEFINITION_SPAN));
    attach_definitions(&mut rows, &fragments)?;

    Ok(drop_implausible_answers(rows, tuning::ANSWER_MAX_LEN))
}

// ── table-type-2 ────────────────────────────────────────────────────────────
//
// Like type 1, but clue and annotation share one cell, flanking the
// enumeration: "They roared ... (8)Reference to the Roaring Twenties".

pub fn is_table_type_2(doc: &Document) -> bool {
    Grid::all_in(&doc.html)
        .iter()
        .any(|(grid, _)| grid_is_table_type_2(grid))
}

fn grid_is_table_type_2(grid: &Grid) -> bool {
    if grid.divider_row("across").is_none() || grid.divider_row("down").is_none() {
        return false;
    }
    if grid.n_rows() < 4 {
        return false;
    }

    // Every row is fully populated in the first three columns.
    let full = |c: usize| grid.column(c).iter().all(Option::is_some);
    if !full(0) || !full(1) || !full(2) {
        return false;
    }

    let numbers_ok = grid
        .column_values(0)
        .iter()
        .all(|(_, s)| is_direction(s) || contains_digit(s));
    let answers_ok = grid
        .column_values(1)
        .iter()
        .all(|(_, s)| is_direction(s) || is_upperish(s));
    // Enumeration flanked on both sides: clue before, annotation after.
    let clue_cells_ok = grid.column_values(2).iter().all(|(_, s)| {
        is_direction(s)
            || ENUMERATION
                .find_iter(s)
                .any(|m| m.start() > 0 && m.end() < s.len())
    });

    numbers_ok && answers_ok && clue_cells_ok
}

pub fn parse_table_type_2(doc: &Document) -> Result<ClueTable, ShapeError> {
    let grids = Grid::all_in(&doc.html);
    let (grid, _) = grids
        .iter()
        .find(|(grid, _)| grid_is_table_type_2(grid))
        .ok_or_else(|| ExtractError::new("no table-type-2 grid"))?;

    let across = grid.divider_row("across").ok_or_else(|| ExtractError::new("no across row"))?;
    let down = grid.divider_row("down").ok_or_else(|| ExtractError::new("no down row"))?;

    let mut rows = Vec::new();
    for r in 0..grid.n_rows() {
        if r == across || r == down || r < across {
            continue;
        }
        let direction = if r > down { "d" } else { "a" };
        let number = grid.cell(r, 0).ok_or_else(|| ExtractError::new("missing clue number"))?;
        let answer = grid.cell(r, 1).ok_or_else(|| ExtractError::new("missing answer"))?;
        let cell = grid.cell(r, 2).ok_or_else(|| ExtractError::new("missing clue cell"))?;
        let split = ENUMERATION
            .find(cell)
            .ok_or_else(|| ExtractError::new("clue cell lacks enumeration"))?
            .end();

        rows.push(ClueRecord::bare(
            format!("{}{}", number.trim(), direction),
            cell[..split].trim(),
            answer,
            None,
            Some(cell[split..].trim().to_string()),
        ));
    }

    let fragments = dom::select_texts(dom::root_element(&doc.html), &U_TAG);
    attach_definitions(&mut rows, &fragments)?;

    Ok(drop_implausible_answers(rows, tuning::ANSWER_MAX_LEN))
}

// ── table-type-3 ────────────────────────────────────────────────────────────
//
// Column-labelled layout: an all-"Across" banner row, a "Clue No / Solution /
// Clue / Definition" label row, then one row per clue with the definition and
// annotation sharing the last column, separated by " / ". Clue numbers carry
// their own direction letters ("1A", "1D").

pub fn is_table_type_3(doc: &Document) -> bool {
    Grid::all_in(&doc.html)
        .iter()
        .any(|(grid, _)| grid_is_table_type_3(grid))
}

fn grid_is_table_type_3(grid: &Grid) -> bool {
    let Some(banner) = grid.row(0) else { return false };
    if banner.is_empty()
        || !banner.iter().all(|cell| {
            cell.as_deref()
                .is_some_and(|s| s.to_lowercase().contains("across"))
        })
    {
        return false;
    }
    if grid.divider_row("down").is_none() || grid.n_rows() < 5 {
        return false;
    }

    let label = |s: &str| {
        is_direction(s)
            || s.eq_ignore_ascii_case("clue no")
            || s.eq_ignore_ascii_case("solution")
            || s.eq_ignore_ascii_case("clue")
            || s.eq_ignore_ascii_case("definition")
    };

    let numbers_ok = grid
        .column_values(0)
        .iter()
        .all(|(_, s)| label(s) || contains_digit(s));
    let answers_ok = grid
        .column_values(1)
        .iter()
        .all(|(_, s)| label(s) || is_upperish(s));
    let enumeration_hits = grid
        .column_values(2)
        .iter()
        .filter(|(_, s)| label(s) || ENUMERATION_AT_END.is_match(s))
        .count() as i64;
    let enumerations_ok =
        (enumeration_hits - grid.n_rows() as i64).abs() <= tuning::TABLE_3_ENUMERATION_TOLERANCE;

    numbers_ok && answers_ok && enumerations_ok
}

pub fn parse_table_type_3(doc: &Document) -> Result<ClueTable, ShapeError> {
    let grids = Grid::all_in(&doc.html);
    let (grid, _) = grids
        .iter()
        .find(|(grid, _)| grid_is_table_type_3(grid))
        .ok_or_else(|| ExtractError::new("no table-type-3 grid"))?;

    let down = grid.divider_row("down").ok_or_else(|| ExtractError::new("no down row"))?;

    let mut rows = Vec::new();
    for r in 0..grid.n_rows() {
        // Banner and label rows, in both sections.
        if r <= 1 || r == down || r == down + 1 {
            continue;
        }
        let number = grid.cell(r, 0).ok_or_else(|| ExtractError::new("missing clue number"))?;
        let answer = grid.cell(r, 1).ok_or_else(|| ExtractError::new("missing answer"))?;
        let clue = grid.cell(r, 2).ok_or_else(|| ExtractError::new("missing clue"))?;
        let tail = grid.cell(r, 3).unwrap_or_default();

        // "Definition / annotation"; a tail without the separator is all
        // annotation.
        let parts: Vec<&str> = tail.split(" / ").collect();
        let (definition, annotation) = match parts.as_slice() {
            [] | [_] => (None, tail.to_string()),
            [init @ .., last] => (
                definition_if_substring(&init.join("/"), clue),
                last.to_string(),
            ),
        };

        rows.push(ClueRecord::bare(
            number.trim().to_lowercase(),
            clue,
            answer,
            definition,
            Some(annotation),
        ));
    }

    Ok(drop_implausible_answers(rows, tuning::ANSWER_MAX_LEN))
}

// ── table-type-4 ────────────────────────────────────────────────────────────
//
// "No / Clue / Wordplay / Entry" header, Across and Down marker rows with the
// rest of the row blank, and the entry column holding "ANSWER explanation".

pub fn is_table_type_4(doc: &Document) -> bool {
    Grid::all_in(&doc.html)
        .iter()
        .any(|(grid, _)| grid_is_table_type_4(grid))
}

fn grid_is_table_type_4(grid: &Grid) -> bool {
    let Some(header) = grid.row(0) else { return false };
    let header_ok = header.len() >= 4
        && ["no", "clue", "wordplay", "entry"]
            .iter()
            .zip(header)
            .all(|(want, cell)| cell.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(want)));
    if !header_ok {
        return false;
    }

    let col0 = grid.column_values(0);
    let has_across = col0.iter().any(|(_, s)| s.eq_ignore_ascii_case("across"));
    let has_down = col0.iter().any(|(_, s)| s.eq_ignore_ascii_case("down"));
    if !has_across || !has_down {
        return false;
    }

    let numbers_ok = col0
        .iter()
        .all(|(_, s)| is_direction(s) || s.eq_ignore_ascii_case("no") || contains_digit(s));
    let enumeration_hits = grid
        .column_values(1)
        .iter()
        .filter(|(_, s)| {
            is_direction(s) || s.eq_ignore_ascii_case("clue") || ENUMERATION_AT_END.is_match(s)
        })
        .count() as i64;
    let enumerations_ok =
        (enumeration_hits - grid.n_rows() as i64).abs() <= tuning::TABLE_4_ENUMERATION_TOLERANCE;

    numbers_ok && enumerations_ok
}

pub fn parse_table_type_4(doc: &Document) -> Result<ClueTable, ShapeError> {
    static ENTRY_ANSWER: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"^[A-Z'\- ]+").unwrap());

    let grids = Grid::all_in(&doc.html);
    let (grid, _) = grids
        .iter()
        .find(|(grid, _)| grid_is_table_type_4(grid))
        .ok_or_else(|| ExtractError::new("no table-type-4 grid"))?;

    let col0 = grid.column_values(0);
    let marker = |word: &str| {
        col0.iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(word))
            .map(|(r, _)| *r)
    };
    let across = marker("across").ok_or_else(|| ExtractError::new("no across marker"))?;
    let down = marker("down").ok_or_else(|| ExtractError::new("no down marker"))?;

    let mut rows = Vec::new();
    for r in 0..grid.n_rows() {
        if r == 0 || r == across || r == down || r < across {
            continue;
        }
        let direction = if r > down { "d" } else { "a" };
        let number = grid.cell(r, 0).ok_or_else(|| ExtractError::new("missing clue number"))?;
        let clue = grid.cell(r, 1).ok_or_else(|| ExtractError::new("missing clue"))?;
        let wordplay = grid.cell(r, 2).unwrap_or_default();
        let entry = grid.cell(r, 3).ok_or_else(|| ExtractError::new("missing entry"))?;

        let answer_end = ENTRY_ANSWER
            .find(entry.trim())
            .ok_or_else(|| ExtractError::new("entry has no leading answer"))?
            .end();
        let entry = entry.trim();
        let answer = entry[..answer_end].trim();
        let explanation = entry[answer_end..].trim();
        let annotation = format!("{} {}", wordplay, explanation).trim().to_string();

        rows.push(ClueRecord::bare(
            format!("{}{}", number.trim(), direction),
            clue,
            answer,
            None,
            Some(annotation),
        ));
    }

    let fragments = dom::select_texts(dom::root_element(&doc.html), &U_TAG);
    attach_definitions(&mut rows, &fragments)?;

    Ok(drop_implausible_answers(rows, tuning::ANSWER_MAX_LEN))
}

// ── table-type-5 ────────────────────────────────────────────────────────────
//
// One two-column table per direction (so at least two matching tables per
// page): a direction banner row, then alternating clue rows (numbered) and
// "ANSWER - annotation" rows (number column blank).

pub fn is_table_type_5(doc: &Document) -> bool {
    Grid::all_in(&doc.html)
        .iter()
        .filter(|(grid, _)| grid_is_table_type_5(grid))
        .count()
        >= tuning::TABLE_5_MIN_TABLES
}

fn grid_is_table_type_5(grid: &Grid) -> bool {
    let Some(banner) = grid.row(0) else { return false };
    let banner_is = |word: &str| {
        !banner.is_empty()
            && banner
                .iter()
                .all(|cell| cell.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(word)))
    };
    if !banner_is("across") && !banner_is("down") {
        return false;
    }

    let two_columns = (0..grid.n_rows()).all(|r| grid.row(r).is_some_and(|row| row.len() == 2));
    if !two_columns {
        return false;
    }

    let body_rows = grid.n_rows() - 1;
    let numbers: Vec<&str> = grid
        .column_values(0)
        .into_iter()
        .filter(|(r, _)| *r >= 1)
        .map(|(_, s)| s)
        .collect();
    let all_numeric = numbers
        .iter()
        .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()));
    let half_blank = 2 * (body_rows - numbers.len()) == body_rows;
    let answers_ok = (2..grid.n_rows())
        .step_by(2)
        .all(|r| grid.cell(r, 1).is_some_and(|s| s.starts_with(|c: char| c.is_ascii_uppercase())));

    all_numeric && numbers.len() >= tuning::TABLE_5_MIN_CLUES && half_blank && answers_ok
}

pub fn parse_table_type_5(doc: &Document) -> Result<ClueTable, ShapeError> {
    let mut rows = Vec::new();
    for (grid, el) in Grid::all_in(&doc.html) {
        if !grid_is_table_type_5(&grid) {
            continue;
        }
        rows.extend(parse_one_table_type_5(&grid, el)?);
    }
    if rows.is_empty() {
        return Err(ExtractError::new("no table-type-5 grids parsed").into());
    }
    Ok(drop_implausible_answers(rows, tuning::ANSWER_MAX_LEN))
}

fn parse_one_table_type_5(
    grid: &Grid,
    el: ElementRef<'_>,
) -> Result<ClueTable, ShapeError> {
    let direction = if grid
        .cell(0, 0)
        .is_some_and(|s| s.eq_ignore_ascii_case("across"))
    {
        "a"
    } else {
        "d"
    };

    let numbers: Vec<String> = grid
        .column_values(0)
        .into_iter()
        .filter(|(r, _)| *r >= 1)
        .map(|(_, s)| s.trim().to_string())
        .collect();
    let clues: Vec<String> = (1..grid.n_rows())
        .step_by(2)
        .filter_map(|r| grid.cell(r, 1))
        .map(str::to_string)
        .collect();
    let splits: Vec<(String, String)> = (2..grid.n_rows())
        .step_by(2)
        .filter_map(|r| grid.cell(r, 1))
        .map(|s| {
            util::split_answer_annotation(s, tuning::ANSWER_MAX_LEN)
                .ok_or_else(|| ExtractError::new("answer row did not split"))
        })
        .collect::<Result<_, _>>()?;

    if numbers.len() != clues.len() || clues.len() != splits.len() {
        return Err(ExtractError::new("clue/answer rows out of step").into());
    }

    // Definitions live inside this table only.
    let fragments = dom::suspected_definition_texts(el, &[&UNDERLINE_SPAN]);
    let definitions = align_suspected_definitions(&clues, &fragments)?;

    Ok(numbers
        .into_iter()
        .zip(clues)
        .zip(splits)
        .zip(definitions)
        .map(|(((number, clue), (answer, annotation)), definition)| {
            ClueRecord::bare(
                format!("{}{}", number, direction),
                clue,
                answer,
                definition,
                Some(annotation),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(html, "https://www.fifteensquared.net/2021/05/20/test/")
    }

    fn table_type_1_page() -> String {
        // Two-row-per-clue layout: 3 across, 2 down.
        let mut rows = String::new();
        rows.push_str("<tr><td>ACROSS</td><td>ACROSS</td><td>ACROSS</td></tr>");
        let across = [
            ("1", "ORGANIST", "Key worker possibly having to <span style=\"text-decoration: underline\">pedal</span> (8)", "Cryptic definition"),
            ("2", "MEASLY", "Paltry bite to eat snaffled with cunning (6)", "MEA(l) with SLY"),
            ("3", "ADIOS", "Spanish Cheers run dropped from broadcasts (5)", "R dropped from (r)ADIOS"),
        ];
        for (n, a, c, ann) in across {
            rows.push_str(&format!(
                "<tr><td>{n}</td><td>{a}</td><td>{c}</td></tr><tr><td></td><td></td><td>{ann}</td></tr>"
            ));
        }
        rows.push_str("<tr><td>DOWN</td><td>DOWN</td><td>DOWN</td></tr>");
        let down = [
            ("1", "REPROBATE", "Record loot hoarded by rank villain (9)", "EP + ROB in RATE"),
            ("2", "SHUN", "Avoid newspaper offered around hotel (4)", "SUN round H"),
        ];
        for (n, a, c, ann) in down {
            rows.push_str(&format!(
                "<tr><td>{n}</td><td>{a}</td><td>{c}</td></tr><tr><td></td><td></td><td>{ann}</td></tr>"
            ));
        }
        format!("<html><body><table>{rows}</table></body></html>")
    }

    #[test]
    fn table_type_1_round_trip() {
        let page = table_type_1_page();
        let d = doc(&page);
        assert!(is_table_type_1(&d));

        let rows = parse_table_type_1(&d).unwrap();
        assert_eq!(rows.len(), 5);
        let numbers: Vec<&str> = rows.iter().map(|r| r.clue_number.as_str()).collect();
        assert_eq!(numbers, vec!["1a", "2a", "3a", "1d", "2d"]);
        assert_eq!(rows[0].answer, "ORGANIST");
        assert_eq!(rows[4].answer, "SHUN");
        assert_eq!(rows[0].definition.as_deref(), Some("pedal"));
        assert!(rows[0].clue.to_lowercase().contains("pedal"));
        assert_eq!(rows[1].annotation.as_deref(), Some("MEA(l) with SLY"));
    }

    #[test]
    fn table_type_1_rejects_plain_table() {
        let d = doc("<table><tr><td>1</td><td>two</td><td>three</td></tr></table>");
        assert!(!is_table_type_1(&d));
    }

    #[test]
    fn table_type_2_splits_clue_and_annotation() {
        let html = "<html><body><table>
            <tr><td>Across</td><td>Across</td><td>Across</td></tr>
            <tr><td>8</td><td>TWENTIES</td><td>They roared maybe (8)Reference to the Roaring Twenties</td></tr>
            <tr><td>9</td><td>UNDO</td><td>Found out concealing reversal (4)Hidden in foUND Out</td></tr>
            <tr><td>Down</td><td>Down</td><td>Down</td></tr>
            <tr><td>2</td><td>SPIN</td><td>Turn in pins, awkwardly (4)Anagram of PINS</td></tr>
            </table></body></html>";
        let d = doc(html);
        assert!(is_table_type_2(&d));
        let rows = parse_table_type_2(&d).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].clue_number, "8a");
        assert_eq!(rows[0].clue, "They roared maybe (8)");
        assert_eq!(rows[0].annotation.as_deref(), Some("Reference to the Roaring Twenties"));
        assert_eq!(rows[2].clue_number, "2d");
    }

    #[test]
    fn table_type_3_reads_direction_from_numbers() {
        let html = "<html><body><table>
            <tr><td>Across</td><td>Across</td><td>Across</td><td>Across</td></tr>
            <tr><td>Clue No</td><td>Solution</td><td>Clue</td><td>Definition</td></tr>
            <tr><td>1A</td><td>SUBWAY</td><td>Undermining Boris somehow with a yes vote (6)</td><td>Undermining / S(UBW)AY</td></tr>
            <tr><td>Down</td><td>Down</td><td>Down</td><td>Down</td></tr>
            <tr><td>Clue No</td><td>Solution</td><td>Clue</td><td>Definition</td></tr>
            <tr><td>1D</td><td>SAMPLE</td><td>Donor's semi-detached and broad (6)</td><td>S + AMPLE</td></tr>
            </table></body></html>";
        let d = doc(html);
        assert!(is_table_type_3(&d));
        let rows = parse_table_type_3(&d).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].definition.as_deref(), Some("Undermining"));
        assert_eq!(rows[0].annotation.as_deref(), Some("S(UBW)AY"));
        // No " / " separator: everything is annotation.
        assert_eq!(rows[1].clue_number, "1d");
        assert_eq!(rows[1].definition, None);
        assert_eq!(rows[1].annotation.as_deref(), Some("S + AMPLE"));
    }

    #[test]
    fn table_type_4_appends_entry_explanation() {
        let html = "<html><body><table>
            <tr><td>No</td><td>Clue</td><td>Wordplay</td><td>Entry</td></tr>
            <tr><td>Across</td><td></td><td></td><td></td></tr>
            <tr><td>1</td><td>Frantic, last-minute dash (4,6)</td><td>Anagram of SALT MINUTE</td><td>LAST MINUTE as in deadline</td></tr>
            <tr><td>Down</td><td></td><td></td><td></td></tr>
            <tr><td>1</td><td>Delayed start (4)</td><td>Anagram of TALE</td><td>LATE</td></tr>
            </table></body></html>";
        let d = doc(html);
        assert!(is_table_type_4(&d));
        let rows = parse_table_type_4(&d).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[0].answer, "LAST MINUTE");
        assert_eq!(
            rows[0].annotation.as_deref(),
            Some("Anagram of SALT MINUTE as in deadline")
        );
        assert_eq!(rows[1].clue_number, "1d");
        assert_eq!(rows[1].answer, "LATE");
    }

    fn table_type_5_table(direction: &str, start: usize) -> String {
        let mut rows = format!("<tr><td>{direction}</td><td>{direction}</td></tr>");
        for i in 0..10 {
            let n = start + i;
            rows.push_str(&format!(
                "<tr><td>{n}</td><td>Clue number {n} with <u>mark{n}</u> here (6)</td></tr>\
                 <tr><td></td><td>MOHAWK - wordplay for {n}</td></tr>"
            ));
        }
        format!("<table>{rows}</table>")
    }

    #[test]
    fn table_type_5_needs_two_tables() {
        let one = format!("<html><body>{}</body></html>", table_type_5_table("Across", 1));
        assert!(!is_table_type_5(&doc(&one)));

        let two = format!(
            "<html><body>{}{}</body></html>",
            table_type_5_table("Across", 1),
            table_type_5_table("Down", 1)
        );
        assert!(is_table_type_5(&doc(&two)));
    }

    #[test]
    fn table_type_5_parses_both_directions() {
        let page = format!(
            "<html><body>{}{}</body></html>",
            table_type_5_table("Across", 1),
            table_type_5_table("Down", 1)
        );
        let d = doc(&page);
        let rows = parse_table_type_5(&d).unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].clue_number, "1a");
        assert_eq!(rows[10].clue_number, "1d");
        assert_eq!(rows[0].answer, "MOHAWK");
        assert_eq!(rows[0].annotation.as_deref(), Some("wordplay for 1"));
        assert_eq!(rows[0].definition.as_deref(), Some("mark1"));
    }

    #[test]
    fn implausible_answers_are_dropped() {
        let rows = vec![
            ClueRecord::bare("1a", "clue (3)", "GOOD", None, None),
            ClueRecord::bare("2a", "clue (3)", "definitely not an answer at all", None, None),
        ];
        let kept = drop_implausible_answers(rows, tuning::ANSWER_MAX_LEN);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].answer, "GOOD");
    }
}
