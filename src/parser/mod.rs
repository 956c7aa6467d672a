pub mod align;
pub mod dom;
pub mod grid;
pub mod lists;
pub mod metadata;
pub mod specials;
pub mod tables;
pub mod text;
pub mod tuning;
pub mod util;

use scraper::Html;
use tracing::debug;

use crate::error::{AlignError, ShapeError};
use crate::record::ClueTable;

/// A blog page under classification: the parsed DOM plus where it came from.
pub struct Document {
    pub html: Html,
    pub source_url: String,
}

impl Document {
    pub fn parse(html: &str, source_url: &str) -> Document {
        Document {
            html: Html::parse_document(html),
            source_url: source_url.to_string(),
        }
    }
}

/// One recognizable page layout: a cheap structural test plus the extractor
/// that only runs when the test passes.
struct Shape {
    name: &'static str,
    classify: fn(&Document) -> bool,
    extract: fn(&Document) -> Result<ClueTable, ShapeError>,
}

/// Candidate shapes, most specific first: table layouts, then the structured
/// lists, then the free-text fallbacks. The flat block list goes last since
/// almost anything line-shaped can look like it.
static SHAPES: &[Shape] = &[
    Shape { name: "table-type-1", classify: tables::is_table_type_1, extract: tables::parse_table_type_1 },
    Shape { name: "table-type-2", classify: tables::is_table_type_2, extract: tables::parse_table_type_2 },
    Shape { name: "table-type-3", classify: tables::is_table_type_3, extract: tables::parse_table_type_3 },
    Shape { name: "table-type-4", classify: tables::is_table_type_4, extract: tables::parse_table_type_4 },
    Shape { name: "table-type-5", classify: tables::is_table_type_5, extract: tables::parse_table_type_5 },
    Shape { name: "list-type-1", classify: lists::is_list_type_1, extract: lists::parse_list_type_1 },
    Shape { name: "list-type-2", classify: lists::is_list_type_2, extract: lists::parse_list_type_2 },
    Shape { name: "list-type-3", classify: lists::is_list_type_3, extract: lists::parse_list_type_3 },
    Shape { name: "special-type-1", classify: specials::is_special_type_1, extract: specials::parse_special_type_1 },
    Shape { name: "text-type-1", classify: text::is_text_type_1, extract: text::parse_text_type_1 },
    Shape { name: "text-type-2", classify: text::is_text_type_2, extract: text::parse_text_type_2 },
    Shape { name: "list-type-4", classify: lists::is_list_type_4, extract: lists::parse_list_type_4 },
];

/// Run the page through each shape in turn. `Ok(None)` means no shape
/// recognized it; a failed extraction of one shape just moves on to the next.
/// Aligner contract violations abort the page, since continuing would mean
/// attaching definitions to the wrong clues.
pub fn try_parse(html: &str, source_url: &str) -> Result<Option<ClueTable>, AlignError> {
    let doc = Document::parse(html, source_url);

    for shape in SHAPES {
        if !(shape.classify)(&doc) {
            continue;
        }
        match (shape.extract)(&doc) {
            Ok(rows) if rows.is_empty() => {
                debug!(shape = shape.name, url = source_url, "shape matched but yielded no rows");
            }
            Ok(mut rows) => {
                debug!(shape = shape.name, url = source_url, rows = rows.len(), "parsed");
                postprocess(&mut rows, &doc);
                return Ok(Some(rows));
            }
            Err(ShapeError::Extract(err)) => {
                debug!(shape = shape.name, url = source_url, %err, "extraction failed");
            }
            Err(ShapeError::Align(err)) => return Err(err),
        }
    }
    Ok(None)
}

/// Field trimming plus page-level metadata, applied once whichever shape won.
/// Rows whose clue number never picked up a direction suffix (no divider
/// preceded them) are dropped here, so `Na`/`Nd` numbering holds at the
/// output boundary.
fn postprocess(rows: &mut ClueTable, doc: &Document) {
    let puzzle_name = metadata::resolve(metadata::PUZZLE_NAMES, &doc.source_url, &doc.html);
    let puzzle_date = metadata::resolve(metadata::PUZZLE_DATES, &doc.source_url, &doc.html);
    let puzzle_url = metadata::resolve(metadata::PUZZLE_URLS, &doc.source_url, &doc.html);
    let source = metadata::source_of(&doc.source_url).unwrap_or("unknown");

    let trim_opt = |field: &mut Option<String>| {
        if let Some(value) = field.take() {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                *field = Some(trimmed.to_string());
            }
        }
    };

    for row in rows.iter_mut() {
        row.clue = row.clue.trim().to_string();
        row.answer = row.answer.trim().to_string();
        // Stray periods from "1." style numbering.
        row.clue_number = util::delete_chars(row.clue_number.trim(), &['.']);
        trim_opt(&mut row.definition);
        trim_opt(&mut row.annotation);
        row.puzzle_name = puzzle_name.clone();
        row.puzzle_date = puzzle_date.clone();
        row.puzzle_url = puzzle_url.clone();
        row.source_url = doc.source_url.clone();
        row.source = source.to_string();
    }

    rows.retain(|row| {
        util::CLUE_NUMBER.is_match(&row.clue_number) && row.clue_number.ends_with(['a', 'd'])
    });
}
