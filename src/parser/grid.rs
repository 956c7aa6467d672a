//! Lowers HTML `<table>` elements into a plain cell matrix so the table-shape
//! classifiers can run statistical checks without touching the DOM again.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::dom;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());

// Runaway colspans on hand-authored pages; anything wider is garbage.
const MAX_COLSPAN: usize = 20;

/// One `<table>`, cell text trimmed, empty cells as `None`. Cells spanning
/// columns are repeated so divider rows ("ACROSS" across the full width)
/// compare uniformly.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<Option<String>>>,
}

impl Grid {
    pub fn from_table(table: ElementRef<'_>) -> Grid {
        let mut rows = Vec::new();
        for tr in table.select(&TR) {
            let mut row = Vec::new();
            for cell in tr.select(&CELL) {
                let text = dom::element_text(cell).trim().to_string();
                let value = if text.is_empty() { None } else { Some(text) };
                let span = cell
                    .value()
                    .attr("colspan")
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, MAX_COLSPAN);
                for _ in 0..span {
                    row.push(value.clone());
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        Grid { rows }
    }

    /// Every `<table>` in the document, paired with its element so extractors
    /// can scope definition harvesting to the right table.
    pub fn all_in<'a>(doc: &'a Html) -> Vec<(Grid, ElementRef<'a>)> {
        doc.select(&TABLE)
            .map(|el| (Grid::from_table(el), el))
            .collect()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, r: usize) -> Option<&[Option<String>]> {
        self.rows.get(r).map(Vec::as_slice)
    }

    pub fn cell(&self, r: usize, c: usize) -> Option<&str> {
        self.rows.get(r)?.get(c)?.as_deref()
    }

    /// Column `c` over all rows; rows too short contribute `None`.
    pub fn column(&self, c: usize) -> Vec<Option<&str>> {
        self.rows
            .iter()
            .map(|row| row.get(c).and_then(Option::as_deref))
            .collect()
    }

    /// Index of the first row whose every cell equals `word`
    /// (case-insensitive). Rows must be non-empty to qualify.
    pub fn divider_row(&self, word: &str) -> Option<usize> {
        self.rows.iter().position(|row| {
            !row.is_empty()
                && row
                    .iter()
                    .all(|cell| cell.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(word)))
        })
    }

    /// Non-`None` values of column `c`, with their row indices.
    pub fn column_values(&self, c: usize) -> Vec<(usize, &str)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| Some((i, row.get(c)?.as_deref()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(html: &str) -> Grid {
        let doc = Html::parse_document(html);
        let el = doc.select(&TABLE).next().unwrap();
        Grid::from_table(el)
    }

    #[test]
    fn lowers_cells_and_blanks() {
        let g = grid("<table><tr><td>1</td><td>ORGANIST</td></tr><tr><td></td><td> </td></tr></table>");
        assert_eq!(g.n_rows(), 2);
        assert_eq!(g.cell(0, 0), Some("1"));
        assert_eq!(g.cell(0, 1), Some("ORGANIST"));
        assert_eq!(g.cell(1, 0), None);
        assert_eq!(g.cell(1, 1), None);
    }

    #[test]
    fn colspan_repeats_divider_cells() {
        let g = grid(r#"<table><tr><td colspan="3">ACROSS</td></tr><tr><td>1</td><td>A</td><td>b</td></tr></table>"#);
        assert_eq!(g.divider_row("across"), Some(0));
        assert_eq!(g.row(0).unwrap().len(), 3);
    }

    #[test]
    fn divider_requires_every_cell() {
        let g = grid("<table><tr><td>ACROSS</td><td>1</td></tr></table>");
        assert_eq!(g.divider_row("across"), None);
    }

    #[test]
    fn column_handles_ragged_rows() {
        let g = grid("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>");
        assert_eq!(g.column(1), vec![Some("b"), None]);
    }
}
