//! The unit of output: one row per clue, plus page-level metadata attached by
//! the postprocessor.

/// A single extracted clue.
///
/// `clue_number` is a positive integer with an `a`/`d` direction suffix
/// ("12a", "3d"). `definition`, when present, is a case-insensitive substring
/// of `clue` (multi-part definitions are joined with `/`, and each part is
/// individually a substring).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClueRecord {
    pub clue_number: String,
    pub clue: String,
    pub answer: String,
    pub definition: Option<String>,
    pub annotation: Option<String>,
    pub puzzle_name: Option<String>,
    pub puzzle_date: Option<String>,
    pub puzzle_url: Option<String>,
    pub source_url: String,
    pub source: String,
}

pub type ClueTable = Vec<ClueRecord>;

impl ClueRecord {
    /// Bare row as extractors produce it, before postprocessing.
    pub fn bare(
        clue_number: impl Into<String>,
        clue: impl Into<String>,
        answer: impl Into<String>,
        definition: Option<String>,
        annotation: Option<String>,
    ) -> Self {
        ClueRecord {
            clue_number: clue_number.into(),
            clue: clue.into(),
            answer: answer.into(),
            definition,
            annotation,
            ..Default::default()
        }
    }
}
