//! Empirically tuned thresholds for the shape classifiers.
//!
//! These bands were arrived at by eyeballing the historical corpus, not by any
//! principled derivation. Changing them silently reclassifies old pages, so
//! they live here as named constants instead of inline literals.

/// table-type-1: count of third-column cells ending in an enumeration should
/// land within this distance of half the clue rows.
pub const TABLE_1_ENUMERATION_TOLERANCE: i64 = 4;

/// table-type-3 / table-type-4: count of clue cells ending in an enumeration
/// should land within this distance of the full row count.
pub const TABLE_3_ENUMERATION_TOLERANCE: i64 = 5;
pub const TABLE_4_ENUMERATION_TOLERANCE: i64 = 5;

/// table-type-5: two-column alternating tables need at least this many clues,
/// and at least this many matching tables per page.
pub const TABLE_5_MIN_CLUES: usize = 10;
pub const TABLE_5_MIN_TABLES: usize = 2;

/// list-type-1: fraction of paragraphs that must carry both a span and a
/// strong tag.
pub const LIST_1_PARAGRAPH_PROPORTION: f64 = 0.65;

/// list-type-2: three divs per clue, 32 clues per puzzle, give or take.
pub const LIST_2_EXPECTED_DIVS: usize = 32 * 3;
pub const LIST_2_DIV_TOLERANCE: usize = 20;

/// list-type-3: two paragraphs per clue, 32 clues per puzzle, give or take.
pub const LIST_3_EXPECTED_PARAGRAPHS: usize = 32 * 2;
pub const LIST_3_PARAGRAPH_TOLERANCE: usize = 10;

/// list-type-4: flat block runs need at least this many clue-number blocks
/// and uppercase answer blocks.
pub const LIST_4_MIN_CLUE_BLOCKS: usize = 20;

/// text-type-1: minimum counts of underlined spans, "ANSWER - annotation"
/// lines and "12a clue (6)" lines.
pub const TEXT_1_MIN_UNDERLINES: usize = 20;
pub const TEXT_1_MIN_ANSWER_LINES: usize = 20;
pub const TEXT_1_MIN_CLUE_LINES: usize = 20;

/// text-type-2: clue-line floor and the expected count of bolded entries
/// (one definition + one answer per clue, 32 clues).
pub const TEXT_2_MIN_CLUE_LINES: usize = 20;
pub const TEXT_2_EXPECTED_BOLDS: usize = 64;
pub const TEXT_2_BOLD_TOLERANCE: usize = 10;

/// special-type-1: per-clue tables, answer/annotation lines, and how many of
/// the blog's signature phrases must appear.
pub const SPECIAL_1_MIN_TABLES: usize = 30;
pub const SPECIAL_1_MIN_LINES: usize = 100;
pub const SPECIAL_1_MIN_PHRASES: usize = 3;

/// Common answer validation: tolerated count of non-uppercase characters
/// (inline wordplay like "M(E)ETS"), and the default plausible length cap.
pub const ANSWER_LOWERCASE_DEFICIT: usize = 5;
pub const ANSWER_MAX_LEN: usize = 25;
