//! Maps decoded .puz crossword files onto clue tables. Binary decoding is a
//! solved problem elsewhere; this module takes the decoded structure (solution
//! grid, numbering) and walks the grid to recover each answer.

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::record::{ClueRecord, ClueTable};

#[derive(Debug, Deserialize)]
pub struct PuzPuzzle {
    #[serde(default)]
    pub title: Option<String>,
    pub width: usize,
    /// Row-major solution grid, `.` for black squares.
    pub solution: String,
    pub across: Vec<PuzClue>,
    pub down: Vec<PuzClue>,
}

#[derive(Debug, Deserialize)]
pub struct PuzClue {
    pub num: u32,
    /// Index of the first cell in the row-major grid.
    pub cell: usize,
    /// Answer length in cells.
    pub len: usize,
    pub clue: String,
}

impl PuzPuzzle {
    /// Answer for one entry: step 1 for across, a full row width for down.
    fn answer(&self, clue: &PuzClue, stride: usize) -> Result<String> {
        let grid: Vec<char> = self.solution.chars().collect();
        let mut answer = String::with_capacity(clue.len);
        for i in 0..clue.len {
            let index = clue.cell + i * stride;
            match grid.get(index) {
                Some('.') | None => {
                    bail!("clue {} runs off the grid at cell {}", clue.num, index)
                }
                Some(c) => answer.push(*c),
            }
        }
        Ok(answer)
    }

    pub fn to_clue_table(&self, source: &str, source_url: &str) -> Result<ClueTable> {
        if self.width == 0 || self.solution.len() % self.width != 0 {
            bail!("solution grid of {} cells is not a multiple of width {}", self.solution.len(), self.width);
        }

        let entries = self
            .across
            .iter()
            .map(|clue| (clue, "a", 1))
            .chain(self.down.iter().map(|clue| (clue, "d", self.width)));

        let mut rows = Vec::with_capacity(self.across.len() + self.down.len());
        for (clue, direction, stride) in entries {
            rows.push(ClueRecord {
                clue_number: format!("{}{}", clue.num, direction),
                clue: clue.clue.clone(),
                answer: self.answer(clue, stride)?,
                definition: None,
                annotation: None,
                puzzle_name: self.title.clone(),
                puzzle_date: None,
                puzzle_url: None,
                source_url: source_url.to_string(),
                source: source.to_string(),
            });
        }
        Ok(rows)
    }
}
