use thiserror::Error;

/// An extractor's structural assumptions failed mid-parse. Recoverable: the
/// dispatcher treats it as "this shape produced no data" and moves on to the
/// next candidate.
#[derive(Debug, Error)]
#[error("extraction failed: {0}")]
pub struct ExtractError(pub String);

impl ExtractError {
    pub fn new(msg: impl Into<String>) -> Self {
        ExtractError(msg.into())
    }
}

/// The definition aligner violated its own contract. This is a defect in
/// extractor or aligner logic, not an expected "doesn't match" condition, so
/// it propagates instead of being swallowed.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("produced {produced} definitions for {clues} clues")]
    TooManyDefinitions { produced: usize, clues: usize },
    #[error("definition {definition:?} is not a substring of clue {clue:?}")]
    DefinitionMismatch { definition: String, clue: String },
}

/// What a single shape extractor can fail with. `Extract` is consumed by the
/// dispatcher; `Align` passes straight through to the caller.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Align(#[from] AlignError),
}
