use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::Range;

#[derive(Debug, Error)]
pub enum XyError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected two numbers, got '{content}'")]
    Format { line: usize, content: String },

    #[error("no data read; expected lines of the form '<x> <y>'")]
    Empty,

    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("x = {x} is outside the sampled range {range}")]
    OutOfRange { x: f64, range: Range },

    #[error("need at least {needed} samples, have {found}")]
    InsufficientSamples { needed: usize, found: usize },

    #[error("all x values are equal, the fit is undefined")]
    DegenerateFit,

    #[error("x values must be strictly increasing (index {index})")]
    Unsorted { index: usize },

    #[error("triggered average: {0}")]
    Trigger(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl XyError {
    /// Whether this is a per-query domain failure that callers may report
    /// and move past.
    pub fn is_range_error(&self) -> bool {
        matches!(self, XyError::OutOfRange { .. })
    }
}

pub type XyResult<T> = Result<T, XyError>;
