use chrono::NaiveDate;
use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised by the probability-tree core.
///
/// `InsufficientQuotes` and `InvalidStep` are both "not enough data to build a
/// tree" conditions; the others reject malformed quote sequences.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Fewer than two quotes (the base date plus at least one decision date).
    #[error("Insufficient data: need at least 2 rate quotes, got {provided}")]
    InsufficientQuotes { provided: usize },

    /// Step size must be finite and strictly positive.
    #[error("Insufficient data: step size must be > 0, got {step}")]
    InvalidStep { step: f64 },

    /// Quote dates must be strictly increasing.
    #[error("Non-monotonic dates: quote {index} ({current}) does not follow {previous}")]
    NonMonotonicDate {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Non-finite implied rate at quote {index}")]
    NonFiniteRate { index: usize },

    /// The priced move at a quote is too many steps to place on the lattice.
    #[error("Step count out of range at quote {index}: {magnitude} steps")]
    StepCountOutOfRange { index: usize, magnitude: f64 },

    /// A cumulative lattice offset left the `i64` range.
    #[error("Rate level overflow at {date}")]
    LevelOverflow { date: NaiveDate },
}

impl From<TreeError> for AppError {
    fn from(err: TreeError) -> Self {
        AppError::new(2, err.to_string())
    }
}
