use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all factload operations.
///
/// Low-level failures (I/O, Arrow, Parquet) convert into this enum through
/// `From` impls so they propagate with `?`. The writer stage folds every fatal
/// failure into [`Error::DataLoading`] before returning to its caller, which is
/// the only variant a pipeline driver needs to match on.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while creating store directories or fragment files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error while building the in-memory columns of a fragment.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while encoding, flushing or closing a fragment.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Malformed JSON load configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid API parameter or row shape.
    ///
    /// Raised when a row does not carry enough measures for the configured
    /// layout, or an output row has the wrong arity for a writer.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// The load configuration is inconsistent or incomplete.
    ///
    /// Detected before any directory is created or writer constructed.
    #[error("invalid load configuration: {0}")]
    Configuration(String),

    /// Surrogate indices could not be packed into a multi-dimensional key.
    ///
    /// Wrong arity or a value that does not fit its dimension's bit width.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// A fact writer rejected an operation.
    #[error("fact writer error: {0}")]
    FactWriter(String),

    /// Internal error indicating a bug or unexpected state, such as an illegal
    /// writer lifecycle transition.
    #[error("An internal operation failed: {0}")]
    Internal(String),

    /// Fatal load failure surfaced by the writer stage.
    ///
    /// Every error that aborts a stage invocation is wrapped into this variant
    /// together with the table name, so callers see one uniform failure kind.
    #[error("data loading failed for table '{table}': {message}")]
    DataLoading { table: String, message: String },
}

impl Error {
    /// Wrap any displayable cause into a [`Error::DataLoading`] for `table`.
    ///
    /// An error that is already a `DataLoading` is returned unchanged so the
    /// message is not nested twice when several layers wrap it.
    ///
    /// # Examples
    ///
    /// ```
    /// use factload_result::Error;
    ///
    /// let err = Error::data_loading("sales", Error::KeyGeneration("too wide".into()));
    /// assert_eq!(
    ///     err.to_string(),
    ///     "data loading failed for table 'sales': key generation failed: too wide"
    /// );
    /// ```
    pub fn data_loading(table: impl Into<String>, cause: Error) -> Self {
        match cause {
            already @ Error::DataLoading { .. } => already,
            other => Error::DataLoading {
                table: table.into(),
                message: other.to_string(),
            },
        }
    }

    /// Describe a failure to release a fact writer's resources.
    #[inline]
    pub fn writer_close<U: fmt::Display, E: fmt::Display>(unit: U, cause: E) -> Self {
        Error::FactWriter(format!(
            "unexpected error while closing data handler for {unit}: {cause}"
        ))
    }

    /// Returns true for the uniform stage failure.
    pub fn is_data_loading(&self) -> bool {
        matches!(self, Error::DataLoading { .. })
    }
}
