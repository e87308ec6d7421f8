//! Error types for the linear SVM trainer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Unknown optimizer '{0}': expected 'lbfgs' or 'psgd'")]
    UnknownOptimizer(String),

    #[error("Optimizer '{0}' is unavailable: this build has no parallel execution backend")]
    UnsupportedOptimizer(String),

    #[error("Optimization failed: {0}")]
    OptimizationError(String),

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid label {label}: labels must lie in [0, {num_classes})")]
    InvalidLabel { label: usize, num_classes: usize },

    #[error(
        "Test data dimensionality ({actual}) must be the same as the dimensionality of the training data ({expected})"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{context} has {points} points, but {labels} labels were given")]
    LabelCountMismatch {
        context: &'static str,
        points: usize,
        labels: usize,
    },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SVMError {
    /// True for errors detected from option values alone, before any data
    /// has been loaded.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SVMError::InvalidParameter(_)
                | SVMError::MissingInput(_)
                | SVMError::UnknownOptimizer(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SVMError>;
