use thiserror::Error as DError;

#[derive(Debug, Clone, DError, PartialEq)]
pub enum ErrorKind {
    #[error("Model must be fitted first")]
    NotFitted,

    #[error("Empty interactions, nothing to fit")]
    EmptyInteractions,

    #[error("Indices out of bounds")]
    IndexOutOfBound,

    #[error("Expected {0} item indices to match {1} user indices")]
    LengthMismatch(usize, usize),

    #[error("Interactions shape ({0}, {1}) doesn't match fitted model ({2}, {3})")]
    ShapeMismatch(usize, usize, usize, usize),

    #[error("Unknown loss '{0}', expected one of 'logistic', 'bpr', 'warp' or 'warp-kos'")]
    UnknownLoss(String),

    #[error("Invalid hyperparameter: {0}")]
    InvalidHyperparameter(&'static str),

    #[error("Inconsistent model parameters: {0}")]
    InconsistentModel(&'static str),
}
