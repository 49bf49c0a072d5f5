// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use thiserror::Error as DError;

#[derive(Debug, Clone, DError, PartialEq)]
pub enum ErrorKind {
    #[error("{0}")]
    NotImplemented(String),

    #[error("Couldn't find column '{0}'")]
    MissingColumn(String),

    #[error("Couldn't find '{0}' in the model storage")]
    MissingKey(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Invalid value for argument '{0}': {1}")]
    InvalidArgument(String, String),

    #[error("Failed to cast to some value ({0})")]
    ValueConvert(String),

    #[error("Couldn't cast value to {0}")]
    CastingValue(&'static str),

    #[error("Expected a row with {0} values, got {1}")]
    RowLength(usize, usize),
}
