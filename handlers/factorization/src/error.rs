// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use thiserror::Error as DError;

#[derive(Debug, Clone, DError, PartialEq)]
pub enum ErrorKind {
    #[error("recommendation_type must be either 'user_item', 'item_item' or 'user_user', got '{0}'")]
    InvalidRecommendationType(String),

    #[error("Couldn't find {0}({1}) in the trained model")]
    UnknownId(String, String),

    #[error("Ids must be integers or strings, got '{0}'")]
    InvalidId(String),

    #[error("No positive interactions left after preprocessing")]
    EmptyInteractions,
}
