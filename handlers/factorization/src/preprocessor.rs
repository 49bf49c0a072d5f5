// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{
    error::ErrorKind,
    index_map::{column_ids, IndexMap},
};
use anyhow::Error;
use engine::Interactions;
use handler::{error::ErrorKind as HandlerError, Frame, Value};

/// Interactions ready to be fitted plus the maps to translate back to ids.
#[derive(Debug, Clone)]
pub struct PreprocessedData {
    pub interactions: Interactions,
    pub idx_user_map: IndexMap,
    pub idx_item_map: IndexMap,
}

impl PreprocessedData {
    pub fn n_users_items(&self) -> (usize, usize) {
        (self.idx_user_map.len(), self.idx_item_map.len())
    }
}

pub struct RecommenderPreprocessor<'a> {
    user_id: &'a str,
    item_id: &'a str,
    rating_column: &'a str,
    threshold: Option<f64>,
}

impl<'a> RecommenderPreprocessor<'a> {
    pub fn new(user_id: &'a str, item_id: &'a str) -> Self {
        Self {
            user_id,
            item_id,
            rating_column: "rating",
            threshold: None,
        }
    }

    pub fn rating_column(mut self, rating_column: &'a str) -> Self {
        self.rating_column = rating_column;
        self
    }

    /// Ratings strictly above `threshold` become positives, the rest negatives
    pub fn threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }

    fn weights(&self, df: &Frame) -> Result<Vec<f32>, Error> {
        let threshold = match self.threshold {
            Some(threshold) => threshold,
            None => return Ok(vec![1.0; df.len()]),
        };

        df.column(self.rating_column)?
            .iter()
            .map(|rating| match rating {
                Value::Null => Ok(-1.0),
                rating => {
                    let rating = rating
                        .to_f64()
                        .map_err(|_| HandlerError::ValueConvert(format!("rating '{}'", rating)))?;

                    Ok(if rating > threshold { 1.0 } else { -1.0 })
                }
            })
            .collect()
    }

    pub fn process(&self, df: &Frame) -> Result<PreprocessedData, Error> {
        let user_ids = column_ids(df, self.user_id)?;
        let item_ids = column_ids(df, self.item_id)?;
        let weights = self.weights(df)?;

        let idx_user_map = IndexMap::from_ids(user_ids.iter().cloned());
        let idx_item_map = IndexMap::from_ids(item_ids.iter().cloned());

        let mut interactions = Interactions::new(idx_user_map.len(), idx_item_map.len());
        for ((user_id, item_id), weight) in user_ids.iter().zip(&item_ids).zip(weights) {
            if let (Some(user_idx), Some(item_idx)) =
                (idx_user_map.idx(user_id), idx_item_map.idx(item_id))
            {
                interactions.push(user_idx, item_idx, weight)?;
            }
        }

        if interactions.num_positives() == 0 {
            return Err(ErrorKind::EmptyInteractions.into());
        }

        log::info!(
            "Preprocessed {} interactions ({} positives) for {} users and {} items",
            interactions.len(),
            interactions.num_positives(),
            idx_user_map.len(),
            idx_item_map.len()
        );

        Ok(PreprocessedData {
            interactions,
            idx_user_map,
            idx_item_map,
        })
    }
}
