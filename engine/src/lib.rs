// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of engine.
//
// engine is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// engine is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with engine.  If not, see <http://www.gnu.org/licenses/>.

pub mod distances;
pub mod error;
pub mod interactions;
pub mod knn;
pub mod loss;
pub mod model;

use anyhow::Error;
use distances::cosine_similarity;
use error::ErrorKind;
use knn::{Scored, TopK};

pub use interactions::{Interaction, Interactions};
pub use loss::Loss;
pub use model::{Embeddings, FactorizationModel, Hyperparameters};

/// Numeric recommender working on dense user and item indices.
pub trait Recommender {
    /// Number of users the model was fitted on, `None` until fitted
    fn num_users(&self) -> Option<usize>;

    /// Number of items the model was fitted on, `None` until fitted
    fn num_items(&self) -> Option<usize>;

    /// Fit the model for `num_epochs`, returns the loss of the last epoch
    fn fit(&mut self, interactions: &Interactions, num_epochs: usize) -> Result<f32, Error>;

    /// Score every `(user_idxs[i], item_idxs[i])` pair
    fn predict(&self, user_idxs: &[usize], item_idxs: &[usize]) -> Result<Vec<f32>, Error>;

    /// Learned item biases and embeddings
    fn item_representations(&self) -> Result<(&[f32], &Embeddings), Error>;

    /// Best `n` items out of `item_idxs` for the user, best first
    fn recommend(&self, user_idx: usize, item_idxs: &[usize], n: usize) -> Result<Vec<Scored>, Error> {
        let user_idxs = vec![user_idx; item_idxs.len()];
        let scores = self.predict(&user_idxs, item_idxs)?;

        let mut top = TopK::new(n);
        top.extend(item_idxs.iter().cloned().zip(scores));

        Ok(top.into_vec())
    }

    /// The `n` items whose embeddings are closest (by cosine similarity) to
    /// the embedding of `item_idx`, without the item itself
    fn similar_items(&self, item_idx: usize, n: usize) -> Result<Vec<Scored>, Error> {
        let (_, embeddings) = self.item_representations()?;

        if item_idx >= embeddings.rows() {
            return Err(ErrorKind::IndexOutOfBound.into());
        }

        let target = embeddings.row(item_idx);
        let mut top = TopK::new(n);

        for other_idx in (0..embeddings.rows()).filter(|&idx| idx != item_idx) {
            if let Some(similarity) = cosine_similarity(target, embeddings.row(other_idx)) {
                top.push(other_idx, similarity);
            }
        }

        Ok(top.into_vec())
    }
}
