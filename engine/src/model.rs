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

use crate::{
    distances::dot,
    error::ErrorKind,
    interactions::{Interactions, UserPositives},
    loss::Loss,
    Recommender,
};
use anyhow::Error;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Dense row-major matrix, one row per user or item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embeddings {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl Embeddings {
    fn filled(rows: usize, dim: usize, value: f32) -> Self {
        Self {
            rows,
            dim,
            data: vec![value; rows * dim],
        }
    }

    fn random<R: Rng>(rows: usize, dim: usize, rng: &mut R) -> Self {
        let data = (0..rows * dim)
            .map(|_| (rng.gen::<f32>() - 0.5) / dim as f32)
            .collect();

        Self { rows, dim, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn row(&self, idx: usize) -> &[f32] {
        &self.data[idx * self.dim..(idx + 1) * self.dim]
    }

    fn has_shape(&self, rows: usize, dim: usize) -> bool {
        self.rows == rows && self.dim == dim && self.data.len() == rows * dim
    }

    fn row_mut(&mut self, idx: usize) -> &mut [f32] {
        &mut self.data[idx * self.dim..(idx + 1) * self.dim]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    no_components: usize,
    learning_rate: f32,
    loss: Loss,
    max_sampled: usize,
    k: usize,
    n: usize,
    random_state: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            no_components: 10,
            learning_rate: 0.05,
            loss: Loss::default(),
            max_sampled: 10,
            k: 5,
            n: 10,
            random_state: 42,
        }
    }
}

impl Hyperparameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensionality of the latent embeddings.
    pub fn no_components(mut self, no_components: usize) -> Self {
        self.no_components = no_components;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }

    /// Maximum number of negatives sampled per positive by the WARP losses.
    pub fn max_sampled(mut self, max_sampled: usize) -> Self {
        self.max_sampled = max_sampled;
        self
    }

    /// Positives sampled per user (`k`) and the order statistic taken from
    /// them (`n`) by the k-OS WARP loss.
    pub fn kos(mut self, k: usize, n: usize) -> Self {
        self.k = k;
        self.n = n;
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn build(self) -> Result<FactorizationModel, Error> {
        if self.no_components == 0 {
            return Err(ErrorKind::InvalidHyperparameter("no_components must be positive").into());
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ErrorKind::InvalidHyperparameter("learning_rate must be positive").into());
        }

        if self.max_sampled == 0 || self.k == 0 || self.n == 0 {
            return Err(ErrorKind::InvalidHyperparameter(
                "max_sampled, k and n must be positive",
            )
            .into());
        }

        Ok(FactorizationModel::new(self))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModelData")]
struct ModelData {
    user_embeddings: Embeddings,
    item_embeddings: Embeddings,
    user_biases: Vec<f32>,
    item_biases: Vec<f32>,

    // Adagrad accumulators
    user_embedding_gradients: Embeddings,
    item_embedding_gradients: Embeddings,
    user_bias_gradients: Vec<f32>,
    item_bias_gradients: Vec<f32>,
}

// Same layout as `ModelData`, checked before use so indexing can't go out
// of bounds on a tampered blob.
#[derive(Deserialize)]
struct RawModelData {
    user_embeddings: Embeddings,
    item_embeddings: Embeddings,
    user_biases: Vec<f32>,
    item_biases: Vec<f32>,
    user_embedding_gradients: Embeddings,
    item_embedding_gradients: Embeddings,
    user_bias_gradients: Vec<f32>,
    item_bias_gradients: Vec<f32>,
}

impl TryFrom<RawModelData> for ModelData {
    type Error = ErrorKind;

    fn try_from(raw: RawModelData) -> Result<Self, Self::Error> {
        let model = ModelData {
            user_embeddings: raw.user_embeddings,
            item_embeddings: raw.item_embeddings,
            user_biases: raw.user_biases,
            item_biases: raw.item_biases,
            user_embedding_gradients: raw.user_embedding_gradients,
            item_embedding_gradients: raw.item_embedding_gradients,
            user_bias_gradients: raw.user_bias_gradients,
            item_bias_gradients: raw.item_bias_gradients,
        };

        model.check()?;
        Ok(model)
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[inline]
fn adagrad(param: &mut f32, accumulator: &mut f32, gradient: f32, learning_rate: f32) {
    *accumulator += gradient * gradient;
    *param -= learning_rate * gradient / accumulator.sqrt();
}

impl ModelData {
    fn build<R: Rng>(num_users: usize, num_items: usize, dim: usize, rng: &mut R) -> Self {
        Self {
            user_embeddings: Embeddings::random(num_users, dim, rng),
            item_embeddings: Embeddings::random(num_items, dim, rng),
            user_biases: vec![0.0; num_users],
            item_biases: vec![0.0; num_items],
            user_embedding_gradients: Embeddings::filled(num_users, dim, 1.0),
            item_embedding_gradients: Embeddings::filled(num_items, dim, 1.0),
            user_bias_gradients: vec![1.0; num_users],
            item_bias_gradients: vec![1.0; num_items],
        }
    }

    fn check(&self) -> Result<(), ErrorKind> {
        let (num_users, num_items) = (self.num_users(), self.num_items());
        let dim = self.user_embeddings.dim;

        if dim == 0 || self.item_embeddings.dim != dim {
            return Err(ErrorKind::InconsistentModel("embedding dimensions differ"));
        }

        let embeddings = [
            (&self.user_embeddings, num_users),
            (&self.user_embedding_gradients, num_users),
            (&self.item_embeddings, num_items),
            (&self.item_embedding_gradients, num_items),
        ];
        if !embeddings.iter().all(|(e, rows)| e.has_shape(*rows, dim)) {
            return Err(ErrorKind::InconsistentModel("embedding shapes don't match"));
        }

        let biases = [
            (&self.user_biases, num_users),
            (&self.user_bias_gradients, num_users),
            (&self.item_biases, num_items),
            (&self.item_bias_gradients, num_items),
        ];
        if !biases.iter().all(|(b, len)| b.len() == *len) {
            return Err(ErrorKind::InconsistentModel("bias lengths don't match"));
        }

        Ok(())
    }

    fn num_users(&self) -> usize {
        self.user_embeddings.rows()
    }

    fn num_items(&self) -> usize {
        self.item_embeddings.rows()
    }

    fn score(&self, user_idx: usize, item_idx: usize) -> f32 {
        dot(
            self.user_embeddings.row(user_idx),
            self.item_embeddings.row(item_idx),
        ) + self.user_biases[user_idx]
            + self.item_biases[item_idx]
    }

    /// Gradient step for a single (user, item) score, `scale` is the
    /// derivative of the loss with respect to that score.
    fn pointwise_step(&mut self, user_idx: usize, item_idx: usize, scale: f32, lr: f32) {
        let user_vec = self.user_embeddings.row(user_idx).to_vec();
        let item_vec = self.item_embeddings.row(item_idx).to_vec();

        {
            let params = self.user_embeddings.row_mut(user_idx);
            let accs = self.user_embedding_gradients.row_mut(user_idx);
            for ((p, acc), x) in params.iter_mut().zip(accs.iter_mut()).zip(&item_vec) {
                adagrad(p, acc, scale * x, lr);
            }
        }

        {
            let params = self.item_embeddings.row_mut(item_idx);
            let accs = self.item_embedding_gradients.row_mut(item_idx);
            for ((p, acc), x) in params.iter_mut().zip(accs.iter_mut()).zip(&user_vec) {
                adagrad(p, acc, scale * x, lr);
            }
        }

        adagrad(
            &mut self.user_biases[user_idx],
            &mut self.user_bias_gradients[user_idx],
            scale,
            lr,
        );
        adagrad(
            &mut self.item_biases[item_idx],
            &mut self.item_bias_gradients[item_idx],
            scale,
            lr,
        );
    }

    /// Gradient step pushing `positive` above `negative` for `user_idx`,
    /// `scale` is the loss weight of the violating pair.
    fn pairwise_step(
        &mut self,
        user_idx: usize,
        positive: usize,
        negative: usize,
        scale: f32,
        lr: f32,
    ) {
        let user_vec = self.user_embeddings.row(user_idx).to_vec();
        let positive_vec = self.item_embeddings.row(positive).to_vec();
        let negative_vec = self.item_embeddings.row(negative).to_vec();

        {
            let params = self.user_embeddings.row_mut(user_idx);
            let accs = self.user_embedding_gradients.row_mut(user_idx);
            for (((p, acc), pos), neg) in params
                .iter_mut()
                .zip(accs.iter_mut())
                .zip(&positive_vec)
                .zip(&negative_vec)
            {
                adagrad(p, acc, scale * (neg - pos), lr);
            }
        }

        for &(item_idx, sign) in &[(positive, -1.0f32), (negative, 1.0f32)] {
            let params = self.item_embeddings.row_mut(item_idx);
            let accs = self.item_embedding_gradients.row_mut(item_idx);
            for ((p, acc), u) in params.iter_mut().zip(accs.iter_mut()).zip(&user_vec) {
                adagrad(p, acc, sign * scale * u, lr);
            }

            adagrad(
                &mut self.item_biases[item_idx],
                &mut self.item_bias_gradients[item_idx],
                sign * scale,
                lr,
            );
        }
    }

    fn logistic_epoch(&mut self, interactions: &Interactions, order: &[usize], lr: f32) -> f32 {
        let data = interactions.data();
        let mut loss = 0.0;

        for &idx in order {
            let interaction = data[idx];
            let target = if interaction.is_positive() { 1.0 } else { 0.0 };
            let prediction = sigmoid(self.score(interaction.user_idx, interaction.item_idx));

            loss -= if interaction.is_positive() {
                prediction.max(std::f32::EPSILON).ln()
            } else {
                (1.0 - prediction).max(std::f32::EPSILON).ln()
            };

            self.pointwise_step(
                interaction.user_idx,
                interaction.item_idx,
                prediction - target,
                lr,
            );
        }

        loss / order.len().max(1) as f32
    }

    fn bpr_epoch<R: Rng>(
        &mut self,
        interactions: &Interactions,
        positives: &UserPositives,
        order: &[usize],
        lr: f32,
        rng: &mut R,
    ) -> f32 {
        let data = interactions.data();
        let num_items = self.num_items();
        let mut loss = 0.0;
        let mut steps = 0;

        for &idx in order {
            let interaction = data[idx];
            if !interaction.is_positive() {
                continue;
            }

            let user_idx = interaction.user_idx;
            let negative = rng.gen_range(0, num_items);
            if positives.contains(user_idx, negative) {
                continue;
            }

            let diff = self.score(user_idx, interaction.item_idx) - self.score(user_idx, negative);
            let prediction = sigmoid(diff);

            loss -= prediction.max(std::f32::EPSILON).ln();
            steps += 1;

            self.pairwise_step(user_idx, interaction.item_idx, negative, 1.0 - prediction, lr);
        }

        loss / steps.max(1) as f32
    }

    /// Samples negatives for (user, positive) until one violates the margin,
    /// returns the loss of the update if any was made.
    fn warp_step<R: Rng>(
        &mut self,
        user_idx: usize,
        positive: usize,
        positives: &UserPositives,
        max_sampled: usize,
        lr: f32,
        rng: &mut R,
    ) -> Option<f32> {
        let num_items = self.num_items();
        let positive_score = self.score(user_idx, positive);

        for sampled in 1..=max_sampled {
            let negative = rng.gen_range(0, num_items);
            if positives.contains(user_idx, negative) {
                continue;
            }

            let negative_score = self.score(user_idx, negative);
            if negative_score > positive_score - 1.0 {
                let rank = ((num_items - 1) / sampled).max(1) as f32;
                let weight = rank.ln().max(std::f32::EPSILON);

                self.pairwise_step(user_idx, positive, negative, weight, lr);
                return Some(weight * (1.0 - positive_score + negative_score));
            }
        }

        None
    }

    fn warp_epoch<R: Rng>(
        &mut self,
        interactions: &Interactions,
        positives: &UserPositives,
        order: &[usize],
        hyper: &Hyperparameters,
        rng: &mut R,
    ) -> f32 {
        let data = interactions.data();
        let mut loss = 0.0;
        let mut updates = 0;

        for &idx in order {
            let interaction = data[idx];
            if !interaction.is_positive() {
                continue;
            }

            if let Some(step_loss) = self.warp_step(
                interaction.user_idx,
                interaction.item_idx,
                positives,
                hyper.max_sampled,
                hyper.learning_rate,
                rng,
            ) {
                loss += step_loss;
                updates += 1;
            }
        }

        loss / updates.max(1) as f32
    }

    fn warp_kos_epoch<R: Rng>(
        &mut self,
        positives: &UserPositives,
        hyper: &Hyperparameters,
        rng: &mut R,
    ) -> f32 {
        let mut users: Vec<usize> = (0..self.num_users())
            .filter(|&user_idx| !positives.get(user_idx).is_empty())
            .collect();
        users.shuffle(rng);

        let mut loss = 0.0;
        let mut updates = 0;

        for user_idx in users {
            let user_positives = positives.get(user_idx);

            let mut sampled = Vec::with_capacity(hyper.k);
            for _ in 0..hyper.k {
                if let Some(&item_idx) = user_positives.choose(rng) {
                    sampled.push((item_idx, self.score(user_idx, item_idx)));
                }
            }

            sampled.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });

            let pick = hyper.n.min(sampled.len()).saturating_sub(1);
            let positive = match sampled.get(pick) {
                Some(&(item_idx, _)) => item_idx,
                None => continue,
            };

            if let Some(step_loss) = self.warp_step(
                user_idx,
                positive,
                positives,
                hyper.max_sampled,
                hyper.learning_rate,
                rng,
            ) {
                loss += step_loss;
                updates += 1;
            }
        }

        loss / updates.max(1) as f32
    }
}

/// Collaborative filtering model with one latent vector and one bias per
/// user and per item, scores are `user · item + user_bias + item_bias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorizationModel {
    hyper: Hyperparameters,
    model: Option<ModelData>,
    fit_calls: u64,
}

impl Default for FactorizationModel {
    fn default() -> Self {
        Self::new(Hyperparameters::default())
    }
}

impl FactorizationModel {
    pub fn new(hyper: Hyperparameters) -> Self {
        Self {
            hyper,
            model: None,
            fit_calls: 0,
        }
    }

    fn fitted(&self) -> Result<&ModelData, Error> {
        self.model
            .as_ref()
            .ok_or_else(|| ErrorKind::NotFitted.into())
    }
}

impl Recommender for FactorizationModel {
    fn num_users(&self) -> Option<usize> {
        self.model.as_ref().map(ModelData::num_users)
    }

    fn num_items(&self) -> Option<usize> {
        self.model.as_ref().map(ModelData::num_items)
    }

    fn fit(&mut self, interactions: &Interactions, num_epochs: usize) -> Result<f32, Error> {
        let hyper = &self.hyper;

        let usable = if hyper.loss.is_ranking() {
            interactions.num_positives()
        } else {
            interactions.len()
        };

        if usable == 0 || interactions.num_items() == 0 {
            return Err(ErrorKind::EmptyInteractions.into());
        }

        let mut rng = StdRng::seed_from_u64(hyper.random_state.wrapping_add(self.fit_calls));
        self.fit_calls += 1;

        let (num_users, num_items) = interactions.shape();
        let model = match &mut self.model {
            Some(model) => {
                if model.num_users() != num_users || model.num_items() != num_items {
                    return Err(ErrorKind::ShapeMismatch(
                        num_users,
                        num_items,
                        model.num_users(),
                        model.num_items(),
                    )
                    .into());
                }

                model
            }
            empty => empty.get_or_insert(ModelData::build(
                num_users,
                num_items,
                hyper.no_components,
                &mut rng,
            )),
        };

        log::info!(
            "Fitting {} model on {} interactions ({} users, {} items) for {} epochs",
            hyper.loss,
            interactions.len(),
            num_users,
            num_items,
            num_epochs
        );

        let positives = interactions.to_positives();
        let mut order: Vec<usize> = (0..interactions.len()).collect();
        let mut epoch_loss = 0.0;

        for epoch in 0..num_epochs {
            order.shuffle(&mut rng);

            epoch_loss = match hyper.loss {
                Loss::Logistic => model.logistic_epoch(interactions, &order, hyper.learning_rate),
                Loss::Bpr => model.bpr_epoch(
                    interactions,
                    &positives,
                    &order,
                    hyper.learning_rate,
                    &mut rng,
                ),
                Loss::Warp => model.warp_epoch(interactions, &positives, &order, hyper, &mut rng),
                Loss::WarpKos => model.warp_kos_epoch(&positives, hyper, &mut rng),
            };

            log::debug!("Epoch {}/{}: loss {}", epoch + 1, num_epochs, epoch_loss);
        }

        Ok(epoch_loss)
    }

    fn predict(&self, user_idxs: &[usize], item_idxs: &[usize]) -> Result<Vec<f32>, Error> {
        let model = self.fitted()?;

        if user_idxs.len() != item_idxs.len() {
            return Err(ErrorKind::LengthMismatch(item_idxs.len(), user_idxs.len()).into());
        }

        user_idxs
            .iter()
            .zip(item_idxs)
            .map(|(&user_idx, &item_idx)| {
                if user_idx >= model.num_users() || item_idx >= model.num_items() {
                    Err(ErrorKind::IndexOutOfBound.into())
                } else {
                    Ok(model.score(user_idx, item_idx))
                }
            })
            .collect()
    }

    fn item_representations(&self) -> Result<(&[f32], &Embeddings), Error> {
        let model = self.fitted()?;
        Ok((&model.item_biases, &model.item_embeddings))
    }
}
