// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{index_map::IndexMap, settings::ModelParameters};
use anyhow::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Everything predict needs besides the model itself, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub target: String,
    pub recommendation_type: String,
    pub user_id: String,
    pub item_id: String,
    pub rating_column: String,
    pub threshold: Option<f64>,
    pub n_recommendations: usize,
    pub model_params: ModelParameters,
    pub n_users_items: (usize, usize),
    pub idx_to_user_id_map: IndexMap,
    pub idx_to_item_id_map: IndexMap,
}

impl ModelMetadata {
    pub fn to_json(&self) -> Result<Json, Error> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(json: Json) -> Result<Self, Error> {
        Ok(serde_json::from_value(json)?)
    }

    pub fn similar_item_column(&self) -> String {
        format!("similar_{}", self.item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_map::EntityId;
    use anyhow::Error;
    use engine::Loss;

    #[test]
    fn metadata_json_layout() -> Result<(), Error> {
        let meta = ModelMetadata {
            target: "rating".into(),
            recommendation_type: "user_item".into(),
            user_id: "user".into(),
            item_id: "movie".into(),
            rating_column: "rating".into(),
            threshold: Some(3.5),
            n_recommendations: 5,
            model_params: ModelParameters {
                learning_rate: 0.05,
                loss: Loss::WarpKos,
                epochs: 10,
                no_components: 8,
                random_state: 1,
                max_sampled: 10,
            },
            n_users_items: (2, 1),
            idx_to_user_id_map: IndexMap::from_ids(vec![EntityId::from(7), EntityId::from(3)]),
            idx_to_item_id_map: IndexMap::from_ids(vec![EntityId::from("matrix")]),
        };

        let json = meta.to_json()?;
        assert_eq!(json["n_users_items"], serde_json::json!([2, 1]));
        assert_eq!(json["idx_to_user_id_map"], serde_json::json!([7, 3]));
        assert_eq!(json["model_params"]["loss"], "warp-kos");

        assert_eq!(ModelMetadata::from_json(json)?, meta);
        assert_eq!(meta.similar_item_column(), "similar_movie");

        Ok(())
    }
}
