// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod error;
pub mod helpers;
pub mod index_map;
pub mod metadata;
pub mod preprocessor;
pub mod settings;

use anyhow::Error;
use config::ModelDefaults;
use engine::{FactorizationModel, Recommender};
use handler::{error::ErrorKind, Args, Frame, Handler, ModelStorage};
use helpers::{item_item_frame, item_item_recommendations, user_item_frame, user_item_recommendations};
use index_map::{unique_ids, EntityId};
use metadata::ModelMetadata;
use preprocessor::RecommenderPreprocessor;
use settings::{Options, RecommendationType};

/// Storage key of the serialized model
pub const MODEL_KEY: &str = "model";

/// Storage key of the JSON metadata
pub const ARGS_KEY: &str = "args";

/// Handler backed by a factorization recommender, supports `user_item` and
/// `item_item` recommendations.
pub struct FactorizationHandler<S: ModelStorage> {
    storage: S,
    defaults: ModelDefaults,
}

impl<S: ModelStorage> FactorizationHandler<S> {
    pub fn new(storage: S) -> Self {
        Self::with_defaults(storage, ModelDefaults::default())
    }

    pub fn with_defaults(storage: S, defaults: ModelDefaults) -> Self {
        Self { storage, defaults }
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn load(&self) -> Result<(FactorizationModel, ModelMetadata), Error> {
        let blob = self.storage.file_get(MODEL_KEY)?;
        let model: FactorizationModel = bincode::deserialize(&blob)?;
        let meta = ModelMetadata::from_json(self.storage.json_get(ARGS_KEY)?)?;

        Ok((model, meta))
    }

    fn save(&mut self, model: &FactorizationModel, meta: &ModelMetadata) -> Result<(), Error> {
        self.storage.file_set(MODEL_KEY, &bincode::serialize(model)?)?;
        self.storage.json_set(ARGS_KEY, &meta.to_json()?)?;

        Ok(())
    }
}

// Requested ids of `column`, `None` means every trained id.
fn requested_ids(df: Option<&Frame>, column: &str) -> Result<Option<Vec<EntityId>>, Error> {
    match df {
        Some(df) if df.has_column(column) => Ok(Some(unique_ids(df, column)?)),
        _ => Ok(None),
    }
}

impl<S: ModelStorage> Handler for FactorizationHandler<S> {
    fn name(&self) -> &'static str {
        "factorization"
    }

    fn create(&mut self, target: &str, df: &Frame, args: &Args) -> Result<(), Error> {
        let options = Options::from_args(args, &self.defaults)?;
        let params = &options.model_params;

        let data = RecommenderPreprocessor::new(&options.user_id, &options.item_id)
            .rating_column(&options.rating_column)
            .threshold(options.threshold)
            .process(df)?;

        let mut model = params.build_model()?;
        let loss = model.fit(&data.interactions, params.epochs)?;
        log::info!("Trained {} model, final loss {}", params.loss, loss);

        let meta = ModelMetadata {
            target: target.into(),
            n_users_items: data.n_users_items(),
            recommendation_type: options.recommendation_type,
            user_id: options.user_id,
            item_id: options.item_id,
            rating_column: options.rating_column,
            threshold: options.threshold,
            n_recommendations: options.n_recommendations,
            model_params: options.model_params,
            idx_to_user_id_map: data.idx_user_map,
            idx_to_item_id_map: data.idx_item_map,
        };

        self.save(&model, &meta)
    }

    fn predict(&self, df: Option<&Frame>, args: &Args) -> Result<Frame, Error> {
        let (model, meta) = self.load()?;

        let recommendation_type = settings::recommendation_type(args)?
            .unwrap_or_else(|| meta.recommendation_type.clone());
        let n = settings::n_recommendations(args)?.unwrap_or(meta.n_recommendations);

        // An empty frame carries no ids to restrict to
        let df = df.filter(|df| !df.is_empty());

        log::info!(
            "Predicting {} recommendations (n = {}) for {}",
            recommendation_type,
            n,
            meta.target
        );

        match recommendation_type.parse::<RecommendationType>()? {
            RecommendationType::UserItem => {
                let user_ids = match df {
                    Some(df) => Some(unique_ids(df, &meta.user_id)?),
                    None => None,
                };
                let item_ids = requested_ids(df, &meta.item_id)?;

                let rows = user_item_recommendations(
                    &model,
                    &meta,
                    n,
                    user_ids.as_deref(),
                    item_ids.as_deref(),
                )?;

                user_item_frame(&meta, &rows)
            }

            RecommendationType::ItemItem => {
                let item_ids = match df {
                    Some(df) => Some(unique_ids(df, &meta.item_id)?),
                    None => None,
                };

                let rows = item_item_recommendations(&model, &meta, n, item_ids.as_deref())?;
                item_item_frame(&meta, &rows)
            }

            RecommendationType::UserUser => Err(ErrorKind::NotImplemented(
                "user_user recommendation type is not implemented yet".into(),
            )
            .into()),
        }
    }
}
