// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind as FactorizationError;
use anyhow::Error;
use config::ModelDefaults;
use engine::{FactorizationModel, Hyperparameters, Loss};
use handler::{error::ErrorKind, Args, Value};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Every option the handler understands, anything else is ignored.
pub const RECOGNIZED_OPTIONS: &[&str] = &[
    "user_id",
    "item_id",
    "rating_column",
    "threshold",
    "recommendation_type",
    "n_recommendations",
    "learning_rate",
    "loss",
    "epochs",
    "no_components",
    "random_state",
    "max_sampled",
];

const DEFAULT_RATING_COLUMN: &str = "rating";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    UserItem,
    ItemItem,
    UserUser,
}

impl FromStr for RecommendationType {
    type Err = FactorizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_item" => Ok(Self::UserItem),
            "item_item" => Ok(Self::ItemItem),
            "user_user" => Ok(Self::UserUser),
            other => Err(FactorizationError::InvalidRecommendationType(other.into())),
        }
    }
}

impl Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserItem => write!(f, "user_item"),
            Self::ItemItem => write!(f, "item_item"),
            Self::UserUser => write!(f, "user_user"),
        }
    }
}

fn invalid(name: &str, reason: impl ToString) -> Error {
    ErrorKind::InvalidArgument(name.into(), reason.to_string()).into()
}

fn present<'a>(args: &'a Args, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|value| !value.is_null())
}

fn optional_string(args: &Args, name: &str) -> Result<Option<String>, Error> {
    present(args, name)
        .map(|value| {
            value
                .as_string()
                .map(str::to_owned)
                .map_err(|_| invalid(name, format!("expected a string, got '{}'", value)))
        })
        .transpose()
}

fn required_string(args: &Args, name: &str) -> Result<String, Error> {
    optional_string(args, name)?.ok_or_else(|| ErrorKind::MissingArgument(name.into()).into())
}

fn optional_f64(args: &Args, name: &str) -> Result<Option<f64>, Error> {
    present(args, name)
        .map(|value| value.to_f64().map_err(|e| invalid(name, e)))
        .transpose()
}

fn optional_usize(args: &Args, name: &str) -> Result<Option<usize>, Error> {
    present(args, name)
        .map(|value| {
            let v = value.to_i64().map_err(|e| invalid(name, e))?;
            if v < 0 {
                Err(invalid(name, "expected a non negative integer"))
            } else {
                Ok(v as usize)
            }
        })
        .transpose()
}

/// Parameters of the factorization model, unset ones take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub learning_rate: f64,
    pub loss: Loss,
    pub epochs: usize,
    pub no_components: usize,
    pub random_state: u64,
    pub max_sampled: usize,
}

impl ModelParameters {
    pub fn from_args(args: &Args, defaults: &ModelDefaults) -> Result<Self, Error> {
        let loss = match optional_string(args, "loss")? {
            Some(loss) => loss,
            None => defaults.loss.clone(),
        };

        let loss = loss.parse::<Loss>().map_err(|e| invalid("loss", e))?;

        let learning_rate = optional_f64(args, "learning_rate")?.unwrap_or(defaults.learning_rate);
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(invalid("learning_rate", "expected a positive number"));
        }

        let random_state = match optional_usize(args, "random_state")? {
            Some(seed) => seed as u64,
            None => defaults.random_state,
        };

        Ok(Self {
            learning_rate,
            loss,
            epochs: optional_usize(args, "epochs")?.unwrap_or(defaults.epochs),
            no_components: optional_usize(args, "no_components")?.unwrap_or(defaults.no_components),
            random_state,
            max_sampled: optional_usize(args, "max_sampled")?.unwrap_or(defaults.max_sampled),
        })
    }

    pub fn build_model(&self) -> Result<FactorizationModel, Error> {
        Hyperparameters::new()
            .learning_rate(self.learning_rate as f32)
            .loss(self.loss)
            .no_components(self.no_components)
            .max_sampled(self.max_sampled)
            .random_state(self.random_state)
            .build()
    }
}

/// Options of a training call.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub user_id: String,
    pub item_id: String,
    pub rating_column: String,
    pub threshold: Option<f64>,
    pub recommendation_type: String,
    pub n_recommendations: usize,
    pub model_params: ModelParameters,
}

impl Options {
    pub fn from_args(args: &Args, defaults: &ModelDefaults) -> Result<Self, Error> {
        for name in args.keys() {
            if !RECOGNIZED_OPTIONS.contains(&name.as_str()) {
                log::debug!("Ignoring unrecognized option '{}'", name);
            }
        }

        let threshold = optional_f64(args, "threshold")?;
        if let Some(threshold) = threshold {
            if threshold.is_nan() {
                return Err(invalid("threshold", "expected a number"));
            }
        }

        Ok(Self {
            user_id: required_string(args, "user_id")?,
            item_id: required_string(args, "item_id")?,
            rating_column: optional_string(args, "rating_column")?
                .unwrap_or_else(|| DEFAULT_RATING_COLUMN.into()),
            threshold,
            recommendation_type: optional_string(args, "recommendation_type")?
                .unwrap_or_else(|| RecommendationType::UserItem.to_string()),
            n_recommendations: n_recommendations(args)?.unwrap_or(defaults.n_recommendations),
            model_params: ModelParameters::from_args(args, defaults)?,
        })
    }
}

/// Predict time override of the stored recommendation type.
pub fn recommendation_type(args: &Args) -> Result<Option<String>, Error> {
    optional_string(args, "recommendation_type")
}

/// Predict time override of the stored number of recommendations.
pub fn n_recommendations(args: &Args) -> Result<Option<usize>, Error> {
    optional_usize(args, "n_recommendations")
}
