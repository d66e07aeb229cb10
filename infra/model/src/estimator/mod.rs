//! Regressors an artifact can carry.

mod linear;
mod tree;

pub use linear::LinearModel;
pub use tree::{DecisionTree, GradientBoosting, LEAF, RandomForest};

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Inference contract shared by every model the store can hold.
///
/// Implementations must be immutable after construction: the store calls
/// [`Regressor::predict`] concurrently from many requests without locking.
pub trait Regressor: Debug + Send + Sync {
    /// Number of features one sample must have.
    fn n_features(&self) -> usize;

    /// Predicts the target for one sample of exactly [`Regressor::n_features`] values.
    ///
    /// # Errors
    /// Implementations may fail; the store reports such failures as inference errors.
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;

    /// Short identifier of the estimator family, e.g. `linear`.
    fn kind(&self) -> &'static str;
}

fn check_shape(expected: usize, features: &[f64]) -> Result<(), ModelError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(ModelError::ShapeMismatch { expected, found: features.len() })
    }
}

/// The estimator stored inside an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    Linear(LinearModel),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
}

impl Estimator {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Linear(model) => model.validate(),
            Self::RandomForest(model) => model.validate(),
            Self::GradientBoosting(model) => model.validate(),
        }
    }

    fn regressor(&self) -> &dyn Regressor {
        match self {
            Self::Linear(model) => model,
            Self::RandomForest(model) => model,
            Self::GradientBoosting(model) => model,
        }
    }
}

impl Regressor for Estimator {
    fn n_features(&self) -> usize {
        self.regressor().n_features()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.regressor().predict(features)
    }

    fn kind(&self) -> &'static str {
        self.regressor().kind()
    }
}
