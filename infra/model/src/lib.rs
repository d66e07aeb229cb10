//! # Model
//!
//! Loads one pre-trained regression artifact at startup and serves predictions
//! from it for the lifetime of the process.
//!
//! Artifacts are versioned envelopes around an [`Estimator`]: a linear model, a
//! random forest or a gradient boosted ensemble. `.json` files are read as JSON,
//! everything else as `postcard`.
//!
//! ```rust
//! # use fare_model::{Estimator, LinearModel, ModelArtifact, ModelMetadata, ModelStore};
//! let artifact = ModelArtifact::new(
//!     ModelMetadata::new("fare", "1.0.0"),
//!     Estimator::Linear(LinearModel { coefficients: vec![2.0, 1.0], intercept: 3.0 }),
//! );
//! let store = ModelStore::from_artifact(artifact).unwrap();
//! assert_eq!(store.predict(&[1.0, 1.0]).unwrap(), 6.0);
//! ```

mod artifact;
mod error;
mod estimator;
mod store;

pub use crate::artifact::{ArtifactFormat, FORMAT_VERSION, ModelArtifact, ModelMetadata};
pub use crate::error::{ModelError, ModelErrorExt};
pub use crate::estimator::{
    DecisionTree, Estimator, GradientBoosting, LEAF, LinearModel, RandomForest, Regressor,
};
pub use crate::store::{ModelSource, ModelStore};
