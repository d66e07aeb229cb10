use super::{Regressor, check_shape};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Child index marking a leaf node.
pub const LEAF: i64 = -1;

/// A regression tree stored as flat node tables.
///
/// Node `0` is the root. At an internal node `i` a sample goes to
/// `children_left[i]` when `x[feature[i]] <= threshold[i]` and to
/// `children_right[i]` otherwise. Leaves have both children set to [`LEAF`] and
/// return `value[i]`. Children are always stored after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    /// A single-node tree returning `value`.
    #[must_use]
    pub fn leaf(value: f64) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![LEAF],
            threshold: vec![0.0],
            value: vec![value],
        }
    }

    /// A depth-one tree splitting on `feature` at `threshold`.
    #[must_use]
    pub fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Self {
        let feature = i64::try_from(feature).unwrap_or(i64::MAX);
        Self {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature, LEAF, LEAF],
            threshold: vec![threshold, 0.0, 0.0],
            value: vec![f64::midpoint(left, right), left, right],
        }
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let nodes = self.value.len();
        if nodes == 0 {
            return Err(ModelError::invalid("tree has no nodes"));
        }
        let lengths = [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ];
        if lengths.iter().any(|&len| len != nodes) {
            return Err(ModelError::invalid("tree node tables have mismatched lengths"));
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(ModelError::invalid(format!("node {node} has a single child")));
                }
                if !self.value[node].is_finite() {
                    return Err(ModelError::invalid(format!("leaf {node} has a non-finite value")));
                }
                continue;
            }

            for child in [left, right] {
                let in_order = usize::try_from(child).is_ok_and(|c| c > node && c < nodes);
                if !in_order {
                    return Err(ModelError::invalid(format!(
                        "node {node} points to child {child} outside ({node}, {nodes})"
                    )));
                }
            }

            let feature = self.feature[node];
            if !usize::try_from(feature).is_ok_and(|f| f < n_features) {
                return Err(ModelError::invalid(format!(
                    "node {node} splits on feature {feature}, model has {n_features}"
                )));
            }
            if self.threshold[node].is_nan() {
                return Err(ModelError::invalid(format!("node {node} has a NaN threshold")));
            }
        }

        Ok(())
    }

    /// Walks from the root to a leaf. Requires a validated tree.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut node = 0;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            let goes_left = features[self.feature[node] as usize] <= self.threshold[node];
            let next = if goes_left { left } else { self.children_right[node] };
            node = next as usize;
        }
    }
}

fn validate_ensemble(n_features: usize, trees: &[DecisionTree]) -> Result<(), ModelError> {
    if n_features == 0 {
        return Err(ModelError::invalid("ensemble declares zero features"));
    }
    if trees.is_empty() {
        return Err(ModelError::invalid("ensemble has no trees"));
    }
    trees.iter().enumerate().try_for_each(|(i, tree)| {
        tree.validate(n_features).map_err(|e| match e {
            ModelError::Invalid { message, context } => ModelError::Invalid {
                message: format!("tree {i}: {message}").into(),
                context,
            },
            other => other,
        })
    })
}

/// Bagged trees; the prediction is the mean of all tree outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        validate_ensemble(self.n_features, &self.trees)
    }
}

impl Regressor for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    #[allow(clippy::cast_precision_loss)]
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_shape(self.n_features, features)?;
        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

/// Boosted trees: `init + learning_rate · Σ tree outputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub n_features: usize,
    pub init: f64,
    pub learning_rate: f64,
    pub trees: Vec<DecisionTree>,
}

impl GradientBoosting {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if !self.init.is_finite() || !self.learning_rate.is_finite() {
            return Err(ModelError::invalid("gradient boosting has non-finite parameters"));
        }
        validate_ensemble(self.n_features, &self.trees)
    }
}

impl Regressor for GradientBoosting {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_shape(self.n_features, features)?;
        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        Ok(self.learning_rate.mul_add(sum, self.init))
    }

    fn kind(&self) -> &'static str {
        "gradient_boosting"
    }
}
