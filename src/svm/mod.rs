//! L2-regularized linear multiclass support vector machine
//!
//! The model keeps one column of weights per class in a parameter matrix of
//! shape `(D + intercept) x num_classes`; the last row holds the intercepts
//! when `fit_intercept` is set. Points are stored one per column.

pub mod function;

pub use self::function::LinearSvmFunction;

use crate::core::{Optimizer, Result, SVMError};
use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayView1, Axis};

/// Default L2 regularization strength
pub const DEFAULT_LAMBDA: f64 = 0.0001;
/// Default margin between the correct class and the others
pub const DEFAULT_DELTA: f64 = 1.0;
/// Seed used by [`LinearSvm::train`] for the initial parameters
pub const DEFAULT_SEED: u64 = 0;

/// Linear multiclass SVM
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSvm {
    lambda: f64,
    delta: f64,
    fit_intercept: bool,
    num_classes: usize,
    parameters: Array2<f64>,
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSvm {
    /// Create an untrained model with default hyperparameters
    pub fn new() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            delta: DEFAULT_DELTA,
            fit_intercept: true,
            num_classes: 0,
            parameters: Array2::zeros((0, 0)),
        }
    }

    /// Rebuild a model from stored state
    pub fn from_parts(
        lambda: f64,
        delta: f64,
        fit_intercept: bool,
        num_classes: usize,
        parameters: Array2<f64>,
    ) -> Result<Self> {
        if !parameters.is_empty() {
            if parameters.ncols() != num_classes {
                return Err(SVMError::InvalidParameter(format!(
                    "parameter matrix has {} columns but the model has {} classes",
                    parameters.ncols(),
                    num_classes
                )));
            }
            if fit_intercept && parameters.nrows() < 1 {
                return Err(SVMError::InvalidParameter(
                    "intercept model needs at least one parameter row".to_string(),
                ));
            }
        }

        Ok(Self {
            lambda,
            delta,
            fit_intercept,
            num_classes,
            parameters,
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn set_lambda(&mut self, lambda: f64) {
        self.lambda = lambda;
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    pub fn set_fit_intercept(&mut self, fit_intercept: bool) {
        self.fit_intercept = fit_intercept;
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn set_num_classes(&mut self, num_classes: usize) {
        self.num_classes = num_classes;
    }

    /// Learned parameters, `(D + intercept) x num_classes`
    pub fn parameters(&self) -> &Array2<f64> {
        &self.parameters
    }

    /// Whether the model holds learned parameters
    pub fn is_trained(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Number of features the model was trained on
    pub fn feature_dimensionality(&self) -> Option<usize> {
        if !self.is_trained() {
            return None;
        }
        Some(self.parameters.nrows() - usize::from(self.fit_intercept))
    }

    /// Train with the default initialization seed
    pub fn train(
        &mut self,
        features: &Array2<f64>,
        labels: &Array1<usize>,
        num_classes: usize,
        optimizer: &mut dyn Optimizer,
    ) -> Result<f64> {
        self.train_seeded(features, labels, num_classes, optimizer, DEFAULT_SEED)
    }

    /// Fit the parameters on `features` (one point per column) and return the
    /// final objective value.
    ///
    /// Existing parameters of the right shape are used as the starting point;
    /// otherwise a random start drawn from `seed` is used. The model is left
    /// untouched if the optimizer fails.
    pub fn train_seeded(
        &mut self,
        features: &Array2<f64>,
        labels: &Array1<usize>,
        num_classes: usize,
        optimizer: &mut dyn Optimizer,
        seed: u64,
    ) -> Result<f64> {
        if features.ncols() != labels.len() {
            return Err(SVMError::LabelCountMismatch {
                context: "Training data",
                points: features.ncols(),
                labels: labels.len(),
            });
        }
        if features.ncols() == 0 {
            return Err(SVMError::EmptyDataset);
        }
        if num_classes == 0 {
            return Err(SVMError::InvalidParameter(
                "number of classes must be at least 1".to_string(),
            ));
        }
        if let Some(&label) = labels.iter().find(|&&label| label >= num_classes) {
            return Err(SVMError::InvalidLabel { label, num_classes });
        }

        let function = LinearSvmFunction::new(
            features.view(),
            labels.view(),
            num_classes,
            self.lambda,
            self.delta,
            self.fit_intercept,
        );

        let shape = function.parameter_shape();
        let mut iterate = if self.parameters.dim() == shape {
            debug!("Warm-starting from existing {shape:?} parameters");
            self.parameters.clone()
        } else {
            if self.is_trained() {
                warn!(
                    "Existing parameters have shape {:?}, but training needs {:?}; reinitializing",
                    self.parameters.dim(),
                    shape
                );
            }
            function.initial_point(seed)
        };

        let objective = optimizer.optimize(&function, &mut iterate)?;
        debug!("{} finished with objective {objective:.6}", optimizer.name());

        self.num_classes = num_classes;
        self.parameters = iterate;
        Ok(objective)
    }

    /// Fail unless `features` has the dimensionality the model was trained on
    pub fn check_dimensionality(&self, features: &Array2<f64>) -> Result<()> {
        let expected = self
            .feature_dimensionality()
            .ok_or(SVMError::ModelNotTrained)?;
        if features.nrows() != expected {
            return Err(SVMError::DimensionMismatch {
                expected,
                actual: features.nrows(),
            });
        }
        Ok(())
    }

    /// Class scores, one column of `num_classes` scores per point
    pub fn scores(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_dimensionality(features)?;

        let d = features.nrows();
        let mut scores = self.parameters.slice(s![..d, ..]).t().dot(features);
        if self.fit_intercept {
            scores += &self.parameters.row(d).insert_axis(Axis(1));
        }
        Ok(scores)
    }

    /// Predicted class of every point
    pub fn classify(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        let scores = self.scores(features)?;
        Ok(predictions_from_scores(&scores))
    }

    /// Predicted classes together with the score matrix they came from
    pub fn classify_with_scores(
        &self,
        features: &Array2<f64>,
    ) -> Result<(Array1<usize>, Array2<f64>)> {
        let scores = self.scores(features)?;
        let predictions = predictions_from_scores(&scores);
        Ok((predictions, scores))
    }

    /// Fraction of points whose predicted class equals the given label;
    /// `None` when there are no points
    pub fn compute_accuracy(
        &self,
        features: &Array2<f64>,
        labels: &Array1<usize>,
    ) -> Result<Option<f64>> {
        if features.ncols() != labels.len() {
            return Err(SVMError::LabelCountMismatch {
                context: "Data",
                points: features.ncols(),
                labels: labels.len(),
            });
        }
        if labels.is_empty() {
            return Ok(None);
        }

        let predictions = self.classify(features)?;
        let correct = predictions
            .iter()
            .zip(labels.iter())
            .filter(|(predicted, actual)| predicted == actual)
            .count();
        Ok(Some(correct as f64 / labels.len() as f64))
    }
}

/// Index of the highest score in each column; ties go to the lower class
pub fn predictions_from_scores(scores: &Array2<f64>) -> Array1<usize> {
    scores.columns().into_iter().map(argmax).collect()
}

fn argmax(column: ArrayView1<f64>) -> usize {
    column
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (k, &score)| {
            if score > best.1 {
                (k, score)
            } else {
                best
            }
        })
        .0
}
