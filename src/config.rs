//! Run configuration
//!
//! All user-facing options of one train/evaluate run, assembled once at the
//! entry point and passed down explicitly. Values are kept as the user gave
//! them (signed, free-form optimizer name) so the validator can report
//! out-of-range input; [`crate::pipeline::validate`] turns them into
//! [`TrainingOptions`](crate::pipeline::TrainingOptions).

use crate::svm::{DEFAULT_DELTA, DEFAULT_LAMBDA};

pub const DEFAULT_OPTIMIZER: &str = "lbfgs";
pub const DEFAULT_TOLERANCE: f64 = 1e-10;
pub const DEFAULT_MAX_ITERATIONS: i64 = 10000;
pub const DEFAULT_STEP_SIZE: f64 = 0.01;

/// Which outputs the caller wants persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputRequest {
    pub model: bool,
    pub predictions: bool,
    pub score: bool,
}

impl OutputRequest {
    pub fn any(&self) -> bool {
        self.model || self.predictions || self.score
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainEvalConfig {
    /// L2 regularization strength
    pub lambda: f64,
    /// Margin between the correct class and the others
    pub delta: f64,
    /// Number of classes; 0 infers it from the labels
    pub number_of_classes: i64,
    pub fit_intercept: bool,
    /// "lbfgs" or "psgd"
    pub optimizer: String,
    pub tolerance: f64,
    /// Iteration limit; points for psgd, 0 means no limit
    pub max_iterations: i64,
    /// Step size for psgd; `None` when not given
    pub step_size: Option<f64>,
    /// Visit points in a fixed order under psgd
    pub no_shuffle: bool,
    /// Seed for parameter initialization and shuffling
    pub seed: u64,
    pub outputs: OutputRequest,
}

impl Default for TrainEvalConfig {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            delta: DEFAULT_DELTA,
            number_of_classes: 0,
            fit_intercept: true,
            optimizer: DEFAULT_OPTIMIZER.to_string(),
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_size: None,
            no_shuffle: false,
            seed: 0,
            outputs: OutputRequest::default(),
        }
    }
}

impl TrainEvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_number_of_classes(mut self, number_of_classes: i64) -> Self {
        self.number_of_classes = number_of_classes;
        self
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn with_optimizer(mut self, optimizer: impl Into<String>) -> Self {
        self.optimizer = optimizer.into();
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: i64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = Some(step_size);
        self
    }

    pub fn without_shuffle(mut self) -> Self {
        self.no_shuffle = true;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_outputs(mut self, outputs: OutputRequest) -> Self {
        self.outputs = outputs;
        self
    }

    /// Step size in effect, whether or not one was given
    pub fn effective_step_size(&self) -> f64 {
        self.step_size.unwrap_or(DEFAULT_STEP_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainEvalConfig::default();
        assert_eq!(config.lambda, 0.0001);
        assert_eq!(config.delta, 1.0);
        assert_eq!(config.number_of_classes, 0);
        assert!(config.fit_intercept);
        assert_eq!(config.optimizer, "lbfgs");
        assert_eq!(config.tolerance, 1e-10);
        assert_eq!(config.max_iterations, 10000);
        assert_eq!(config.step_size, None);
        assert_eq!(config.effective_step_size(), 0.01);
        assert!(!config.no_shuffle);
        assert!(!config.outputs.any());
    }

    #[test]
    fn test_builder_pattern() {
        let config = TrainEvalConfig::new()
            .with_lambda(0.1)
            .with_delta(2.0)
            .with_number_of_classes(3)
            .with_intercept(false)
            .with_optimizer("psgd")
            .with_tolerance(1e-4)
            .with_max_iterations(500)
            .with_step_size(0.2)
            .without_shuffle()
            .with_seed(9)
            .with_outputs(OutputRequest {
                predictions: true,
                ..OutputRequest::default()
            });

        assert_eq!(config.lambda, 0.1);
        assert_eq!(config.delta, 2.0);
        assert_eq!(config.number_of_classes, 3);
        assert!(!config.fit_intercept);
        assert_eq!(config.optimizer, "psgd");
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_iterations, 500);
        assert_eq!(config.effective_step_size(), 0.2);
        assert!(config.no_shuffle);
        assert_eq!(config.seed, 9);
        assert!(config.outputs.any());
    }
}
