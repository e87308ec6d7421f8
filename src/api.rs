//! High-level API for train/evaluate runs
//!
//! [`TrainEvalOrchestrator`] validates the options of a run, then loads,
//! trains and evaluates in that order, threading one model through the
//! stages.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use linsvm::api::{InputData, TrainEvalOrchestrator};
//! use linsvm::config::TrainEvalConfig;
//! use linsvm::data::load_matrix;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Last row of the training matrix holds the labels
//! let data = InputData::new()
//!     .with_training(load_matrix("train.csv")?)
//!     .with_test(load_matrix("test.csv")?);
//!
//! let config = TrainEvalConfig::new().with_lambda(0.1);
//! let outcome = TrainEvalOrchestrator::new(config).run(data)?;
//! if let Some(evaluation) = outcome.evaluation {
//!     println!("Predictions: {}", evaluation.predictions);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::TrainEvalConfig;
use crate::core::{Capabilities, InputPresence, OptimizerChoice, Result};
use crate::pipeline::{loader, validate, Evaluation, Evaluator, Trainer, ValidationReport};
use crate::svm::LinearSvm;
use log::debug;
use ndarray::{Array1, Array2};

/// In-memory inputs of a run; every part is optional
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Training points, one per column
    pub training: Option<Array2<f64>>,
    pub labels: Option<Array1<usize>>,
    pub input_model: Option<LinearSvm>,
    /// Test points, one per column
    pub test: Option<Array2<f64>>,
    pub test_labels: Option<Array1<usize>>,
}

impl InputData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_training(mut self, training: Array2<f64>) -> Self {
        self.training = Some(training);
        self
    }

    pub fn with_labels(mut self, labels: Array1<usize>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_input_model(mut self, model: LinearSvm) -> Self {
        self.input_model = Some(model);
        self
    }

    pub fn with_test(mut self, test: Array2<f64>) -> Self {
        self.test = Some(test);
        self
    }

    pub fn with_test_labels(mut self, test_labels: Array1<usize>) -> Self {
        self.test_labels = Some(test_labels);
        self
    }
}

impl InputPresence for InputData {
    fn has_training(&self) -> bool {
        self.training.is_some()
    }

    fn has_labels(&self) -> bool {
        self.labels.is_some()
    }

    fn has_input_model(&self) -> bool {
        self.input_model.is_some()
    }

    fn has_test(&self) -> bool {
        self.test.is_some()
    }

    fn has_test_labels(&self) -> bool {
        self.test_labels.is_some()
    }
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunOutcome {
    /// The final model, trained or as loaded
    pub model: LinearSvm,
    /// Present when test data was given
    pub evaluation: Option<Evaluation>,
    /// Optimizer used, when training happened
    pub optimizer: Option<OptimizerChoice>,
    /// Warnings raised during validation
    pub warnings: Vec<String>,
}

/// Drives validation, loading, training and evaluation
pub struct TrainEvalOrchestrator {
    config: TrainEvalConfig,
    capabilities: Capabilities,
}

impl TrainEvalOrchestrator {
    /// Create an orchestrator with the capabilities of this process
    pub fn new(config: TrainEvalConfig) -> Self {
        Self {
            config,
            capabilities: Capabilities::detect(),
        }
    }

    /// Override the detected capabilities
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn config(&self) -> &TrainEvalConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Check the options against the inputs that were given
    pub fn validate(&self, inputs: &dyn InputPresence) -> Result<ValidationReport> {
        validate(&self.config, inputs)
    }

    /// Run the load, train and evaluate stages on validated options
    pub fn execute(&self, report: ValidationReport, data: InputData) -> Result<RunOutcome> {
        let ValidationReport { options, warnings } = report;
        let InputData {
            training,
            labels,
            input_model,
            test,
            test_labels,
        } = data;

        let mut state = loader::load(options.number_of_classes, training, labels, input_model)?;

        let optimizer = match (&state.training, state.num_classes) {
            (Some(training), Some(num_classes)) => {
                let trainer = Trainer::new(&options, self.capabilities);
                Some(trainer.train(&mut state.model, training, num_classes)?)
            }
            _ => {
                debug!("No training data; using the input model as is");
                None
            }
        };

        let evaluation = match &test {
            Some(test) => Some(Evaluator::new(options.compute_scores).evaluate(
                &state.model,
                test,
                test_labels.as_ref(),
            )?),
            None => None,
        };

        Ok(RunOutcome {
            model: state.model,
            evaluation,
            optimizer,
            warnings,
        })
    }

    /// Validate and execute in one call
    pub fn run(&self, data: InputData) -> Result<RunOutcome> {
        let report = self.validate(&data)?;
        self.execute(report, data)
    }
}
