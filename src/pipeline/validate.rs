//! Option validation
//!
//! Checks every option before any data is read. Fatal problems come back as
//! errors; harmless ones (ignored options, nothing being saved) are logged
//! and collected in the report.

use crate::config::TrainEvalConfig;
use crate::core::{InputPresence, OptimizerChoice, Result, SVMError};
use log::{debug, warn};

/// Options of a run after validation, in their final types
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    pub lambda: f64,
    pub delta: f64,
    /// Requested number of classes; 0 infers it from the labels
    pub number_of_classes: usize,
    pub fit_intercept: bool,
    pub optimizer: OptimizerChoice,
    pub tolerance: f64,
    /// 0 means no limit
    pub max_iterations: usize,
    pub step_size: f64,
    pub shuffle: bool,
    pub seed: u64,
    /// Whether class scores of the test set are wanted
    pub compute_scores: bool,
}

/// Outcome of a successful validation
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub options: TrainingOptions,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

/// Validate `config` against the inputs a run was given
pub fn validate(config: &TrainEvalConfig, inputs: &dyn InputPresence) -> Result<ValidationReport> {
    if !inputs.has_training() && !inputs.has_input_model() {
        return Err(SVMError::MissingInput(
            "at least one of training data or an input model must be specified".to_string(),
        ));
    }

    if config.max_iterations < 0 {
        return Err(SVMError::InvalidParameter(format!(
            "max_iterations must be positive or zero (got {})",
            config.max_iterations
        )));
    }
    require_non_negative("tolerance", config.tolerance)?;
    let optimizer: OptimizerChoice = config.optimizer.parse()?;
    require_non_negative("lambda", config.lambda)?;
    if config.number_of_classes < 0 {
        return Err(SVMError::InvalidParameter(format!(
            "number_of_classes must be greater than or equal to 0, with 0 meaning inferred from the labels (got {})",
            config.number_of_classes
        )));
    }
    require_non_negative("delta", config.delta)?;
    require_non_negative("step_size", config.effective_step_size())?;

    let mut report = ValidationReport {
        options: TrainingOptions {
            lambda: config.lambda,
            delta: config.delta,
            number_of_classes: config.number_of_classes as usize,
            fit_intercept: config.fit_intercept,
            optimizer,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations as usize,
            step_size: config.effective_step_size(),
            shuffle: !config.no_shuffle,
            seed: config.seed,
            compute_scores: config.outputs.score && inputs.has_test(),
        },
        warnings: Vec::new(),
    };

    if !config.outputs.any() {
        report.warn(
            "none of an output model, predictions or scores was requested; no output will be saved"
                .to_string(),
        );
    }

    if optimizer != OptimizerChoice::Psgd {
        if config.step_size.is_some() {
            report.warn(format!(
                "step_size ignored because optimizer type is not 'psgd' (it is '{optimizer}')"
            ));
        }
        if config.no_shuffle {
            report.warn(format!(
                "shuffle ignored because optimizer type is not 'psgd' (it is '{optimizer}')"
            ));
        }
    }

    if !inputs.has_training() && config.number_of_classes != 0 {
        report.warn(format!(
            "number_of_classes ignored because no training data was given; the input model's class count is used (got {})",
            config.number_of_classes
        ));
    }

    if !inputs.has_test() {
        let dangling = [
            (config.outputs.predictions, "predictions"),
            (config.outputs.score, "score"),
            (inputs.has_test_labels(), "test labels"),
        ];
        for (given, name) in dangling {
            if given {
                debug!("{name} ignored because no test data was given");
            }
        }
    }

    Ok(report)
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    // Written this way so NaN fails too
    if !(value >= 0.0) {
        return Err(SVMError::InvalidParameter(format!(
            "{name} must be positive or zero (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputRequest;

    #[derive(Default)]
    struct Presence {
        training: bool,
        model: bool,
        test: bool,
        test_labels: bool,
    }

    impl InputPresence for Presence {
        fn has_training(&self) -> bool {
            self.training
        }

        fn has_labels(&self) -> bool {
            false
        }

        fn has_input_model(&self) -> bool {
            self.model
        }

        fn has_test(&self) -> bool {
            self.test
        }

        fn has_test_labels(&self) -> bool {
            self.test_labels
        }
    }

    fn training() -> Presence {
        Presence {
            training: true,
            ..Presence::default()
        }
    }

    fn saving() -> TrainEvalConfig {
        TrainEvalConfig::default().with_outputs(OutputRequest {
            model: true,
            ..OutputRequest::default()
        })
    }

    #[test]
    fn test_valid_defaults() {
        let report = validate(&saving(), &training()).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.options.optimizer, OptimizerChoice::Lbfgs);
        assert_eq!(report.options.max_iterations, 10000);
        assert_eq!(report.options.number_of_classes, 0);
        assert!(report.options.shuffle);
    }

    #[test]
    fn test_requires_training_or_model() {
        let err = validate(&saving(), &Presence::default()).unwrap_err();
        assert!(matches!(err, SVMError::MissingInput(_)));
        assert!(err.is_configuration());

        let model_only = Presence {
            model: true,
            ..Presence::default()
        };
        assert!(validate(&saving(), &model_only).is_ok());
    }

    #[test]
    fn test_rejects_each_out_of_range_option() {
        let cases = [
            ("max_iterations", saving().with_max_iterations(-1)),
            ("tolerance", saving().with_tolerance(-0.5)),
            ("lambda", saving().with_lambda(-1.0)),
            ("number_of_classes", saving().with_number_of_classes(-2)),
            ("delta", saving().with_delta(-1.0)),
            ("step_size", saving().with_step_size(-1.0)),
        ];

        for (name, config) in cases {
            match validate(&config, &training()) {
                Err(SVMError::InvalidParameter(msg)) => assert!(msg.contains(name), "{msg}"),
                other => panic!("{name} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_unknown_optimizer() {
        let err = validate(&saving().with_optimizer("foo"), &training()).unwrap_err();
        assert!(matches!(err, SVMError::UnknownOptimizer(name) if name == "foo"));
    }

    #[test]
    fn test_step_size_checked_even_for_lbfgs() {
        let config = saving().with_optimizer("lbfgs").with_step_size(-1.0);
        assert!(validate(&config, &training()).is_err());
    }

    #[test]
    fn test_rejects_nan_lambda() {
        assert!(validate(&saving().with_lambda(f64::NAN), &training()).is_err());
    }

    #[test]
    fn test_warns_when_nothing_is_saved() {
        let report = validate(&TrainEvalConfig::default(), &training()).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("no output will be saved"));
    }

    #[test]
    fn test_psgd_only_options_warn_under_lbfgs() {
        let config = saving().with_step_size(0.5).without_shuffle();
        let report = validate(&config, &training()).unwrap();
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("step_size ignored"));
        assert!(report.warnings[1].contains("shuffle ignored"));

        let psgd = config.with_optimizer("psgd");
        let report = validate(&psgd, &training()).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.options.step_size, 0.5);
        assert!(!report.options.shuffle);
    }

    #[test]
    fn test_class_count_ignored_without_training() {
        let model_only = Presence {
            model: true,
            test: true,
            ..Presence::default()
        };
        let report = validate(&saving().with_number_of_classes(4), &model_only).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("number_of_classes ignored"));

        let report = validate(&saving().with_number_of_classes(4), &training()).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.options.number_of_classes, 4);
    }

    #[test]
    fn test_test_outputs_silently_ignored_without_test_set() {
        let config = TrainEvalConfig::default().with_outputs(OutputRequest {
            predictions: true,
            score: true,
            ..OutputRequest::default()
        });
        let inputs = Presence {
            training: true,
            test_labels: true,
            ..Presence::default()
        };
        let report = validate(&config, &inputs).unwrap();
        assert!(report.warnings.is_empty());
        assert!(!report.options.compute_scores);
    }
}
