//! Training stage
//!
//! Picks exactly one optimizer backend, applies the hyperparameters to the
//! model and fits it.

use crate::core::{Capabilities, Optimizer, OptimizerChoice, Result, SVMError};
use crate::optimizer::{chunk_size_for, ConstantStep, Lbfgs, OptimizerBackend, ParallelSgd};
use crate::pipeline::loader::TrainingData;
use crate::pipeline::validate::TrainingOptions;
use crate::svm::LinearSvm;
use log::info;

/// Build the optimizer backend for `options`
///
/// Fails with [`SVMError::UnsupportedOptimizer`] when parallel SGD is chosen
/// but the process has no parallel capability.
pub fn select_optimizer(
    options: &TrainingOptions,
    capabilities: &Capabilities,
    num_points: usize,
) -> Result<OptimizerBackend> {
    match options.optimizer {
        OptimizerChoice::Lbfgs => Ok(OptimizerBackend::Batch(Lbfgs::new(
            options.max_iterations,
            options.tolerance,
        ))),
        OptimizerChoice::Psgd => {
            if !capabilities.parallel {
                return Err(SVMError::UnsupportedOptimizer(
                    OptimizerChoice::Psgd.to_string(),
                ));
            }
            let sgd = ParallelSgd::new(
                options.max_iterations,
                chunk_size_for(num_points, capabilities.threads),
                options.tolerance,
                options.shuffle,
                ConstantStep::new(options.step_size),
            )
            .with_seed(options.seed);
            Ok(OptimizerBackend::Parallel(sgd))
        }
    }
}

pub struct Trainer<'a> {
    options: &'a TrainingOptions,
    capabilities: Capabilities,
}

impl<'a> Trainer<'a> {
    pub fn new(options: &'a TrainingOptions, capabilities: Capabilities) -> Self {
        Self {
            options,
            capabilities,
        }
    }

    /// Fit `model` on `data` and return the optimizer that was used
    ///
    /// The backend is chosen before the model is touched, so an unavailable
    /// optimizer leaves the model as it was.
    pub fn train(
        &self,
        model: &mut LinearSvm,
        data: &TrainingData,
        num_classes: usize,
    ) -> Result<OptimizerChoice> {
        let mut backend = select_optimizer(self.options, &self.capabilities, data.num_points())?;

        model.set_lambda(self.options.lambda);
        model.set_delta(self.options.delta);
        model.set_fit_intercept(self.options.fit_intercept);
        model.set_num_classes(num_classes);

        info!("Training model with {} optimizer.", backend.name());
        let objective = model.train_seeded(
            &data.features,
            &data.labels,
            num_classes,
            &mut backend,
            self.options.seed,
        )?;
        info!("Training finished with objective {objective:.6}");

        Ok(backend.choice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainEvalConfig;
    use crate::core::InputPresence;
    use crate::pipeline::validate::validate;
    use ndarray::array;

    struct TrainingOnly;

    impl InputPresence for TrainingOnly {
        fn has_training(&self) -> bool {
            true
        }

        fn has_labels(&self) -> bool {
            false
        }

        fn has_input_model(&self) -> bool {
            false
        }

        fn has_test(&self) -> bool {
            false
        }

        fn has_test_labels(&self) -> bool {
            false
        }
    }

    fn options(config: TrainEvalConfig) -> TrainingOptions {
        validate(&config, &TrainingOnly).unwrap().options
    }

    fn data() -> TrainingData {
        TrainingData {
            features: array![[-2.0, 2.0, -1.5, 1.5], [-1.0, 1.0, -0.8, 0.8]],
            labels: array![0, 1, 0, 1],
        }
    }

    #[test]
    fn test_select_lbfgs() {
        let opts = options(TrainEvalConfig::default().with_max_iterations(25).with_tolerance(1e-3));
        match select_optimizer(&opts, &Capabilities::sequential(), 10).unwrap() {
            OptimizerBackend::Batch(lbfgs) => {
                assert_eq!(lbfgs.max_iterations, 25);
                assert_eq!(lbfgs.min_gradient_norm, 1e-3);
            }
            other => panic!("expected L-BFGS, got {other:?}"),
        }
    }

    #[test]
    fn test_select_psgd_partitions_points() {
        let opts = options(
            TrainEvalConfig::default()
                .with_optimizer("psgd")
                .with_step_size(0.2)
                .without_shuffle(),
        );
        let caps = Capabilities {
            parallel: true,
            threads: 4,
        };
        match select_optimizer(&opts, &caps, 10).unwrap() {
            OptimizerBackend::Parallel(sgd) => {
                assert_eq!(sgd.chunk_size, 3);
                assert_eq!(sgd.decay.step_size(0), 0.2);
                assert!(!sgd.shuffle);
            }
            other => panic!("expected ParallelSGD, got {other:?}"),
        }
    }

    #[test]
    fn test_psgd_without_parallel_capability_leaves_model_untouched() {
        let opts = options(TrainEvalConfig::default().with_optimizer("psgd").with_lambda(0.3));
        let trainer = Trainer::new(&opts, Capabilities::sequential());
        let mut model = LinearSvm::new();
        let before = model.clone();

        let err = trainer.train(&mut model, &data(), 2).unwrap_err();
        assert!(matches!(err, SVMError::UnsupportedOptimizer(name) if name == "psgd"));
        assert_eq!(model, before);
    }

    #[test]
    fn test_trainer_applies_hyperparameters() {
        let opts = options(
            TrainEvalConfig::default()
                .with_lambda(0.1)
                .with_delta(1.0)
                .with_intercept(true),
        );
        let trainer = Trainer::new(&opts, Capabilities::sequential());
        let mut model = LinearSvm::new();

        let used = trainer.train(&mut model, &data(), 2).unwrap();
        assert_eq!(used, OptimizerChoice::Lbfgs);
        assert_eq!(model.lambda(), 0.1);
        assert_eq!(model.delta(), 1.0);
        assert_eq!(model.num_classes(), 2);
        assert_eq!(model.parameters().dim(), (3, 2));
    }

    #[test]
    fn test_psgd_training_with_capability() {
        let opts = options(
            TrainEvalConfig::default()
                .with_optimizer("psgd")
                .with_max_iterations(4 * 200)
                .with_step_size(0.05),
        );
        let caps = Capabilities {
            parallel: true,
            threads: 2,
        };
        let trainer = Trainer::new(&opts, caps);
        let mut model = LinearSvm::new();
        let data = data();

        let used = trainer.train(&mut model, &data, 2).unwrap();
        assert_eq!(used, OptimizerChoice::Psgd);
        assert_eq!(model.parameters().dim(), (3, 2));
        assert_eq!(model.classify(&data.features).unwrap(), data.labels);
    }
}
