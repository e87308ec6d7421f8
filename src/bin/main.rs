//! linsvm Command Line Interface
//!
//! Trains a linear multiclass SVM, evaluates it on a test set, or both, with
//! data read from delimited text files and models stored as JSON.

use clap::Parser;
use env_logger::Env;
use linsvm::api::TrainEvalOrchestrator;
use linsvm::config::{
    OutputRequest, TrainEvalConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_OPTIMIZER, DEFAULT_TOLERANCE,
};
use linsvm::core::Result;
use linsvm::data::DataSources;
use linsvm::svm::{DEFAULT_DELTA, DEFAULT_LAMBDA, DEFAULT_SEED};
use log::{debug, error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "linsvm")]
#[command(about = "Train and evaluate an L2-regularized linear multiclass SVM")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "linsvm contributors")]
struct Cli {
    /// Training matrix; without --labels its last row holds the labels
    #[arg(short = 't', long)]
    training: Option<PathBuf>,

    /// Labels of the training points
    #[arg(short = 'l', long)]
    labels: Option<PathBuf>,

    /// L2 regularization strength
    #[arg(short = 'L', long, default_value_t = DEFAULT_LAMBDA, allow_negative_numbers = true)]
    lambda: f64,

    /// Margin between the correct class and the others
    #[arg(short = 'd', long, default_value_t = DEFAULT_DELTA, allow_negative_numbers = true)]
    delta: f64,

    /// Number of classes; 0 counts the distinct training labels
    #[arg(short = 'c', long, default_value_t = 0, allow_negative_numbers = true)]
    number_of_classes: i64,

    /// Do not fit an intercept term
    #[arg(short = 'N', long)]
    no_intercept: bool,

    /// Optimizer: 'lbfgs' or 'psgd'
    #[arg(short = 'O', long, default_value = DEFAULT_OPTIMIZER)]
    optimizer: String,

    /// Convergence tolerance
    #[arg(short = 'e', long, default_value_t = DEFAULT_TOLERANCE, allow_negative_numbers = true)]
    tolerance: f64,

    /// Iteration limit (points visited for psgd); 0 means no limit
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_ITERATIONS, allow_negative_numbers = true)]
    max_iterations: i64,

    /// Step size for psgd [default: 0.01]
    #[arg(short = 's', long, allow_negative_numbers = true)]
    step_size: Option<f64>,

    /// Don't shuffle the order in which points are visited by psgd
    #[arg(short = 'S', long, alias = "no-shuffle")]
    shuffle: bool,

    /// Model to evaluate or to warm-start training from
    #[arg(short = 'm', long)]
    input_model: Option<PathBuf>,

    /// Where to save the final model
    #[arg(short = 'M', long)]
    output_model: Option<PathBuf>,

    /// Test matrix to classify
    #[arg(short = 'T', long)]
    test: Option<PathBuf>,

    /// Labels of the test points, for accuracy
    #[arg(short = 'A', long)]
    test_labels: Option<PathBuf>,

    /// Where to save the predicted test labels
    #[arg(short = 'P', long)]
    predictions: Option<PathBuf>,

    /// Where to save the class scores of the test points
    #[arg(short = 'p', long)]
    score: Option<PathBuf>,

    /// Seed for parameter initialization and shuffling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn sources(&self) -> DataSources {
        DataSources {
            training: self.training.clone(),
            labels: self.labels.clone(),
            input_model: self.input_model.clone(),
            output_model: self.output_model.clone(),
            test: self.test.clone(),
            test_labels: self.test_labels.clone(),
            predictions: self.predictions.clone(),
            score: self.score.clone(),
        }
    }

    fn config(&self, outputs: OutputRequest) -> TrainEvalConfig {
        let mut config = TrainEvalConfig::new()
            .with_lambda(self.lambda)
            .with_delta(self.delta)
            .with_number_of_classes(self.number_of_classes)
            .with_intercept(!self.no_intercept)
            .with_optimizer(self.optimizer.as_str())
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
            .with_seed(self.seed)
            .with_outputs(outputs);
        if let Some(step_size) = self.step_size {
            config = config.with_step_size(step_size);
        }
        if self.shuffle {
            config = config.without_shuffle();
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(&cli) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let sources = cli.sources();
    let orchestrator = TrainEvalOrchestrator::new(cli.config(sources.output_request()));
    debug!("Capabilities: {:?}", orchestrator.capabilities());

    let report = orchestrator.validate(&sources)?;
    let data = sources.load()?;
    let outcome = orchestrator.execute(report, data)?;

    if let Some(choice) = outcome.optimizer {
        info!("Model trained with {choice}");
    }
    sources.persist(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linsvm::config::DEFAULT_STEP_SIZE;

    #[test]
    fn test_defaults_match_library() {
        let cli = Cli::try_parse_from(["linsvm", "-t", "train.csv"]).unwrap();
        let config = cli.config(cli.sources().output_request());

        let expected = TrainEvalConfig::new();
        assert_eq!(config, expected);
        assert_eq!(config.effective_step_size(), DEFAULT_STEP_SIZE);
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "linsvm", "-t", "train.csv", "-L", "0.5", "-n", "-1", "-c", "3", "-N", "-O", "psgd",
            "-s", "0.2", "-S", "-M", "model.json", "--seed", "7",
        ])
        .unwrap();
        let config = cli.config(cli.sources().output_request());

        assert_eq!(config.lambda, 0.5);
        assert_eq!(config.max_iterations, -1);
        assert_eq!(config.number_of_classes, 3);
        assert!(!config.fit_intercept);
        assert_eq!(config.optimizer, "psgd");
        assert_eq!(config.step_size, Some(0.2));
        assert!(config.no_shuffle);
        assert_eq!(config.seed, 7);
        assert!(config.outputs.model);
        assert!(!config.outputs.predictions);
    }
}
