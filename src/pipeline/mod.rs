//! The four stages of a train/evaluate run
//!
//! Validation, loading, training and evaluation run strictly in that order;
//! [`crate::api::TrainEvalOrchestrator`] drives them.

pub mod evaluator;
pub mod loader;
pub mod trainer;
pub mod validate;

pub use self::evaluator::{Evaluation, Evaluator};
pub use self::loader::{LoadedState, TrainingData};
pub use self::trainer::{select_optimizer, Trainer};
pub use self::validate::{validate, TrainingOptions, ValidationReport};
