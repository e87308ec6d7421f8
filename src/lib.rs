//! Linear multiclass support vector machine trainer and evaluator
//!
//! Trains an L2-regularized linear SVM with either batch L-BFGS or
//! parallel SGD, then classifies test points and reports accuracy.

pub mod api;
pub mod config;
pub mod core;
pub mod data;
pub mod optimizer;
pub mod persistence;
pub mod pipeline;
pub mod svm;

// Re-export main types for convenience
pub use crate::api::{InputData, RunOutcome, TrainEvalOrchestrator};
pub use crate::config::{OutputRequest, TrainEvalConfig};
pub use crate::core::error::*;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::DataSources;
pub use crate::optimizer::{Lbfgs, OptimizerBackend, ParallelSgd};
pub use crate::persistence::SerializableModel;
pub use crate::svm::{LinearSvm, LinearSvmFunction};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
