//! Optimization backends for linear SVM training
//!
//! Training goes through the [`Optimizer`] strategy. Two backends exist: the
//! batch L-BFGS optimizer and the parallel SGD optimizer. [`OptimizerBackend`]
//! wraps whichever one a run selected.

pub mod lbfgs;
pub mod parallel_sgd;

pub use self::lbfgs::Lbfgs;
pub use self::parallel_sgd::{chunk_size_for, ConstantStep, ParallelSgd};

use crate::core::{Optimizer, OptimizerChoice, Result, SeparableFunction};
use ndarray::Array2;

/// The optimizer chosen for one training run
#[derive(Debug, Clone)]
pub enum OptimizerBackend {
    Batch(Lbfgs),
    Parallel(ParallelSgd),
}

impl OptimizerBackend {
    /// Which user-facing choice this backend implements
    pub fn choice(&self) -> OptimizerChoice {
        match self {
            OptimizerBackend::Batch(_) => OptimizerChoice::Lbfgs,
            OptimizerBackend::Parallel(_) => OptimizerChoice::Psgd,
        }
    }
}

impl Optimizer for OptimizerBackend {
    fn name(&self) -> &'static str {
        match self {
            OptimizerBackend::Batch(optimizer) => optimizer.name(),
            OptimizerBackend::Parallel(optimizer) => optimizer.name(),
        }
    }

    fn optimize(
        &mut self,
        function: &dyn SeparableFunction,
        iterate: &mut Array2<f64>,
    ) -> Result<f64> {
        match self {
            OptimizerBackend::Batch(optimizer) => optimizer.optimize(function, iterate),
            OptimizerBackend::Parallel(optimizer) => optimizer.optimize(function, iterate),
        }
    }
}
