//! Core traits for the linear SVM trainer

use crate::core::Result;
use ndarray::Array2;

/// Objective function that can be minimized by a batch optimizer
pub trait DifferentiableFunction: Send + Sync {
    /// Objective value at `parameters`
    fn evaluate(&self, parameters: &Array2<f64>) -> f64;

    /// Write the gradient at `parameters` into `gradient` (same shape)
    fn gradient(&self, parameters: &Array2<f64>, gradient: &mut Array2<f64>);

    /// Objective value and gradient in one pass
    fn evaluate_with_gradient(&self, parameters: &Array2<f64>, gradient: &mut Array2<f64>) -> f64 {
        self.gradient(parameters, gradient);
        self.evaluate(parameters)
    }
}

/// Objective that decomposes into a sum over individual data points
pub trait SeparableFunction: DifferentiableFunction {
    /// Number of separable terms (training points)
    fn num_functions(&self) -> usize;

    /// Objective restricted to point `i`
    fn evaluate_point(&self, parameters: &Array2<f64>, i: usize) -> f64;

    /// Gradient of the objective restricted to point `i`
    fn gradient_point(&self, parameters: &Array2<f64>, i: usize, gradient: &mut Array2<f64>);
}

/// Optimization strategy that updates `iterate` in place
pub trait Optimizer {
    /// Short name used in logs and model metadata
    fn name(&self) -> &'static str;

    /// Minimize `function` starting from `iterate`, returning the final
    /// objective value
    fn optimize(
        &mut self,
        function: &dyn SeparableFunction,
        iterate: &mut Array2<f64>,
    ) -> Result<f64>;
}

/// Which inputs a run was given
///
/// Implemented both by file sources (before anything is read) and by
/// in-memory inputs, so option validation never needs the data itself.
pub trait InputPresence {
    fn has_training(&self) -> bool;

    fn has_labels(&self) -> bool;

    fn has_input_model(&self) -> bool;

    fn has_test(&self) -> bool;

    fn has_test_labels(&self) -> bool;
}
