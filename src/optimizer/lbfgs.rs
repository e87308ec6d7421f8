//! Limited-memory BFGS
//!
//! Two-loop recursion over the last `num_basis` correction pairs with a
//! backtracking Armijo line search. Deterministic for a given start.

use crate::core::{Optimizer, Result, SVMError, SeparableFunction};
use log::{debug, warn};
use ndarray::Array2;
use std::collections::VecDeque;

/// Batch quasi-Newton optimizer
#[derive(Debug, Clone)]
pub struct Lbfgs {
    /// Number of correction pairs kept
    pub num_basis: usize,
    /// Maximum number of iterations; 0 means no limit
    pub max_iterations: usize,
    /// Sufficient decrease constant of the line search
    pub armijo_constant: f64,
    /// Stop once the gradient norm falls below this
    pub min_gradient_norm: f64,
    /// Stop once the relative objective decrease is below `factr * EPSILON`
    pub factr: f64,
    /// Maximum step halvings per line search
    pub max_line_search_trials: usize,
    /// Smallest step the line search may try
    pub min_step: f64,
}

impl Default for Lbfgs {
    fn default() -> Self {
        Self {
            num_basis: 10,
            max_iterations: 10000,
            armijo_constant: 1e-4,
            min_gradient_norm: 1e-6,
            factr: 1e-15,
            max_line_search_trials: 50,
            min_step: 1e-20,
        }
    }
}

struct Correction {
    s: Array2<f64>,
    y: Array2<f64>,
    rho: f64,
}

impl Lbfgs {
    pub fn new(max_iterations: usize, min_gradient_norm: f64) -> Self {
        Self {
            max_iterations,
            min_gradient_norm,
            ..Self::default()
        }
    }

    pub fn with_num_basis(mut self, num_basis: usize) -> Self {
        self.num_basis = num_basis.max(1);
        self
    }

    /// Approximate `-H * gradient` from the stored corrections
    fn search_direction(
        &self,
        gradient: &Array2<f64>,
        history: &VecDeque<Correction>,
    ) -> Array2<f64> {
        let mut q = gradient.clone();
        let mut alphas = Vec::with_capacity(history.len());

        for c in history.iter().rev() {
            let alpha = c.rho * inner(&c.s, &q);
            q.scaled_add(-alpha, &c.y);
            alphas.push(alpha);
        }

        if let Some(last) = history.back() {
            q *= inner(&last.s, &last.y) / inner(&last.y, &last.y);
        }

        for (c, alpha) in history.iter().zip(alphas.iter().rev()) {
            let beta = c.rho * inner(&c.y, &q);
            q.scaled_add(alpha - beta, &c.s);
        }

        q.mapv_inplace(|v| -v);
        q
    }

    /// Backtrack from `initial_step` until the Armijo condition holds
    fn line_search(
        &self,
        function: &dyn SeparableFunction,
        iterate: &Array2<f64>,
        direction: &Array2<f64>,
        value: f64,
        slope: f64,
        initial_step: f64,
    ) -> Option<(Array2<f64>, f64, Array2<f64>)> {
        let mut step = initial_step;
        let mut gradient = Array2::zeros(iterate.raw_dim());

        for _ in 0..self.max_line_search_trials {
            let candidate = iterate + &(direction * step);
            let candidate_value = function.evaluate_with_gradient(&candidate, &mut gradient);
            if candidate_value.is_finite()
                && candidate_value <= value + self.armijo_constant * step * slope
            {
                return Some((candidate, candidate_value, gradient));
            }

            step *= 0.5;
            if step < self.min_step {
                break;
            }
        }

        None
    }
}

impl Optimizer for Lbfgs {
    fn name(&self) -> &'static str {
        "L-BFGS"
    }

    fn optimize(
        &mut self,
        function: &dyn SeparableFunction,
        iterate: &mut Array2<f64>,
    ) -> Result<f64> {
        let mut gradient = Array2::zeros(iterate.raw_dim());
        let mut value = function.evaluate_with_gradient(iterate, &mut gradient);
        if !value.is_finite() {
            return Err(SVMError::OptimizationError(format!(
                "initial objective is {value}"
            )));
        }

        let mut history: VecDeque<Correction> = VecDeque::with_capacity(self.num_basis);
        let mut iteration = 0;

        loop {
            if self.max_iterations != 0 && iteration >= self.max_iterations {
                debug!("L-BFGS reached the iteration limit ({iteration})");
                break;
            }

            let gradient_norm = inner(&gradient, &gradient).sqrt();
            if gradient_norm < self.min_gradient_norm {
                debug!("L-BFGS converged after {iteration} iterations (gradient norm {gradient_norm:e})");
                break;
            }

            let mut direction = self.search_direction(&gradient, &history);
            let mut slope = inner(&gradient, &direction);
            if slope >= 0.0 || !slope.is_finite() {
                // Not a descent direction: restart from steepest descent
                history.clear();
                direction = gradient.mapv(|g| -g);
                slope = -gradient_norm * gradient_norm;
            }
            let initial_step = if history.is_empty() {
                (1.0 / gradient_norm).min(1.0)
            } else {
                1.0
            };

            let Some((next, next_value, next_gradient)) =
                self.line_search(function, iterate, &direction, value, slope, initial_step)
            else {
                warn!("L-BFGS line search failed after {iteration} iterations; stopping optimization");
                break;
            };

            let s = &next - &*iterate;
            let y = &next_gradient - &gradient;
            let sy = inner(&s, &y);
            if sy > 1e-10 {
                if history.len() == self.num_basis {
                    history.pop_front();
                }
                history.push_back(Correction { s, y, rho: 1.0 / sy });
            }

            let previous = value;
            *iterate = next;
            gradient = next_gradient;
            value = next_value;
            iteration += 1;

            let scale = previous.abs().max(value.abs()).max(1.0);
            if (previous - value) / scale <= self.factr * f64::EPSILON {
                debug!("L-BFGS objective stopped decreasing after {iteration} iterations");
                break;
            }
        }

        Ok(value)
    }
}

fn inner(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
