//! Multiclass hinge-loss objective
//!
//! For a parameter matrix `W` of shape `(D + intercept) x K` the objective is
//!
//! ```text
//! f(W) = 1/N * sum_i sum_{k != y_i} max(0, s_k(x_i) - s_{y_i}(x_i) + delta)
//!        + lambda / 2 * ||W||^2
//! ```
//!
//! where `s(x) = W[0..D]^T x + W[D]` when an intercept row is fitted.

use crate::core::{DifferentiableFunction, SeparableFunction};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scale of the random initial parameters
const INITIAL_SCALE: f64 = 0.005;

/// Linear SVM objective over a borrowed training set
pub struct LinearSvmFunction<'a> {
    dataset: ArrayView2<'a, f64>,
    labels: ArrayView1<'a, usize>,
    num_classes: usize,
    lambda: f64,
    delta: f64,
    fit_intercept: bool,
}

impl<'a> LinearSvmFunction<'a> {
    /// `dataset` holds one point per column; every label must be below
    /// `num_classes`.
    pub fn new(
        dataset: ArrayView2<'a, f64>,
        labels: ArrayView1<'a, usize>,
        num_classes: usize,
        lambda: f64,
        delta: f64,
        fit_intercept: bool,
    ) -> Self {
        Self {
            dataset,
            labels,
            num_classes,
            lambda,
            delta,
            fit_intercept,
        }
    }

    /// Number of rows of the parameter matrix
    pub fn parameter_rows(&self) -> usize {
        self.dataset.nrows() + usize::from(self.fit_intercept)
    }

    /// Shape of the parameter matrix
    pub fn parameter_shape(&self) -> (usize, usize) {
        (self.parameter_rows(), self.num_classes)
    }

    /// Small random starting point, reproducible for a given seed
    pub fn initial_point(&self, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_simple_fn(self.parameter_shape(), || {
            rng.gen_range(-1.0..1.0) * INITIAL_SCALE
        })
    }

    fn regularization(&self, parameters: &Array2<f64>) -> f64 {
        0.5 * self.lambda * parameters.iter().map(|&w| w * w).sum::<f64>()
    }

    /// Hinge loss of point `i` without regularization. When `gradient` is
    /// given, the point's subgradient scaled by `weight` is added to it.
    fn point_loss(
        &self,
        parameters: &Array2<f64>,
        i: usize,
        mut gradient: Option<(&mut Array2<f64>, f64)>,
    ) -> f64 {
        let x = self.dataset.column(i);
        let y = self.labels[i];
        let scores = self.point_scores(parameters, &x);
        let correct = scores[y];

        let mut loss = 0.0;
        let mut violations = 0usize;
        for (k, &score) in scores.iter().enumerate() {
            if k == y {
                continue;
            }
            let margin = score - correct + self.delta;
            if margin > 0.0 {
                loss += margin;
                violations += 1;
                if let Some((g, weight)) = gradient.as_mut() {
                    self.add_to_class(g, k, &x, *weight);
                }
            }
        }

        if violations > 0 {
            if let Some((g, weight)) = gradient.as_mut() {
                self.add_to_class(g, y, &x, -(*weight) * violations as f64);
            }
        }

        loss
    }

    fn point_scores(&self, parameters: &Array2<f64>, x: &ArrayView1<f64>) -> Array1<f64> {
        let d = x.len();
        let mut scores = x.dot(&parameters.slice(s![..d, ..]));
        if self.fit_intercept {
            scores += &parameters.row(d);
        }
        scores
    }

    fn add_to_class(&self, gradient: &mut Array2<f64>, k: usize, x: &ArrayView1<f64>, weight: f64) {
        let d = x.len();
        gradient.slice_mut(s![..d, k]).scaled_add(weight, x);
        if self.fit_intercept {
            gradient[[d, k]] += weight;
        }
    }
}

impl DifferentiableFunction for LinearSvmFunction<'_> {
    fn evaluate(&self, parameters: &Array2<f64>) -> f64 {
        let n = self.num_functions();
        let loss: f64 = (0..n).map(|i| self.point_loss(parameters, i, None)).sum();
        loss / n as f64 + self.regularization(parameters)
    }

    fn gradient(&self, parameters: &Array2<f64>, gradient: &mut Array2<f64>) {
        self.evaluate_with_gradient(parameters, gradient);
    }

    fn evaluate_with_gradient(&self, parameters: &Array2<f64>, gradient: &mut Array2<f64>) -> f64 {
        let n = self.num_functions();
        let weight = 1.0 / n as f64;
        gradient.fill(0.0);

        let mut loss = 0.0;
        for i in 0..n {
            loss += self.point_loss(parameters, i, Some((&mut *gradient, weight)));
        }
        gradient.scaled_add(self.lambda, parameters);

        loss / n as f64 + self.regularization(parameters)
    }
}

impl SeparableFunction for LinearSvmFunction<'_> {
    fn num_functions(&self) -> usize {
        self.dataset.ncols()
    }

    fn evaluate_point(&self, parameters: &Array2<f64>, i: usize) -> f64 {
        self.point_loss(parameters, i, None) + self.regularization(parameters)
    }

    fn gradient_point(&self, parameters: &Array2<f64>, i: usize, gradient: &mut Array2<f64>) {
        gradient.fill(0.0);
        self.point_loss(parameters, i, Some((&mut *gradient, 1.0)));
        gradient.scaled_add(self.lambda, parameters);
    }
}
