//! Parallel stochastic gradient descent
//!
//! Points are visited in chunks spread over the rayon worker pool. Workers
//! read and update one shared parameter matrix without locks: every cell is
//! an `AtomicU64` holding the bit pattern of an `f64`, updated with
//! compare-and-swap. Iteration counts are in points, not epochs.

use crate::core::{Optimizer, Result, SVMError, SeparableFunction};
use log::debug;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Step size that stays the same for every epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantStep {
    step_size: f64,
}

impl ConstantStep {
    pub fn new(step_size: f64) -> Self {
        Self { step_size }
    }

    pub fn step_size(&self, _epoch: usize) -> f64 {
        self.step_size
    }
}

/// Hogwild-style parallel SGD
#[derive(Debug, Clone)]
pub struct ParallelSgd {
    /// Maximum number of points visited; 0 means no limit
    pub max_iterations: usize,
    /// Number of consecutive points handed to one worker
    pub chunk_size: usize,
    /// Stop once the objective changes by less than this between epochs
    pub tolerance: f64,
    /// Shuffle the visitation order every epoch
    pub shuffle: bool,
    pub decay: ConstantStep,
    /// Seed of the shuffling generator
    pub seed: u64,
}

impl ParallelSgd {
    pub fn new(
        max_iterations: usize,
        chunk_size: usize,
        tolerance: f64,
        shuffle: bool,
        decay: ConstantStep,
    ) -> Self {
        Self {
            max_iterations,
            chunk_size: chunk_size.max(1),
            tolerance,
            shuffle,
            decay,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Chunk size that gives every worker one share of the points
pub fn chunk_size_for(num_points: usize, threads: usize) -> usize {
    num_points.div_ceil(threads.max(1)).max(1)
}

/// Parameter matrix shared between workers
struct SharedIterate {
    cells: Vec<AtomicU64>,
}

impl SharedIterate {
    fn new(values: &Array2<f64>) -> Self {
        Self {
            cells: values.iter().map(|v| AtomicU64::new(v.to_bits())).collect(),
        }
    }

    fn load_into(&self, out: &mut Array2<f64>) {
        for (value, cell) in out.iter_mut().zip(&self.cells) {
            *value = f64::from_bits(cell.load(Ordering::Relaxed));
        }
    }

    /// `cells -= step * gradient`, cell by cell
    fn descend(&self, step: f64, gradient: &Array2<f64>) {
        for (cell, &g) in self.cells.iter().zip(gradient.iter()) {
            if g == 0.0 {
                continue;
            }
            let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) - step * g).to_bits())
            });
        }
    }
}

impl Optimizer for ParallelSgd {
    fn name(&self) -> &'static str {
        "ParallelSGD"
    }

    fn optimize(
        &mut self,
        function: &dyn SeparableFunction,
        iterate: &mut Array2<f64>,
    ) -> Result<f64> {
        let n = function.num_functions();
        if n == 0 {
            return Err(SVMError::EmptyDataset);
        }

        let shape = iterate.dim();
        let shared = SharedIterate::new(iterate);
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut snapshot = iterate.clone();
        let mut last_objective = f64::MAX;
        let mut visited = 0usize;
        let mut epoch = 0usize;

        let objective = loop {
            shared.load_into(&mut snapshot);
            let objective = function.evaluate(&snapshot);
            if !objective.is_finite() {
                return Err(SVMError::OptimizationError(format!(
                    "objective became {objective} after {visited} points; the step size ({}) is probably too large",
                    self.decay.step_size(epoch)
                )));
            }
            debug!("ParallelSGD epoch {epoch}: objective {objective:.6}");

            if (last_objective - objective).abs() < self.tolerance {
                debug!("ParallelSGD converged after {visited} points");
                break objective;
            }
            if self.max_iterations != 0 && visited >= self.max_iterations {
                debug!("ParallelSGD reached the point limit ({visited})");
                break objective;
            }
            last_objective = objective;

            let step = self.decay.step_size(epoch);
            if self.shuffle {
                order.shuffle(&mut rng);
            }
            let batch = if self.max_iterations == 0 {
                n
            } else {
                (self.max_iterations - visited).min(n)
            };

            order[..batch].par_chunks(self.chunk_size).for_each(|chunk| {
                let mut parameters = Array2::zeros(shape);
                let mut gradient = Array2::zeros(shape);
                for &i in chunk {
                    shared.load_into(&mut parameters);
                    function.gradient_point(&parameters, i, &mut gradient);
                    shared.descend(step, &gradient);
                }
            });

            visited += batch;
            epoch += 1;
        };

        shared.load_into(iterate);
        Ok(objective)
    }
}
