//! Core type definitions for the linear SVM trainer

use crate::core::{Result, SVMError};
use std::fmt;
use std::str::FromStr;

/// Optimizer selected for training
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerChoice {
    /// Batch quasi-Newton L-BFGS
    Lbfgs,
    /// Parallel stochastic gradient descent
    Psgd,
}

impl OptimizerChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizerChoice::Lbfgs => "lbfgs",
            OptimizerChoice::Psgd => "psgd",
        }
    }
}

impl FromStr for OptimizerChoice {
    type Err = SVMError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lbfgs" => Ok(OptimizerChoice::Lbfgs),
            "psgd" => Ok(OptimizerChoice::Psgd),
            other => Err(SVMError::UnknownOptimizer(other.to_string())),
        }
    }
}

impl fmt::Display for OptimizerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution capabilities of the running process, detected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether the parallel SGD backend may be used
    pub parallel: bool,
    /// Number of workers the parallel backend partitions points over
    pub threads: usize,
}

impl Capabilities {
    /// Detect capabilities from the build features and the worker pool
    pub fn detect() -> Self {
        Self {
            parallel: cfg!(feature = "parallel"),
            threads: rayon::current_num_threads().max(1),
        }
    }

    /// Capabilities of a single-threaded process without the parallel backend
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            threads: 1,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// Per-class and overall accuracy of predictions against ground truth
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyReport {
    /// Number of test points whose true label is `c`
    pub label_size: Vec<usize>,
    /// Number of test points with true label `c` that were predicted correctly
    pub bingo: Vec<usize>,
    /// Total number of test points
    pub total: usize,
}

impl AccuracyReport {
    /// Tally predictions against labels. Both slices must have equal length
    /// and every label must be below `num_classes`.
    pub fn tally(predictions: &[usize], labels: &[usize], num_classes: usize) -> Result<Self> {
        if predictions.len() != labels.len() {
            return Err(SVMError::LabelCountMismatch {
                context: "Test data",
                points: predictions.len(),
                labels: labels.len(),
            });
        }

        let mut bingo = vec![0; num_classes];
        let mut label_size = vec![0; num_classes];
        for (&predicted, &actual) in predictions.iter().zip(labels) {
            if actual >= num_classes {
                return Err(SVMError::InvalidLabel {
                    label: actual,
                    num_classes,
                });
            }
            if predicted == actual {
                bingo[actual] += 1;
            }
            label_size[actual] += 1;
        }

        Ok(Self {
            label_size,
            bingo,
            total: labels.len(),
        })
    }

    /// Accuracy for points of class `c`; `None` when no test point has that label
    pub fn class_accuracy(&self, c: usize) -> Option<f64> {
        match self.label_size.get(c) {
            Some(&0) | None => None,
            Some(&size) => Some(self.bingo[c] as f64 / size as f64),
        }
    }

    /// Accuracy of every class in label order
    pub fn per_class(&self) -> Vec<Option<f64>> {
        (0..self.label_size.len())
            .map(|c| self.class_accuracy(c))
            .collect()
    }

    /// Number of correctly predicted points
    pub fn total_correct(&self) -> usize {
        self.bingo.iter().sum()
    }

    /// Fraction of all points predicted correctly; `None` for an empty test set
    pub fn overall(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.total_correct() as f64 / self.total as f64)
    }
}
