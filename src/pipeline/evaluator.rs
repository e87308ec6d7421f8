//! Evaluation stage: scores, predictions and accuracy on a test set

use crate::core::{AccuracyReport, Result, SVMError};
use crate::svm::LinearSvm;
use log::{info, warn};
use ndarray::{Array1, Array2};

/// Results of classifying a test set
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Predicted class of every test point
    pub predictions: Array1<usize>,
    /// `num_classes x test points` class scores, when requested
    pub scores: Option<Array2<f64>>,
    /// Accuracy against test labels, when labels were given
    pub accuracy: Option<AccuracyReport>,
}

pub struct Evaluator {
    compute_scores: bool,
}

impl Evaluator {
    pub fn new(compute_scores: bool) -> Self {
        Self { compute_scores }
    }

    pub fn evaluate(
        &self,
        model: &LinearSvm,
        test: &Array2<f64>,
        test_labels: Option<&Array1<usize>>,
    ) -> Result<Evaluation> {
        model.check_dimensionality(test)?;

        let (predictions, scores) = if self.compute_scores {
            info!("Calculating class scores of {} test points", test.ncols());
            let (predictions, scores) = model.classify_with_scores(test)?;
            (predictions, Some(scores))
        } else {
            (model.classify(test)?, None)
        };

        let accuracy = match test_labels {
            Some(labels) => {
                if labels.len() != test.ncols() {
                    return Err(SVMError::LabelCountMismatch {
                        context: "Test data",
                        points: test.ncols(),
                        labels: labels.len(),
                    });
                }
                let report = AccuracyReport::tally(
                    &predictions.to_vec(),
                    &labels.to_vec(),
                    model.num_classes(),
                )?;
                log_accuracy(&report);
                Some(report)
            }
            None => None,
        };

        Ok(Evaluation {
            predictions,
            scores,
            accuracy,
        })
    }
}

/// Log per-class and overall accuracy
pub fn log_accuracy(report: &AccuracyReport) {
    for (label, accuracy) in report.per_class().into_iter().enumerate() {
        match accuracy {
            Some(accuracy) => info!(
                "Accuracy for points with label {label} is {accuracy} ({} of {}).",
                report.bingo[label], report.label_size[label]
            ),
            None => warn!(
                "Accuracy for points with label {label} is undefined (no test points have this label)."
            ),
        }
    }

    match report.overall() {
        Some(overall) => info!(
            "Total accuracy for all points is {overall} ({} of {}).",
            report.total_correct(),
            report.total
        ),
        None => warn!("Total accuracy is undefined (the test set has no points)."),
    }
}
