//! Data and model resolution
//!
//! Turns the raw inputs into a labeled training set, a class count and the
//! single model instance the rest of the run works on.

use crate::core::{Result, SVMError};
use crate::data::label_from_value;
use crate::svm::LinearSvm;
use log::{debug, info};
use ndarray::{s, Array1, Array2};
use std::collections::BTreeSet;

/// Features (one point per column) with their labels
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData {
    pub features: Array2<f64>,
    pub labels: Array1<usize>,
}

impl TrainingData {
    pub fn num_points(&self) -> usize {
        self.features.ncols()
    }
}

/// Everything the trainer and evaluator need
#[derive(Debug)]
pub struct LoadedState {
    pub model: LinearSvm,
    pub training: Option<TrainingData>,
    /// Resolved class count; present only when training data was given
    pub num_classes: Option<usize>,
}

/// Pair a training matrix with its labels
///
/// Separate labels must match the number of points. Without them the last
/// row of `features` holds the labels and is removed.
pub fn resolve_training_set(
    features: Array2<f64>,
    labels: Option<Array1<usize>>,
) -> Result<TrainingData> {
    match labels {
        Some(labels) => {
            if features.ncols() != labels.len() {
                return Err(SVMError::LabelCountMismatch {
                    context: "Training data",
                    points: features.ncols(),
                    labels: labels.len(),
                });
            }
            Ok(TrainingData { features, labels })
        }
        None => split_label_row(features),
    }
}

/// Take the last row of `features` as integer labels
pub fn split_label_row(features: Array2<f64>) -> Result<TrainingData> {
    let rows = features.nrows();
    if rows < 2 {
        return Err(SVMError::InvalidDataset(format!(
            "can't get labels from training data since it has less than 2 rows (it has {rows})"
        )));
    }

    let labels = features
        .row(rows - 1)
        .iter()
        .map(|&value| label_from_value(value))
        .collect::<Result<Array1<usize>>>()?;
    let features = features.slice(s![..rows - 1, ..]).to_owned();

    Ok(TrainingData { features, labels })
}

/// Class count to train with: `requested` when non-zero, otherwise the
/// number of distinct labels
pub fn resolve_num_classes(requested: usize, labels: &Array1<usize>) -> usize {
    if requested != 0 {
        return requested;
    }
    labels.iter().collect::<BTreeSet<_>>().len()
}

/// Fail if any label is outside `[0, num_classes)`
pub fn check_label_range(labels: &Array1<usize>, num_classes: usize) -> Result<()> {
    match labels.iter().find(|&&label| label >= num_classes) {
        Some(&label) => Err(SVMError::InvalidLabel { label, num_classes }),
        None => Ok(()),
    }
}

/// Use the given model or start from a fresh one
pub fn resolve_model(input_model: Option<LinearSvm>) -> LinearSvm {
    match input_model {
        Some(model) => {
            debug!("Using the given input model");
            model
        }
        None => LinearSvm::new(),
    }
}

/// Run the whole loading stage
pub fn load(
    number_of_classes: usize,
    training: Option<Array2<f64>>,
    labels: Option<Array1<usize>>,
    input_model: Option<LinearSvm>,
) -> Result<LoadedState> {
    let model = resolve_model(input_model);

    let Some(features) = training else {
        return Ok(LoadedState {
            model,
            training: None,
            num_classes: None,
        });
    };

    let training = resolve_training_set(features, labels)?;
    let num_classes = resolve_num_classes(number_of_classes, &training.labels);
    check_label_range(&training.labels, num_classes)?;
    info!(
        "Loaded {} training points with {} features and {} classes",
        training.num_points(),
        training.features.nrows(),
        num_classes
    );

    Ok(LoadedState {
        model,
        training: Some(training),
        num_classes: Some(num_classes),
    })
}
