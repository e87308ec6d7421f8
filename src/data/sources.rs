//! File-backed inputs and outputs of a run

use crate::api::{InputData, RunOutcome};
use crate::config::OutputRequest;
use crate::core::{InputPresence, Result};
use crate::data::matrix::{load_labels, load_matrix, save_labels, save_matrix};
use crate::persistence::SerializableModel;
use log::info;
use std::path::PathBuf;

/// Paths given for one run
#[derive(Debug, Clone, Default)]
pub struct DataSources {
    pub training: Option<PathBuf>,
    pub labels: Option<PathBuf>,
    pub input_model: Option<PathBuf>,
    pub output_model: Option<PathBuf>,
    pub test: Option<PathBuf>,
    pub test_labels: Option<PathBuf>,
    pub predictions: Option<PathBuf>,
    pub score: Option<PathBuf>,
}

impl InputPresence for DataSources {
    fn has_training(&self) -> bool {
        self.training.is_some()
    }

    fn has_labels(&self) -> bool {
        self.labels.is_some()
    }

    fn has_input_model(&self) -> bool {
        self.input_model.is_some()
    }

    fn has_test(&self) -> bool {
        self.test.is_some()
    }

    fn has_test_labels(&self) -> bool {
        self.test_labels.is_some()
    }
}

impl DataSources {
    /// Outputs these paths ask for
    pub fn output_request(&self) -> OutputRequest {
        OutputRequest {
            model: self.output_model.is_some(),
            predictions: self.predictions.is_some(),
            score: self.score.is_some(),
        }
    }

    /// Read every given input. Labels are only read alongside training data,
    /// test labels only alongside test data.
    pub fn load(&self) -> Result<InputData> {
        let mut data = InputData::new();

        if let Some(path) = &self.training {
            info!("Loading training data from: {path:?}");
            data.training = Some(load_matrix(path)?);
            if let Some(path) = &self.labels {
                info!("Loading training labels from: {path:?}");
                data.labels = Some(load_labels(path)?);
            }
        }

        if let Some(path) = &self.input_model {
            info!("Loading model from: {path:?}");
            let stored = SerializableModel::load_from_file(path)?;
            stored.log_summary();
            data.input_model = Some(stored.to_model()?);
        }

        if let Some(path) = &self.test {
            info!("Loading test data from: {path:?}");
            data.test = Some(load_matrix(path)?);
            if let Some(path) = &self.test_labels {
                info!("Loading test labels from: {path:?}");
                data.test_labels = Some(load_labels(path)?);
            }
        }

        Ok(data)
    }

    /// Write the requested outputs of a finished run
    pub fn persist(&self, outcome: &RunOutcome) -> Result<()> {
        if let Some(evaluation) = &outcome.evaluation {
            if let Some(path) = &self.predictions {
                save_labels(path, &evaluation.predictions)?;
                info!("Predictions saved to: {path:?}");
            }
            if let (Some(path), Some(scores)) = (&self.score, &evaluation.scores) {
                save_matrix(path, scores)?;
                info!("Class scores saved to: {path:?}");
            }
        }

        if let Some(path) = &self.output_model {
            let stored = SerializableModel::from_model(&outcome.model, outcome.optimizer);
            stored.save_to_file(path)?;
            info!("Model saved to: {path:?}");
        }

        Ok(())
    }
}
