//! Model serialization and persistence
//!
//! Models are stored as JSON: the hyperparameters, the parameter matrix in
//! row-major order and some metadata about how the file was produced.

use crate::core::{OptimizerChoice, Result, SVMError};
use crate::svm::LinearSvm;
use log::info;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a linear SVM model
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableModel {
    pub lambda: f64,
    pub delta: f64,
    pub fit_intercept: bool,
    pub num_classes: usize,
    /// `(D + intercept) x num_classes` weights
    pub parameters: SerializableMatrix,
    pub metadata: ModelMetadata,
}

/// Dense matrix in row-major order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

/// Model metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Creation timestamp
    pub created_at: String,
    /// Optimizer of the last training run, if the model was trained here
    #[serde(default)]
    pub optimizer: Option<String>,
}

impl From<&Array2<f64>> for SerializableMatrix {
    fn from(matrix: &Array2<f64>) -> Self {
        Self {
            rows: matrix.nrows(),
            cols: matrix.ncols(),
            data: matrix.iter().copied().collect(),
        }
    }
}

impl SerializableMatrix {
    pub fn to_array(&self) -> Result<Array2<f64>> {
        Array2::from_shape_vec((self.rows, self.cols), self.data.clone()).map_err(|_| {
            SVMError::SerializationError(format!(
                "parameter matrix declares {}x{} but holds {} values",
                self.rows,
                self.cols,
                self.data.len()
            ))
        })
    }
}

impl SerializableModel {
    /// Capture `model` together with the optimizer that produced it
    pub fn from_model(model: &LinearSvm, optimizer: Option<OptimizerChoice>) -> Self {
        Self {
            lambda: model.lambda(),
            delta: model.delta(),
            fit_intercept: model.fit_intercept(),
            num_classes: model.num_classes(),
            parameters: SerializableMatrix::from(model.parameters()),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
                optimizer: optimizer.map(|choice| choice.to_string()),
            },
        }
    }

    /// Rebuild the model
    pub fn to_model(&self) -> Result<LinearSvm> {
        LinearSvm::from_parts(
            self.lambda,
            self.delta,
            self.fit_intercept,
            self.num_classes,
            self.parameters.to_array()?,
        )
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SVMError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Log a short model summary
    pub fn log_summary(&self) {
        info!(
            "Model: {} classes, {}x{} parameters, intercept {}",
            self.num_classes,
            self.parameters.rows,
            self.parameters.cols,
            if self.fit_intercept { "on" } else { "off" }
        );
        info!("Lambda: {}, delta: {}", self.lambda, self.delta);
        info!(
            "Created {} by version {} ({})",
            self.metadata.created_at,
            self.metadata.library_version,
            self.metadata.optimizer.as_deref().unwrap_or("untrained")
        );
    }
}
