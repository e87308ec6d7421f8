//! Data loading and saving
//!
//! Text matrices and label vectors, plus the file-backed inputs and outputs
//! of a command-line run.

pub mod matrix;
pub mod sources;

pub use self::matrix::*;
pub use self::sources::DataSources;
