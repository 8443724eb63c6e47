use std::path::PathBuf;

use thiserror::Error;

/// Error types for segment extraction, resampling and derivative operations
#[derive(Debug, Error)]
pub enum DqdvError {
    /// Folder number missing from the discovered folder map
    #[error("folder {0} not found in cycle file map")]
    FolderNotFound(u32),
    /// Cycle is absent from the folder or has no valid segments
    #[error("cycle {cycle} not found among valid cycles of folder {folder}")]
    CycleNotFound { folder: u32, cycle: u32 },
    /// Expected file does not exist on disk
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Mode or kind string outside its recognized set
    #[error("invalid {what}: '{value}'")]
    InvalidParameter { what: &'static str, value: String },
    /// Pipeline configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Window size must be odd and at least 1
    #[error("invalid window size: {0}. Window size must be odd and at least 1")]
    InvalidWindowSize(usize),
    /// Polynomial order must be less than window size
    #[error("invalid polynomial order: {0}. Must be less than window size ({1})")]
    InvalidPolynomialOrder(usize, usize),
    /// Input data is too short for the specified window size
    #[error("insufficient data: {0} points. Need at least {1} points for window size {1}")]
    InsufficientData(usize, usize),
    /// Interpolation or differentiation attempted on too few points
    #[error("{operation} needs at least {required} distinct points, got {actual}")]
    TooFewPoints {
        operation: &'static str,
        required: usize,
        actual: usize,
    },
    /// Mathematical computation error (e.g., singular matrix)
    #[error("computation error: {0}")]
    ComputationError(String),

    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for battery-dqdv operations
pub type Result<T> = std::result::Result<T, DqdvError>;
