use thiserror::Error;

/// Result type for rtscene operations
pub type Result<T> = std::result::Result<T, RtError>;

/// Error types for rtscene operations
#[derive(Error, Debug)]
pub enum RtError {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Tag not found in DICOM file
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// Invalid tag value
    #[error("Invalid tag value: {0}")]
    InvalidValue(String),

    /// Loadable handed to the import entry point is unusable (no files, no name)
    #[error("Invalid loadable: {0}")]
    InvalidLoadable(String),

    /// Generic volume loader could not produce a scalar grid
    #[error("Volume load error: {0}")]
    VolumeLoad(String),

    /// Scene graph rejected an operation
    #[error("Scene error: {0}")]
    Scene(String),

    /// Generic import error
    #[error("Import error: {0}")]
    ImportError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for RtError {
    fn from(s: String) -> Self {
        RtError::ImportError(s)
    }
}

impl From<&str> for RtError {
    fn from(s: &str) -> Self {
        RtError::ImportError(s.to_string())
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for RtError {
    fn from(e: dicom_object::ReadError) -> Self {
        RtError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for RtError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        RtError::InvalidValue(format!("{}", e))
    }
}
