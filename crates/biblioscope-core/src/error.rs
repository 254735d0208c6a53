use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur in biblioscope-core.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("No catalogue file (*.{extension}) found in: {dir}")]
    CatalogueNotFound { dir: PathBuf, extension: String },

    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("XML error in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),

    #[error("Invalid tag range: {0}")]
    InvalidTagRange(String),

    #[error("Invalid path query: {0}")]
    InvalidQuery(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ReconError {
    pub(crate) fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Process exit code the CLI should use for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::CatalogueNotFound { .. } | Self::DirectoryNotFound(_) => ExitCode::NotFound,
            Self::InvalidRecordId(_)
            | Self::InvalidTagRange(_)
            | Self::InvalidQuery(_)
            | Self::Config(_)
            | Self::TomlParse(_) => ExitCode::InvalidArgs,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
}

pub type Result<T> = std::result::Result<T, ReconError>;
