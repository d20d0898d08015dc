use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Input is empty.")]
    EmptyInput,
    /// Converter exited non-zero; the diagnostic is shown to the user verbatim.
    #[error("{diagnostic}")]
    Conversion { diagnostic: String },
    #[error("Converter '{program}' is unavailable: {details}")]
    ConverterUnavailable { program: String, details: String },
    #[error("IO Error: {details}")]
    Io {
        source: std::io::Error,
        details: String, // Contextual information about the operation
    },
    #[error("Converter produced non-UTF-8 output: {0}")]
    NonUtf8Output(#[from] FromUtf8Error),
    #[error("Unknown format identifier: {0}")]
    UnknownFormat(String),
    #[error("Channel send error: {0}")]
    ChannelSend(String),
}

impl AppError {
    pub fn new_io_error(source: std::io::Error, details: impl Into<String>) -> Self {
        AppError::Io { source, details: details.into() }
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
