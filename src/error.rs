//! Error types for palette extraction

use thiserror::Error;

/// Result type alias for palette extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// Image is empty, malformed, or could not be decoded to RGB triples
    #[error("Invalid input: {reason}")]
    InvalidInput {
        reason: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A caller-supplied parameter is out of its supported range
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// PNG or JSON encoding of an export failed
    #[error("Encoding error: {message}")]
    Encode {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl ExtractError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create an invalid input error that keeps the underlying decode error
    pub fn decode<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidInput {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    pub fn encode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Encode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Short message suitable for showing next to an upload control
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::InvalidInput { .. } => {
                "Could not read the image. Please upload a PNG or JPEG file.".to_string()
            }
            ExtractError::InvalidParameter { parameter, value } => {
                format!("Unsupported value for {parameter}: {value}")
            }
            _ => "Palette extraction failed. Please try with a different image.".to_string(),
        }
    }
}
