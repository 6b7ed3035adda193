//! Error types and handling for the `TravelMap` application

use thiserror::Error;

/// Main error type for the `TravelMap` application
#[derive(Error, Debug)]
pub enum TravelMapError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors (geocoder, tile servers)
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Map composition and encoding errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// A map export is already running
    #[error("An export is already in progress")]
    ExportBusy,

    /// Image encode/decode errors
    #[error("Image error: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TravelMapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelMapError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TravelMapError::Api { .. } => {
                "Unable to reach external services. Please check your internet connection."
                    .to_string()
            }
            TravelMapError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelMapError::Render { .. } => {
                "Map export failed while composing the image.".to_string()
            }
            TravelMapError::ExportBusy => {
                "An export is already in progress. Please wait for it to finish.".to_string()
            }
            TravelMapError::Image { .. } => "Image processing failed.".to_string(),
            TravelMapError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TravelMapError::General { message } => message.clone(),
        }
    }
}
