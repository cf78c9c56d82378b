//! Error type definitions for the catalog engine
//!
//! This module defines all error types used throughout the crate, providing
//! a hierarchical error system that makes debugging and error handling more
//! straightforward. Per-line playlist malformations are not errors at all;
//! they degrade to documented defaults inside the parser.

use thiserror::Error;

/// Top-level catalog error type
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Source handling errors (transport, missing files, bad listings)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Offload channel errors (background parse task failed)
    #[error("Offload error: {message}")]
    Offload { message: String },

    /// Playback handoff errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Source handling specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// The source answered but with a non-success status
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// A source yielded no usable records
    #[error("Empty source: {source_name}")]
    Empty { source_name: String },

    /// Parsing errors for source data (whole-input failures only)
    #[error("Parse error: {source_type} - {message}")]
    ParseError {
        source_type: String,
        message: String,
    },

    /// Local asset could not be read
    #[error("Local asset unavailable: {path} - {message}")]
    LocalAsset { path: String, message: String },

    /// JSON listing errors
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Playback handoff specific errors
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Engine reported a fatal network error (recoverable in place)
    #[error("Fatal network error: {message}")]
    Network { message: String },

    /// Engine reported a fatal media error (recoverable in place)
    #[error("Fatal media error: {message}")]
    Media { message: String },

    /// Any other fatal engine error forces a teardown
    #[error("Fatal player error: {message}")]
    Other { message: String },
}

/// Convenience methods for creating common error types
impl CatalogError {
    /// Create an offload channel error
    pub fn offload<S: Into<String>>(message: S) -> Self {
        Self::Offload {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create an empty-source error
    pub fn empty<S: Into<String>>(source_name: S) -> Self {
        Self::Empty {
            source_name: source_name.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Create a local asset error
    pub fn local_asset<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::LocalAsset {
            path: path.into(),
            message: message.into(),
        }
    }
}
