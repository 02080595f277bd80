//! Error types for the DDNS updater
//!
//! Every error that reaches the polling loop is fatal: the engine stops and
//! hands the error to its caller instead of retrying.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Neither the override nor the system hostname produced a device name
    #[error("Unable to determine device name: {0}")]
    DeviceName(String),

    /// Hosted zone metadata could not be fetched
    #[error("Hosted zone lookup failed for {zone_id}: {message}")]
    ZoneLookup {
        /// Hosted zone identifier
        zone_id: String,
        /// Provider message
        message: String,
    },

    /// The change batch was rejected or could not be sent
    #[error("Change batch submission failed for {zone_id}: {message}")]
    ChangeSubmission {
        /// Hosted zone identifier
        zone_id: String,
        /// Provider message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a device name error
    pub fn device_name(msg: impl Into<String>) -> Self {
        Self::DeviceName(msg.into())
    }

    /// Create a hosted zone lookup error
    pub fn zone_lookup(zone_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ZoneLookup {
            zone_id: zone_id.into(),
            message: message.into(),
        }
    }

    /// Create a change batch submission error
    pub fn change_submission(zone_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChangeSubmission {
            zone_id: zone_id.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error ends the polling loop.
    ///
    /// Configuration and input errors are caught before the loop starts; the
    /// rest come out of a cycle and terminate it.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::InvalidInput(_))
    }
}
