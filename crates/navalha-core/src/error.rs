//! Unified error handling for Navalha
//!
//! This module provides a single error type covering every failure the
//! scheduling core can report. Domain errors are distinct from the
//! infrastructure errors raised by the store.

use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// The request layer maps `error_code()` onto its own wire format.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Domain Errors ====================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Slot already booked: {0}")]
    SlotConflict(String),

    #[error("Staff member not accepting bookings: {0}")]
    Unavailable(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Voucher expired: {0}")]
    Expired(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the stable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden => "forbidden",
            AppError::SlotConflict(_) => "slot_conflict",
            AppError::Unavailable(_) => "unavailable",
            AppError::InvalidState(_) => "invalid_state",
            AppError::Expired(_) => "expired",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error comes from the store rather than the domain
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Pool(_)
                | AppError::Transaction(_)
                | AppError::Internal(_)
                | AppError::Config(_)
                | AppError::Serialization(_)
        )
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
