//! Navalha Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Navalha scheduling backend. It includes:
//!
//! - Domain models (Appointment, WeeklySchedule, Voucher, etc.)
//! - Status state machines for appointments and vouchers
//! - Role-based authorization policy
//! - Common traits for repositories and the audit sink
//! - Unified error handling
//! - Application configuration and an injectable clock

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod traits;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
