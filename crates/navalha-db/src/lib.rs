//! Navalha Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the Navalha scheduling backend. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for all domain entities
//! - Transaction support for the operations that must be atomic
//!   (slot-checked booking, loyalty increment plus voucher issuance,
//!   config activation)
//! - A best-effort audit sink

pub mod audit_sink;
pub mod pool;
pub mod repositories;

pub use audit_sink::PgAuditSink;
pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use navalha_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
