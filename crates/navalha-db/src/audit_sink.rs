//! PostgreSQL audit sink
//!
//! Best-effort insert into `audit_logs`. Failures are logged and swallowed
//! so the business operation that produced the event is never affected.

use async_trait::async_trait;
use navalha_core::{models::AuditEvent, traits::AuditSink};
use sqlx::PgPool;
use tracing::warn;

/// Audit sink writing to the `audit_logs` table
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    /// Create a new audit sink
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, event: AuditEvent) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (
                actor_id, action, resource_type, resource_id, details, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.actor_id)
        .bind(&event.action)
        .bind(&event.resource_type)
        .bind(&event.resource_id)
        .bind(&event.details)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!("Failed to insert audit log for {}: {}", event.action, e);
        }
    }
}
