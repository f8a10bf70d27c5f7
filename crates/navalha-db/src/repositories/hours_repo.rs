//! Business hours repository implementation
//!
//! The weekly schedule is a singleton row stored as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use navalha_core::{
    models::WeeklySchedule, traits::BusinessHoursRepository, AppError, AppResult,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of BusinessHoursRepository
pub struct PgBusinessHoursRepository {
    pool: PgPool,
}

impl PgBusinessHoursRepository {
    /// Create a new business hours repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessHoursRepository for PgBusinessHoursRepository {
    #[instrument(skip(self))]
    async fn get(&self) -> AppResult<Option<WeeklySchedule>> {
        debug!("Fetching weekly schedule");

        let row: Option<(JsonValue,)> =
            sqlx::query_as("SELECT schedule FROM business_hours WHERE id = 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error fetching business hours: {}", e);
                    AppError::Database(format!("Failed to fetch business hours: {}", e))
                })?;

        match row {
            Some((value,)) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, schedule))]
    async fn put(&self, schedule: &WeeklySchedule, now: DateTime<Utc>) -> AppResult<()> {
        debug!("Replacing weekly schedule");

        let value = serde_json::to_value(schedule)?;

        sqlx::query(
            r#"
            INSERT INTO business_hours (id, schedule, updated_at)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE
            SET schedule = EXCLUDED.schedule,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error storing business hours: {}", e);
            AppError::Database(format!("Failed to store business hours: {}", e))
        })?;

        Ok(())
    }
}
