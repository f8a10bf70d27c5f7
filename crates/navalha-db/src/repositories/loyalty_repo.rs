//! Loyalty ledger repository implementation
//!
//! `record_completion` runs the counter upsert and any voucher issuance in
//! one transaction, so a crash can never leave a crossed threshold without
//! its voucher. The increment is relative arithmetic inside the upsert
//! itself (`completed_services + 1`), so concurrent completions serialize
//! on the primary key and each one lands; a `FOR UPDATE` pre-read cannot
//! do this because there is no row to lock on the first completion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use navalha_core::{
    models::{ClientServiceCount, CompletionOutcome, Voucher, VoucherConfig},
    traits::LoyaltyRepository,
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of LoyaltyRepository
pub struct PgLoyaltyRepository {
    pool: PgPool,
}

impl PgLoyaltyRepository {
    /// Create a new loyalty repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoyaltyRepository for PgLoyaltyRepository {
    #[instrument(skip(self))]
    async fn find_by_client(&self, client_id: Uuid) -> AppResult<Option<ClientServiceCount>> {
        debug!("Finding service count for client: {}", client_id);

        let row = sqlx::query_as::<sqlx::Postgres, CountRow>(
            r#"
            SELECT client_id, completed_services, total_spent,
                   last_service_at, created_at, updated_at
            FROM client_service_counts
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding service count: {}", e);
            AppError::Database(format!("Failed to find service count: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, config))]
    async fn record_completion(
        &self,
        client_id: Uuid,
        amount_paid: Decimal,
        config: Option<&VoucherConfig>,
        now: DateTime<Utc>,
    ) -> AppResult<CompletionOutcome> {
        debug!(
            "Recording completed service for client {}: {}",
            client_id, amount_paid
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Relative increment in the upsert: the conflicting insert of a
        // concurrent completion blocks on the row and then applies its own
        // +1 on top, so no increment is ever lost.
        let row = sqlx::query_as::<sqlx::Postgres, CountRow>(
            r#"
            INSERT INTO client_service_counts (
                client_id, completed_services, total_spent,
                last_service_at, created_at, updated_at
            )
            VALUES ($1, 1, $2, $3, $3, $3)
            ON CONFLICT (client_id) DO UPDATE
            SET completed_services = client_service_counts.completed_services + 1,
                total_spent = client_service_counts.total_spent + EXCLUDED.total_spent,
                last_service_at = EXCLUDED.last_service_at,
                updated_at = EXCLUDED.updated_at
            RETURNING client_id, completed_services, total_spent,
                      last_service_at, created_at, updated_at
            "#,
        )
        .bind(client_id)
        .bind(amount_paid)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error upserting service count: {}", e);
            AppError::Database(format!("Failed to update service count: {}", e))
        })?;

        let count: ClientServiceCount = row.into();

        // Threshold check uses the post-increment count
        let voucher = match config {
            Some(cfg) if count.crossed_threshold(cfg.services_required) => {
                let voucher = Voucher::issue(client_id, cfg, now);

                sqlx::query(
                    r#"
                    INSERT INTO vouchers (
                        id, client_id, config_id, code, discount_percentage,
                        status, expires_at, used_at, redeemed_appointment_id,
                        created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    "#,
                )
                .bind(voucher.id)
                .bind(voucher.client_id)
                .bind(voucher.config_id)
                .bind(&voucher.code)
                .bind(voucher.discount_percentage)
                .bind(voucher.status.to_string())
                .bind(voucher.expires_at)
                .bind(voucher.used_at)
                .bind(voucher.redeemed_appointment_id)
                .bind(voucher.created_at)
                .bind(voucher.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Database error issuing voucher: {}", e);
                    AppError::Database(format!("Failed to issue voucher: {}", e))
                })?;

                info!(
                    "Issued voucher {} to client {} at {} completed services",
                    voucher.code, client_id, count.completed_services
                );

                Some(voucher)
            }
            _ => None,
        };

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(CompletionOutcome { count, voucher })
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct CountRow {
    client_id: Uuid,
    completed_services: i32,
    total_spent: Decimal,
    last_service_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CountRow> for ClientServiceCount {
    fn from(row: CountRow) -> Self {
        Self {
            client_id: row.client_id,
            completed_services: row.completed_services,
            total_spent: row.total_spent,
            last_service_at: row.last_service_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
