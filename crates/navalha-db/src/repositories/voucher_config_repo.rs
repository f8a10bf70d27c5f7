//! Voucher configuration repository implementation
//!
//! Activation deactivates the previous config and inserts the new one in a
//! single transaction, keeping the at-most-one-active invariant a hard
//! guarantee (a partial unique index on `active` backs it up).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use navalha_core::{
    models::VoucherConfig, traits::VoucherConfigRepository, AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const CONFIG_COLUMNS: &str = r#"
    id, services_required, discount_percentage, validity_days,
    description, active, created_at, updated_at
"#;

/// PostgreSQL implementation of VoucherConfigRepository
pub struct PgVoucherConfigRepository {
    pool: PgPool,
}

impl PgVoucherConfigRepository {
    /// Create a new voucher config repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoucherConfigRepository for PgVoucherConfigRepository {
    #[instrument(skip(self))]
    async fn active(&self) -> AppResult<Option<VoucherConfig>> {
        debug!("Fetching active voucher config");

        let row = sqlx::query_as::<sqlx::Postgres, ConfigRow>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM voucher_configs WHERE active LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching voucher config: {}", e);
            AppError::Database(format!("Failed to fetch voucher config: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, config))]
    async fn activate(&self, config: &VoucherConfig) -> AppResult<VoucherConfig> {
        debug!("Activating voucher config: {}", config.id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        sqlx::query(
            r#"
            UPDATE voucher_configs
            SET active = FALSE,
                updated_at = $1
            WHERE active
            "#,
        )
        .bind(config.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error deactivating configs: {}", e);
            AppError::Database(format!("Failed to deactivate configs: {}", e))
        })?;

        let row = sqlx::query_as::<sqlx::Postgres, ConfigRow>(&format!(
            r#"
            INSERT INTO voucher_configs (
                id, services_required, discount_percentage, validity_days,
                description, active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(config.id)
        .bind(config.services_required)
        .bind(config.discount_percentage)
        .bind(config.validity_days)
        .bind(&config.description)
        .bind(config.active)
        .bind(config.created_at)
        .bind(config.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error creating voucher config: {}", e);
            AppError::Database(format!("Failed to create voucher config: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Voucher config {} active: {} services, {}% off, {} days validity",
            config.id, config.services_required, config.discount_percentage, config.validity_days
        );

        Ok(row.into())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ConfigRow {
    id: Uuid,
    services_required: i32,
    discount_percentage: i32,
    validity_days: i32,
    description: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConfigRow> for VoucherConfig {
    fn from(row: ConfigRow) -> Self {
        Self {
            id: row.id,
            services_required: row.services_required,
            discount_percentage: row.discount_percentage,
            validity_days: row.validity_days,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
