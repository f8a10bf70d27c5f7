//! Voucher repository implementation
//!
//! Redemption and lazy expiry are conditional updates over the `active`
//! status, so a voucher can only ever leave `Active` once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use navalha_core::{
    models::{Voucher, VoucherStatus},
    traits::VoucherRepository,
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const VOUCHER_COLUMNS: &str = r#"
    id, client_id, config_id, code, discount_percentage,
    status, expires_at, used_at, redeemed_appointment_id,
    created_at, updated_at
"#;

/// PostgreSQL implementation of VoucherRepository
pub struct PgVoucherRepository {
    pool: PgPool,
}

impl PgVoucherRepository {
    /// Create a new voucher repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse voucher status from string
    fn parse_status(s: &str) -> VoucherStatus {
        VoucherStatus::from_str(s).unwrap_or(VoucherStatus::Active)
    }
}

#[async_trait]
impl VoucherRepository for PgVoucherRepository {
    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Voucher>> {
        debug!("Finding voucher by code");

        let row = sqlx::query_as::<sqlx::Postgres, VoucherRow>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding voucher: {}", e);
            AppError::Database(format!("Failed to find voucher: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_by_client(&self, client_id: Uuid) -> AppResult<Vec<Voucher>> {
        let rows = sqlx::query_as::<sqlx::Postgres, VoucherRow>(&format!(
            r#"
            SELECT {VOUCHER_COLUMNS}
            FROM vouchers
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing vouchers: {}", e);
            AppError::Database(format!("Failed to list vouchers: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, voucher))]
    async fn create(&self, voucher: &Voucher) -> AppResult<Voucher> {
        debug!("Creating voucher for client: {}", voucher.client_id);

        let row = sqlx::query_as::<sqlx::Postgres, VoucherRow>(&format!(
            r#"
            INSERT INTO vouchers (
                id, client_id, config_id, code, discount_percentage,
                status, expires_at, used_at, redeemed_appointment_id,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {VOUCHER_COLUMNS}
            "#
        ))
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
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating voucher: {}", e);
            AppError::Database(format!("Failed to create voucher: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn redeem_checked(
        &self,
        id: Uuid,
        appointment_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Voucher>> {
        debug!("Redeeming voucher: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, VoucherRow>(&format!(
            r#"
            UPDATE vouchers
            SET status = 'used',
                used_at = $3,
                redeemed_appointment_id = $2,
                updated_at = $3
            WHERE id = $1 AND status = 'active'
            RETURNING {VOUCHER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(appointment_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error redeeming voucher {}: {}", id, e);
            AppError::Database(format!("Failed to redeem voucher: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn mark_expired(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        debug!("Expiring voucher: {}", id);

        sqlx::query(
            r#"
            UPDATE vouchers
            SET status = 'expired',
                updated_at = $2
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error expiring voucher {}: {}", id, e);
            AppError::Database(format!("Failed to expire voucher: {}", e))
        })?;

        Ok(())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct VoucherRow {
    id: Uuid,
    client_id: Uuid,
    config_id: Uuid,
    code: String,
    discount_percentage: i32,
    status: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    redeemed_appointment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VoucherRow> for Voucher {
    fn from(row: VoucherRow) -> Self {
        Self {
            id: row.id,
            client_id: row.client_id,
            config_id: row.config_id,
            code: row.code,
            discount_percentage: row.discount_percentage,
            status: PgVoucherRepository::parse_status(&row.status),
            expires_at: row.expires_at,
            used_at: row.used_at,
            redeemed_appointment_id: row.redeemed_appointment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(
            PgVoucherRepository::parse_status("active"),
            VoucherStatus::Active
        );
        assert_eq!(
            PgVoucherRepository::parse_status("used"),
            VoucherStatus::Used
        );
        assert_eq!(
            PgVoucherRepository::parse_status("expired"),
            VoucherStatus::Expired
        );
    }
}
