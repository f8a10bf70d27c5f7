//! Staff directory repository implementation

use async_trait::async_trait;
use navalha_core::{models::StaffMember, traits::StaffRepository, AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of StaffRepository
pub struct PgStaffRepository {
    pool: PgPool,
}

impl PgStaffRepository {
    /// Create a new staff repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffRepository for PgStaffRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StaffMember>> {
        debug!("Finding staff member by id: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, StaffRow>(
            "SELECT id, display_name, available FROM staff_members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding staff member {}: {}", id, e);
            AppError::Database(format!("Failed to find staff member: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    id: Uuid,
    display_name: String,
    available: bool,
}

impl From<StaffRow> for StaffMember {
    fn from(row: StaffRow) -> Self {
        Self {
            id: row.id,
            display_name: row.display_name,
            available: row.available,
        }
    }
}
