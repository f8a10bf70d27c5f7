//! Appointment repository implementation
//!
//! Provides PostgreSQL-backed storage for appointments. The slot invariant
//! is enforced twice: a locked pre-check inside the insert transaction and
//! a partial unique index on (staff_id, date, start_time) over active
//! statuses, so a concurrent booking of the same slot loses with
//! `SlotConflict` rather than racing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use navalha_core::{
    models::{Appointment, AppointmentStatus},
    traits::AppointmentRepository,
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = r#"
    id, client_id, staff_id, service_type,
    date, start_time, status, price, notes,
    created_at, updated_at
"#;

/// PostgreSQL implementation of AppointmentRepository
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    /// Create a new appointment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse appointment status from string
    fn parse_status(s: &str) -> AppointmentStatus {
        AppointmentStatus::from_str(s).unwrap_or(AppointmentStatus::Scheduled)
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        debug!("Finding appointment by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding appointment {}: {}", id, e);
            AppError::Database(format!("Failed to find appointment: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, appointment))]
    async fn create(&self, appointment: &Appointment) -> AppResult<Appointment> {
        debug!(
            "Creating appointment for staff {} at {} {}",
            appointment.staff_id, appointment.date, appointment.start_time
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Lock any appointment already holding the slot
        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM appointments
            WHERE staff_id = $1
                AND date = $2
                AND start_time = $3
                AND status IN ('scheduled', 'confirmed', 'in_progress')
            FOR UPDATE
            "#,
        )
        .bind(appointment.staff_id)
        .bind(appointment.date)
        .bind(appointment.start_time)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error checking slot: {}", e);
            AppError::Database(format!("Failed to check slot: {}", e))
        })?;

        if existing.is_some() {
            warn!(
                "Slot conflict for staff {} at {} {}",
                appointment.staff_id, appointment.date, appointment.start_time
            );
            return Err(AppError::SlotConflict(format!(
                "staff {} already booked at {} {}",
                appointment.staff_id, appointment.date, appointment.start_time
            )));
        }

        let row = sqlx::query_as::<sqlx::Postgres, AppointmentRow>(&format!(
            r#"
            INSERT INTO appointments (
                id, client_id, staff_id, service_type,
                date, start_time, status, price, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(appointment.id)
        .bind(appointment.client_id)
        .bind(appointment.staff_id)
        .bind(&appointment.service_type)
        .bind(appointment.date)
        .bind(appointment.start_time)
        .bind(appointment.status.to_string())
        .bind(appointment.price)
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::SlotConflict(
                format!(
                    "staff {} already booked at {} {}",
                    appointment.staff_id, appointment.date, appointment.start_time
                ),
            ),
            _ => {
                error!("Database error creating appointment: {}", e);
                AppError::Database(format!("Failed to create appointment: {}", e))
            }
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, notes))]
    async fn update_status_checked(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        notes: Option<&str>,
        price: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>> {
        debug!("Updating appointment {} status {} -> {}", id, from, to);

        let row = sqlx::query_as::<sqlx::Postgres, AppointmentRow>(&format!(
            r#"
            UPDATE appointments
            SET status = $3,
                notes = COALESCE($4, notes),
                price = COALESCE($5, price),
                updated_at = $6
            WHERE id = $1 AND status = $2
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from.to_string())
        .bind(to.to_string())
        .bind(notes)
        .bind(price)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating appointment {}: {}", id, e);
            AppError::Database(format!("Failed to update appointment: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting appointment: {}", id);

        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting appointment {}: {}", id, e);
                AppError::Database(format!("Failed to delete appointment: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_by_date(
        &self,
        date: NaiveDate,
        staff_id: Option<Uuid>,
    ) -> AppResult<Vec<Appointment>> {
        debug!("Listing appointments on {} (staff: {:?})", date, staff_id);

        let rows = sqlx::query_as::<sqlx::Postgres, AppointmentRow>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE date = $1
                AND ($2::UUID IS NULL OR staff_id = $2)
            ORDER BY start_time
            "#
        ))
        .bind(date)
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing appointments: {}", e);
            AppError::Database(format!("Failed to list appointments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_by_client(&self, client_id: Uuid) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<sqlx::Postgres, AppointmentRow>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE client_id = $1
            ORDER BY date DESC, start_time DESC
            "#
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing client appointments: {}", e);
            AppError::Database(format!("Failed to list appointments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_by_staff(&self, staff_id: Uuid) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<sqlx::Postgres, AppointmentRow>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE staff_id = $1
            ORDER BY date DESC, start_time DESC
            "#
        ))
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing staff appointments: {}", e);
            AppError::Database(format!("Failed to list appointments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_stale_scheduled(&self, before: NaiveDate) -> AppResult<Vec<Appointment>> {
        debug!("Finding scheduled appointments dated before {}", before);

        let rows = sqlx::query_as::<sqlx::Postgres, AppointmentRow>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE status = 'scheduled' AND date < $1
            ORDER BY date, start_time
            "#
        ))
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding stale appointments: {}", e);
            AppError::Database(format!("Failed to find stale appointments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: Uuid,
    client_id: Uuid,
    staff_id: Uuid,
    service_type: String,
    date: NaiveDate,
    start_time: NaiveTime,
    status: String,
    price: Option<Decimal>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Self {
            id: row.id,
            client_id: row.client_id,
            staff_id: row.staff_id,
            service_type: row.service_type,
            date: row.date,
            start_time: row.start_time,
            status: PgAppointmentRepository::parse_status(&row.status),
            price: row.price,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
