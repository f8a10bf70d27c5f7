//! Common traits for repositories and the audit sink
//!
//! The store is the single shared mutable resource; these traits are the
//! abstract surface the services run against. Operations that must be
//! atomic as a unit (slot-checked insert, conditional status update,
//! loyalty increment plus voucher issuance) live here as single methods so
//! implementations can wrap them in one transaction.

use crate::error::AppError;
use crate::models::{
    Appointment, AppointmentStatus, AuditEvent, ClientServiceCount, CompletionOutcome,
    StaffMember, Voucher, VoucherConfig, WeeklySchedule,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Appointment storage
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Find appointment by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError>;

    /// Persist a new appointment, atomically checking the slot invariant:
    /// fails with `SlotConflict` if (staff, date, time) already holds an
    /// appointment in an active status.
    async fn create(&self, appointment: &Appointment) -> Result<Appointment, AppError>;

    /// Conditionally move an appointment from `from` to `to`, setting notes
    /// and price when supplied. Returns `None` when the row is no longer in
    /// `from`, leaving the appointment untouched.
    async fn update_status_checked(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        notes: Option<&str>,
        price: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<Option<Appointment>, AppError>;

    /// Delete appointment by id
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Appointments on a date, optionally for one staff member
    async fn list_by_date(
        &self,
        date: NaiveDate,
        staff_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppError>;

    /// Appointments belonging to a client
    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, AppError>;

    /// Appointments assigned to a staff member
    async fn list_by_staff(&self, staff_id: Uuid) -> Result<Vec<Appointment>, AppError>;

    /// Scheduled appointments dated strictly before `before`
    async fn find_stale_scheduled(&self, before: NaiveDate) -> Result<Vec<Appointment>, AppError>;
}

/// Singleton weekly schedule storage
#[async_trait]
pub trait BusinessHoursRepository: Send + Sync {
    /// The configured schedule, `None` when nothing was ever configured
    async fn get(&self) -> Result<Option<WeeklySchedule>, AppError>;

    /// Replace the schedule
    async fn put(&self, schedule: &WeeklySchedule, now: DateTime<Utc>) -> Result<(), AppError>;
}

/// Staff directory lookups
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Find a staff member by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StaffMember>, AppError>;
}

/// Loyalty ledger storage
#[async_trait]
pub trait LoyaltyRepository: Send + Sync {
    /// Current counter for a client
    async fn find_by_client(
        &self,
        client_id: Uuid,
    ) -> Result<Option<ClientServiceCount>, AppError>;

    /// Record one completed service: increment the counter (creating it if
    /// absent) and, when the post-increment count crosses `config`'s
    /// threshold, mint a voucher — all within one transaction.
    async fn record_completion(
        &self,
        client_id: Uuid,
        amount_paid: Decimal,
        config: Option<&VoucherConfig>,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, AppError>;
}

/// Voucher storage
#[async_trait]
pub trait VoucherRepository: Send + Sync {
    /// Find a voucher by redemption code
    async fn find_by_code(&self, code: &str) -> Result<Option<Voucher>, AppError>;

    /// Vouchers belonging to a client
    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Voucher>, AppError>;

    /// Persist a freshly issued voucher
    async fn create(&self, voucher: &Voucher) -> Result<Voucher, AppError>;

    /// Conditionally redeem: moves the voucher to `Used` only while it is
    /// still `Active`, recording `used_at` and the redeeming appointment.
    /// Returns `None` when the voucher is no longer active.
    async fn redeem_checked(
        &self,
        id: Uuid,
        appointment_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Option<Voucher>, AppError>;

    /// Move an active voucher to `Expired` (lazy expiry on access)
    async fn mark_expired(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), AppError>;
}

/// Voucher configuration storage
#[async_trait]
pub trait VoucherConfigRepository: Send + Sync {
    /// The currently active config, if any
    async fn active(&self) -> Result<Option<VoucherConfig>, AppError>;

    /// Deactivate whatever config is active and persist `config` as the new
    /// active one, in a single transaction.
    async fn activate(&self, config: &VoucherConfig) -> Result<VoucherConfig, AppError>;
}

/// Best-effort audit sink
///
/// Implementations must swallow their own failures; delivery never blocks
/// or fails the operation that produced the event.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}
