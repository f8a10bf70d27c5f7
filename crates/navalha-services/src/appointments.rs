//! Appointment lifecycle service
//!
//! Books appointments, enforces the status state machine per caller role,
//! triggers the loyalty ledger on completion and runs the maintenance
//! sweep over stale scheduled appointments.

use crate::constants::AUTO_CANCEL_REASON;
use crate::loyalty::LoyaltyService;
use chrono::{DateTime, Utc};
use navalha_core::{
    models::{Actor, Appointment, AppointmentStatus, AuditEvent, NewAppointment},
    policy,
    traits::{
        AppointmentRepository, AuditSink, LoyaltyRepository, StaffRepository,
        VoucherConfigRepository,
    },
    AppError, AppResult, Clock,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Appointment lifecycle manager
pub struct AppointmentManager<A, S, L, C> {
    appointments: Arc<A>,
    staff: Arc<S>,
    loyalty: LoyaltyService<L, C>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl<A, S, L, C> AppointmentManager<A, S, L, C>
where
    A: AppointmentRepository,
    S: StaffRepository,
    L: LoyaltyRepository,
    C: VoucherConfigRepository,
{
    /// Create a new appointment manager
    pub fn new(
        appointments: Arc<A>,
        staff: Arc<S>,
        loyalty: LoyaltyService<L, C>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            staff,
            loyalty,
            audit,
            clock,
        }
    }

    /// Book an appointment.
    ///
    /// Fails with `NotFound` if the staff member does not exist,
    /// `Unavailable` if they are not accepting bookings and `SlotConflict`
    /// if the slot already holds an active appointment. On success the
    /// appointment starts in `Scheduled`.
    #[instrument(skip(self, new))]
    pub async fn create(&self, actor: &Actor, new: NewAppointment) -> AppResult<Appointment> {
        let staff = self
            .staff
            .find_by_id(new.staff_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("staff member {}", new.staff_id)))?;

        if !staff.available {
            return Err(AppError::Unavailable(staff.display_name));
        }

        let now = self.clock.now();
        let appointment = Appointment::new(new, now);
        let created = self.appointments.create(&appointment).await?;

        info!(
            "Appointment {} booked: staff {} at {} {}",
            created.id, created.staff_id, created.date, created.start_time
        );

        self.audit
            .record(
                AuditEvent::new("appointment.create", "appointment", now)
                    .actor(actor.id)
                    .resource_id(created.id)
                    .details(json!({
                        "staff_id": created.staff_id,
                        "date": created.date,
                        "start_time": created.start_time,
                    })),
            )
            .await;

        Ok(created)
    }

    /// Change an appointment's status.
    ///
    /// The caller must be authorized for this appointment and the
    /// transition must be legal for the current status. A transition into
    /// `Completed` records the service with the loyalty ledger exactly
    /// once, using the appointment's price (zero when absent).
    #[instrument(skip(self, notes))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        new_status: AppointmentStatus,
        notes: Option<String>,
        price: Option<Decimal>,
    ) -> AppResult<Appointment> {
        let appointment = self
            .appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("appointment {}", id)))?;

        if !policy::can_update_appointment(actor, &appointment) {
            return Err(AppError::Forbidden);
        }

        if !appointment.status.can_transition_to(new_status) {
            return Err(AppError::InvalidState(format!(
                "cannot move appointment from {} to {}",
                appointment.status, new_status
            )));
        }

        let now = self.clock.now();
        let updated = self
            .appointments
            .update_status_checked(
                id,
                appointment.status,
                new_status,
                notes.as_deref(),
                price,
                now,
            )
            .await?
            .ok_or_else(|| {
                // Lost a race against a concurrent transition
                AppError::InvalidState(format!(
                    "appointment {} was modified concurrently",
                    id
                ))
            })?;

        // The conditional update above guarantees this runs at most once
        // per appointment lifetime. The appointment is already terminal at
        // this point: a ledger failure here leaves the count short and the
        // error below is the only trace, so it carries the ids needed for
        // reconciliation.
        if new_status == AppointmentStatus::Completed {
            let amount = updated.price.unwrap_or(Decimal::ZERO);
            self.loyalty
                .record_completed_service(updated.client_id, amount)
                .await
                .map_err(|e| {
                    error!(
                        "Ledger update failed for completed appointment {} (client {}): {}",
                        id, updated.client_id, e
                    );
                    e
                })?;
        }

        info!(
            "Appointment {} moved from {} to {}",
            id, appointment.status, new_status
        );

        self.audit
            .record(
                AuditEvent::new("appointment.update_status", "appointment", now)
                    .actor(actor.id)
                    .resource_id(id)
                    .details(json!({
                        "from": appointment.status,
                        "to": new_status,
                    })),
            )
            .await;

        Ok(updated)
    }

    /// Delete an appointment. Administrators only.
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        if !policy::can_delete_appointment(actor) {
            return Err(AppError::Forbidden);
        }

        if !self.appointments.delete(id).await? {
            return Err(AppError::NotFound(format!("appointment {}", id)));
        }

        info!("Appointment {} deleted by {}", id, actor.id);

        self.audit
            .record(
                AuditEvent::new("appointment.delete", "appointment", self.clock.now())
                    .actor(actor.id)
                    .resource_id(id),
            )
            .await;

        Ok(())
    }

    /// Find an appointment by id
    pub async fn find(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        self.appointments.find_by_id(id).await
    }

    /// Appointments belonging to a client
    pub async fn list_for_client(&self, client_id: Uuid) -> AppResult<Vec<Appointment>> {
        self.appointments.list_by_client(client_id).await
    }

    /// Appointments assigned to a staff member
    pub async fn list_for_staff(&self, staff_id: Uuid) -> AppResult<Vec<Appointment>> {
        self.appointments.list_by_staff(staff_id).await
    }

    /// Cancel every scheduled appointment dated strictly before `now`.
    ///
    /// Each cancellation is conditional on the appointment still being
    /// `Scheduled`, so the sweep is idempotent and safe to run
    /// concurrently. Returns the number of appointments cancelled.
    #[instrument(skip(self))]
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let candidates = self
            .appointments
            .find_stale_scheduled(now.date_naive())
            .await?;

        let mut cancelled = 0u64;
        for appointment in candidates {
            let note = appointment.annotated_notes(&format!(
                "Automatically cancelled on {}: {}",
                now.date_naive(),
                AUTO_CANCEL_REASON
            ));

            let result = self
                .appointments
                .update_status_checked(
                    appointment.id,
                    AppointmentStatus::Scheduled,
                    AppointmentStatus::Cancelled,
                    Some(&note),
                    None,
                    now,
                )
                .await?;

            match result {
                Some(_) => {
                    cancelled += 1;
                    self.audit
                        .record(
                            AuditEvent::new("appointment.auto_cancel", "appointment", now)
                                .resource_id(appointment.id)
                                .details(json!({ "date": appointment.date })),
                        )
                        .await;
                }
                None => {
                    // Someone transitioned it between the scan and the update
                    warn!(
                        "Stale appointment {} changed status before the sweep reached it",
                        appointment.id
                    );
                }
            }
        }

        if cancelled > 0 {
            info!("Maintenance sweep cancelled {} stale appointments", cancelled);
        }

        Ok(cancelled)
    }
}
