//! In-memory store and recording audit sink shared by the service tests.
//!
//! `MemoryStore` implements every repository trait behind one mutex,
//! honoring the same conditional semantics the database implementations
//! provide (slot check on insert, compare-and-set status updates,
//! single-transaction loyalty increment).

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use navalha_core::{
    models::{
        Appointment, AppointmentStatus, AuditEvent, ClientServiceCount, CompletionOutcome,
        StaffMember, Voucher, VoucherConfig, VoucherStatus, WeeklySchedule,
    },
    traits::{
        AppointmentRepository, AuditSink, BusinessHoursRepository, LoyaltyRepository,
        StaffRepository, VoucherConfigRepository, VoucherRepository,
    },
    AppError,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct State {
    appointments: HashMap<Uuid, Appointment>,
    staff: HashMap<Uuid, StaffMember>,
    counts: HashMap<Uuid, ClientServiceCount>,
    vouchers: HashMap<Uuid, Voucher>,
    configs: Vec<VoucherConfig>,
    schedule: Option<WeeklySchedule>,
    loyalty_unavailable: bool,
}

/// One store backing every repository trait
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_staff(&self, id: Uuid, display_name: &str, available: bool) {
        self.state.lock().unwrap().staff.insert(
            id,
            StaffMember {
                id,
                display_name: display_name.to_string(),
                available,
            },
        );
    }

    pub fn insert_appointment(&self, appointment: Appointment) {
        self.state
            .lock()
            .unwrap()
            .appointments
            .insert(appointment.id, appointment);
    }

    pub fn insert_voucher(&self, voucher: Voucher) {
        self.state
            .lock()
            .unwrap()
            .vouchers
            .insert(voucher.id, voucher);
    }

    pub fn appointment(&self, id: Uuid) -> Option<Appointment> {
        self.state.lock().unwrap().appointments.get(&id).cloned()
    }

    pub fn voucher(&self, id: Uuid) -> Option<Voucher> {
        self.state.lock().unwrap().vouchers.get(&id).cloned()
    }

    pub fn find_count(&self, client_id: Uuid) -> Option<ClientServiceCount> {
        self.state.lock().unwrap().counts.get(&client_id).cloned()
    }

    /// Make subsequent loyalty writes fail, simulating a store outage
    pub fn set_loyalty_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().loyalty_unavailable = unavailable;
    }

    pub fn activate_config(&self, config: VoucherConfig) {
        let mut state = self.state.lock().unwrap();
        for existing in &mut state.configs {
            existing.active = false;
        }
        state.configs.push(config);
    }

    pub fn vouchers_for(&self, client_id: Uuid) -> Vec<Voucher> {
        self.state
            .lock()
            .unwrap()
            .vouchers
            .values()
            .filter(|v| v.client_id == client_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        Ok(self.state.lock().unwrap().appointments.get(&id).cloned())
    }

    async fn create(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        let mut state = self.state.lock().unwrap();

        let conflict = state.appointments.values().any(|a| {
            a.staff_id == appointment.staff_id
                && a.date == appointment.date
                && a.start_time == appointment.start_time
                && a.status.is_active()
        });
        if conflict {
            return Err(AppError::SlotConflict(format!(
                "slot {} {} already booked",
                appointment.date, appointment.start_time
            )));
        }

        state
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn update_status_checked(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        notes: Option<&str>,
        price: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<Option<Appointment>, AppError> {
        let mut state = self.state.lock().unwrap();

        let Some(appointment) = state.appointments.get_mut(&id) else {
            return Ok(None);
        };
        if appointment.status != from {
            return Ok(None);
        }

        appointment.status = to;
        if let Some(notes) = notes {
            appointment.notes = Some(notes.to_string());
        }
        if let Some(price) = price {
            appointment.price = Some(price);
        }
        appointment.updated_at = now;

        Ok(Some(appointment.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .remove(&id)
            .is_some())
    }

    async fn list_by_date(
        &self,
        date: NaiveDate,
        staff_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .values()
            .filter(|a| a.date == date && staff_id.map_or(true, |s| a.staff_id == s))
            .cloned()
            .collect())
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .values()
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn list_by_staff(&self, staff_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .values()
            .filter(|a| a.staff_id == staff_id)
            .cloned()
            .collect())
    }

    async fn find_stale_scheduled(&self, before: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .values()
            .filter(|a| a.status == AppointmentStatus::Scheduled && a.date < before)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BusinessHoursRepository for MemoryStore {
    async fn get(&self) -> Result<Option<WeeklySchedule>, AppError> {
        Ok(self.state.lock().unwrap().schedule.clone())
    }

    async fn put(&self, schedule: &WeeklySchedule, _now: DateTime<Utc>) -> Result<(), AppError> {
        self.state.lock().unwrap().schedule = Some(schedule.clone());
        Ok(())
    }
}

#[async_trait]
impl StaffRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StaffMember>, AppError> {
        Ok(self.state.lock().unwrap().staff.get(&id).cloned())
    }
}

#[async_trait]
impl LoyaltyRepository for MemoryStore {
    async fn find_by_client(
        &self,
        client_id: Uuid,
    ) -> Result<Option<ClientServiceCount>, AppError> {
        Ok(self.state.lock().unwrap().counts.get(&client_id).cloned())
    }

    async fn record_completion(
        &self,
        client_id: Uuid,
        amount_paid: Decimal,
        config: Option<&VoucherConfig>,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, AppError> {
        let mut state = self.state.lock().unwrap();

        if state.loyalty_unavailable {
            return Err(AppError::Database("loyalty store unavailable".to_string()));
        }

        let mut count = state
            .counts
            .get(&client_id)
            .cloned()
            .unwrap_or_else(|| ClientServiceCount::new(client_id, now));
        count.record(amount_paid, now);
        state.counts.insert(client_id, count.clone());

        let voucher = match config {
            Some(config) if count.crossed_threshold(config.services_required) => {
                let voucher = Voucher::issue(client_id, config, now);
                state.vouchers.insert(voucher.id, voucher.clone());
                Some(voucher)
            }
            _ => None,
        };

        Ok(CompletionOutcome { count, voucher })
    }
}

#[async_trait]
impl VoucherRepository for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Voucher>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .vouchers
            .values()
            .find(|v| v.code == code)
            .cloned())
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Voucher>, AppError> {
        Ok(self.vouchers_for(client_id))
    }

    async fn create(&self, voucher: &Voucher) -> Result<Voucher, AppError> {
        self.state
            .lock()
            .unwrap()
            .vouchers
            .insert(voucher.id, voucher.clone());
        Ok(voucher.clone())
    }

    async fn redeem_checked(
        &self,
        id: Uuid,
        appointment_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Option<Voucher>, AppError> {
        let mut state = self.state.lock().unwrap();

        let Some(voucher) = state.vouchers.get_mut(&id) else {
            return Ok(None);
        };
        if voucher.status != VoucherStatus::Active {
            return Ok(None);
        }

        voucher.status = VoucherStatus::Used;
        voucher.used_at = Some(now);
        voucher.redeemed_appointment_id = appointment_id;
        voucher.updated_at = now;

        Ok(Some(voucher.clone()))
    }

    async fn mark_expired(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();

        if let Some(voucher) = state.vouchers.get_mut(&id) {
            if voucher.status == VoucherStatus::Active {
                voucher.status = VoucherStatus::Expired;
                voucher.updated_at = now;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl VoucherConfigRepository for MemoryStore {
    async fn active(&self) -> Result<Option<VoucherConfig>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .configs
            .iter()
            .find(|c| c.active)
            .cloned())
    }

    async fn activate(&self, config: &VoucherConfig) -> Result<VoucherConfig, AppError> {
        let mut state = self.state.lock().unwrap();

        for existing in &mut state.configs {
            existing.active = false;
        }

        let mut config = config.clone();
        config.active = true;
        state.configs.push(config.clone());
        Ok(config)
    }
}

/// Audit sink that remembers every event it received
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}
