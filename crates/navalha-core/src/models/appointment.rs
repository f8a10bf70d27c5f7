//! Appointment model and status state machine
//!
//! An appointment books one staff member for one 30-minute slot. Status
//! changes go through [`AppointmentStatus::can_transition_to`]; the two
//! terminal statuses never transition again.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked, awaiting confirmation
    #[default]
    Scheduled,
    /// Confirmed by staff or client
    Confirmed,
    /// Service underway
    InProgress,
    /// Service finished and counted toward loyalty
    Completed,
    /// Cancelled by a caller or the maintenance sweep
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl AppointmentStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "in_progress" => Some(AppointmentStatus::InProgress),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the appointment still occupies its slot
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled
                | AppointmentStatus::Confirmed
                | AppointmentStatus::InProgress
        )
    }

    /// Check if no further transition is permitted
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Statuses that block a slot
    pub fn active_statuses() -> [AppointmentStatus; 3] {
        [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress,
        ]
    }

    /// Check whether moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        match self {
            Scheduled => matches!(next, Confirmed | InProgress | Completed | Cancelled),
            Confirmed => matches!(next, InProgress | Completed | Cancelled),
            InProgress => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

/// Appointment entity
///
/// Lifecycle: created as `Scheduled` at booking, terminates at `Completed`
/// or `Cancelled`. The slot invariant holds over (staff_id, date,
/// start_time) for active statuses; the store enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier
    pub id: Uuid,

    /// Booking client
    pub client_id: Uuid,

    /// Assigned staff member
    pub staff_id: Uuid,

    /// Service requested (free-form, e.g. "corte", "barba")
    pub service_type: String,

    /// Calendar date of the slot
    pub date: NaiveDate,

    /// Slot start time
    pub start_time: NaiveTime,

    /// Current status
    pub status: AppointmentStatus,

    /// Price charged, set at completion at the latest
    pub price: Option<Decimal>,

    /// Free-form notes; the maintenance sweep appends to these
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Data required to book an appointment
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub client_id: Uuid,
    pub staff_id: Uuid,
    pub service_type: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub notes: Option<String>,
    pub price: Option<Decimal>,
}

impl Appointment {
    /// Create a new appointment in `Scheduled` status
    pub fn new(new: NewAppointment, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            staff_id: new.staff_id,
            service_type: new.service_type,
            date: new.date,
            start_time: new.start_time,
            status: AppointmentStatus::Scheduled,
            price: new.price,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Notes with an annotation appended on its own line
    pub fn annotated_notes(&self, annotation: &str) -> String {
        match self.notes.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, annotation),
            _ => annotation.to_string(),
        }
    }
}
