//! Domain models for Navalha
//!
//! This module contains all the core domain models used throughout the application.

pub mod actor;
pub mod appointment;
pub mod audit;
pub mod hours;
pub mod loyalty;
pub mod voucher;

pub use actor::{Actor, Role, StaffMember};
pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use audit::AuditEvent;
pub use hours::{DayHours, WeeklySchedule};
pub use loyalty::{ClientServiceCount, CompletionOutcome};
pub use voucher::{generate_code, NewVoucherConfig, Voucher, VoucherConfig, VoucherStatus};
