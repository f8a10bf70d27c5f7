//! Business logic services for Navalha
//!
//! This crate contains the services that orchestrate the scheduling and
//! loyalty operations over the abstract store.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service is generic over the repository traits it needs
//! - Repositories are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Audit events are emitted after the store operation commits and never
//!   affect the operation's outcome
//!
//! # Services
//!
//! - `AvailabilityService` - open-slot computation from hours and bookings
//! - `AppointmentManager` - booking, status transitions, deletion, sweep
//! - `LoyaltyService` - completed-service counting and voucher triggering
//! - `VoucherManager` - voucher issuance, redemption, configuration
//! - `BusinessHoursService` - weekly schedule administration

pub mod appointments;
pub mod availability;
pub mod hours;
pub mod loyalty;
pub mod vouchers;

pub use appointments::AppointmentManager;
pub use availability::AvailabilityService;
pub use hours::BusinessHoursService;
pub use loyalty::LoyaltyService;
pub use vouchers::VoucherManager;

/// Business logic constants
pub mod constants {
    /// Slot granularity in minutes
    pub const SLOT_MINUTES: i64 = 30;

    /// Reason recorded on appointments cancelled by the maintenance sweep
    pub const AUTO_CANCEL_REASON: &str = "appointment date passed while still scheduled";
}
