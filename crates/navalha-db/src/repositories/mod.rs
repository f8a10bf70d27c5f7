//! Repository implementations
//!
//! PostgreSQL-backed implementations of the storage traits defined in
//! `navalha-core`.

pub mod appointment_repo;
pub mod hours_repo;
pub mod loyalty_repo;
pub mod staff_repo;
pub mod voucher_config_repo;
pub mod voucher_repo;

pub use appointment_repo::PgAppointmentRepository;
pub use hours_repo::PgBusinessHoursRepository;
pub use loyalty_repo::PgLoyaltyRepository;
pub use staff_repo::PgStaffRepository;
pub use voucher_config_repo::PgVoucherConfigRepository;
pub use voucher_repo::PgVoucherRepository;
