//! Role-based authorization policy
//!
//! One shared capability check per operation; services consult these
//! instead of branching on roles at call sites.

use crate::models::{Actor, Appointment, AppointmentStatus, Role, Voucher};

/// Whether the actor may change the status of this appointment.
///
/// Administrators may transition any appointment; staff only appointments
/// assigned to them; clients only their own appointment and only while it
/// is not completed.
pub fn can_update_appointment(actor: &Actor, appointment: &Appointment) -> bool {
    match actor.role {
        Role::SuperAdmin | Role::Admin => true,
        Role::Barbeiro => appointment.staff_id == actor.id,
        Role::Cliente => {
            appointment.client_id == actor.id
                && appointment.status != AppointmentStatus::Completed
        }
    }
}

/// Whether the actor may delete appointments. Administrators only.
pub fn can_delete_appointment(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Whether the actor may edit the weekly business hours. Administrators only.
pub fn can_manage_business_hours(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Whether the actor may create voucher configurations. Administrators only.
pub fn can_configure_vouchers(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Whether the actor may redeem this voucher. Owners only.
pub fn can_redeem_voucher(actor: &Actor, voucher: &Voucher) -> bool {
    voucher.client_id == actor.id
}
