//! Availability calculator
//!
//! Derives the open 30-minute slots of a date from the weekly schedule and
//! the appointments already booked. Pure with respect to the store: nothing
//! is mutated.

use crate::constants::SLOT_MINUTES;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use navalha_core::{
    models::{DayHours, WeeklySchedule},
    traits::{AppointmentRepository, BusinessHoursRepository},
    AppError, AppResult,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Candidate slot start times for one day's hours, at fixed granularity,
/// exclusive of the closing time itself.
pub fn slot_grid(hours: DayHours) -> Vec<NaiveTime> {
    let step = Duration::minutes(SLOT_MINUTES);
    let mut slots = Vec::new();
    let mut t = hours.open;

    while t < hours.close {
        slots.push(t);
        let (next, wrapped) = t.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        t = next;
    }

    slots
}

/// Availability calculator over the schedule and appointment stores
pub struct AvailabilityService<H, A> {
    hours: Arc<H>,
    appointments: Arc<A>,
}

impl<H, A> AvailabilityService<H, A>
where
    H: BusinessHoursRepository,
    A: AppointmentRepository,
{
    /// Create a new availability service
    pub fn new(hours: Arc<H>, appointments: Arc<A>) -> Self {
        Self {
            hours,
            appointments,
        }
    }

    /// Open slots on a date, optionally restricted to one staff member.
    ///
    /// `date` is an ISO calendar date string; anything unparsable fails
    /// with `InvalidInput`. When no schedule was ever configured the
    /// hard-coded default weekly schedule applies.
    #[instrument(skip(self))]
    pub async fn available_slots(
        &self,
        date: &str,
        staff_id: Option<Uuid>,
    ) -> AppResult<Vec<NaiveTime>> {
        let date: NaiveDate = date
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("malformed date: {}", date)))?;

        let schedule = self
            .hours
            .get()
            .await?
            .unwrap_or_else(WeeklySchedule::default_schedule);

        let Some(day) = schedule.for_day(date.weekday()) else {
            debug!("Closed on {}", date);
            return Ok(Vec::new());
        };

        let booked: HashSet<NaiveTime> = self
            .appointments
            .list_by_date(date, staff_id)
            .await?
            .into_iter()
            .filter(|a| a.status.is_active())
            .map(|a| a.start_time)
            .collect();

        let mut slots = slot_grid(day);
        slots.retain(|slot| !booked.contains(slot));

        debug!("{} open slots on {}", slots.len(), date);
        Ok(slots)
    }
}
