//! Business hours configuration
//!
//! A singleton weekly schedule: per weekday an optional open/close pair,
//! `None` meaning closed. When nothing is configured at all the system
//! falls back to [`WeeklySchedule::default_schedule`].

use crate::{AppError, AppResult};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Opening hours for a single weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DayHours {
    /// Create a validated open/close pair
    pub fn new(open: NaiveTime, close: NaiveTime) -> AppResult<Self> {
        if open >= close {
            return Err(AppError::InvalidInput(format!(
                "opening time {} must be before closing time {}",
                open, close
            )));
        }
        Ok(Self { open, close })
    }
}

/// Weekly schedule, Monday first
///
/// Mutated by administrators only; read by the availability calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    /// One entry per weekday, indexed Monday = 0 .. Sunday = 6
    days: [Option<DayHours>; 7],
}

impl WeeklySchedule {
    /// Schedule with every day closed
    pub fn closed() -> Self {
        Self { days: [None; 7] }
    }

    /// Hard-coded fallback: Mon-Fri 08:00-18:00, Sat 08:00-16:00, Sun closed
    pub fn default_schedule() -> Self {
        let open = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let weekday_close = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let saturday_close = NaiveTime::from_hms_opt(16, 0, 0).unwrap();

        let weekday = Some(DayHours {
            open,
            close: weekday_close,
        });
        let saturday = Some(DayHours {
            open,
            close: saturday_close,
        });

        Self {
            days: [weekday, weekday, weekday, weekday, weekday, saturday, None],
        }
    }

    /// Hours for a weekday, `None` if closed
    pub fn for_day(&self, weekday: Weekday) -> Option<DayHours> {
        self.days[weekday.num_days_from_monday() as usize]
    }

    /// Set (or clear) the hours for a weekday
    pub fn set(&mut self, weekday: Weekday, hours: Option<DayHours>) {
        self.days[weekday.num_days_from_monday() as usize] = hours;
    }
}
