//! Weekly schedule administration

use navalha_core::{
    models::{Actor, AuditEvent, WeeklySchedule},
    policy,
    traits::{AuditSink, BusinessHoursRepository},
    AppError, AppResult, Clock,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Business hours service over the schedule store
pub struct BusinessHoursService<H> {
    hours: Arc<H>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl<H> BusinessHoursService<H>
where
    H: BusinessHoursRepository,
{
    /// Create a new business hours service
    pub fn new(hours: Arc<H>, audit: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            hours,
            audit,
            clock,
        }
    }

    /// The effective weekly schedule. Falls back to the built-in default
    /// when none was ever configured.
    pub async fn schedule(&self) -> AppResult<WeeklySchedule> {
        Ok(self
            .hours
            .get()
            .await?
            .unwrap_or_else(WeeklySchedule::default_schedule))
    }

    /// Replace the weekly schedule. Administrators only.
    #[instrument(skip(self, schedule))]
    pub async fn set_schedule(&self, actor: &Actor, schedule: WeeklySchedule) -> AppResult<()> {
        if !policy::can_manage_business_hours(actor) {
            return Err(AppError::Forbidden);
        }

        let now = self.clock.now();
        self.hours.put(&schedule, now).await?;

        info!("Weekly schedule updated by {}", actor.id);

        self.audit
            .record(AuditEvent::new("business_hours.update", "business_hours", now).actor(actor.id))
            .await;

        Ok(())
    }
}
