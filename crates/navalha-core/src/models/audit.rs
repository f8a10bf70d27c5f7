//! Audit event model
//!
//! Events describing who did what to which resource. Emitted by the
//! services after the store operation commits; delivery is best-effort and
//! never affects the outcome of the operation that produced the event.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// One auditable action
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Acting user, absent for system-initiated actions (maintenance sweep)
    pub actor_id: Option<Uuid>,

    /// Action performed, e.g. "appointment.create"
    pub action: String,

    /// Resource kind affected, e.g. "appointment", "voucher"
    pub resource_type: String,

    /// Affected resource id, if applicable
    pub resource_id: Option<String>,

    /// Additional details (JSON)
    pub details: Option<JsonValue>,

    /// When the action happened
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        action: impl Into<String>,
        resource_type: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor_id: None,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            details: None,
            occurred_at,
        }
    }

    pub fn actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn resource_id(mut self, resource_id: impl ToString) -> Self {
        self.resource_id = Some(resource_id.to_string());
        self
    }

    pub fn details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }
}
