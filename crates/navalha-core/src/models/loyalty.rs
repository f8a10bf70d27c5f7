//! Loyalty ledger models
//!
//! Per-client running count of completed services and cumulative spend.
//! Created lazily on the first completed service, updated exactly once per
//! transition into `Completed`, never deleted.

use super::voucher::Voucher;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-client service counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientServiceCount {
    /// Owning client
    pub client_id: Uuid,

    /// Number of completed appointments
    pub completed_services: i32,

    /// Cumulative amount paid across completed appointments
    pub total_spent: Decimal,

    /// Instant of the most recent completed service
    pub last_service_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ClientServiceCount {
    /// Fresh zeroed counter for a client
    pub fn new(client_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            client_id,
            completed_services: 0,
            total_spent: Decimal::ZERO,
            last_service_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply one completed service
    pub fn record(&mut self, amount_paid: Decimal, now: DateTime<Utc>) {
        self.completed_services += 1;
        self.total_spent += amount_paid;
        self.last_service_at = Some(now);
        self.updated_at = now;
    }

    /// Whether the post-increment count lands exactly on a multiple of the
    /// threshold. Checked after [`record`](Self::record), so the very first
    /// qualifying service (count == threshold) crosses.
    pub fn crossed_threshold(&self, services_required: i32) -> bool {
        services_required > 0
            && self.completed_services > 0
            && self.completed_services % services_required == 0
    }
}

/// Result of recording a completed service
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// The updated counter
    pub count: ClientServiceCount,

    /// Voucher minted on this completion, if a threshold was crossed
    pub voucher: Option<Voucher>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_increments() {
        let now = Utc::now();
        let mut count = ClientServiceCount::new(Uuid::new_v4(), now);

        count.record(dec!(35.00), now);
        assert_eq!(count.completed_services, 1);
        assert_eq!(count.total_spent, dec!(35.00));
        assert_eq!(count.last_service_at, Some(now));

        count.record(dec!(0.00), now);
        assert_eq!(count.completed_services, 2);
        assert_eq!(count.total_spent, dec!(35.00));
    }

    #[test]
    fn test_threshold_on_exact_multiples() {
        let now = Utc::now();
        let mut count = ClientServiceCount::new(Uuid::new_v4(), now);

        for expected in [false, false, false, false, true, false, false, false, false, true] {
            count.record(dec!(10.00), now);
            assert_eq!(count.crossed_threshold(5), expected);
        }
    }

    #[test]
    fn test_threshold_guards() {
        let now = Utc::now();
        let count = ClientServiceCount::new(Uuid::new_v4(), now);

        // Zero completed services never crosses, whatever the threshold
        assert!(!count.crossed_threshold(1));
        assert!(!count.crossed_threshold(0));
    }
}
