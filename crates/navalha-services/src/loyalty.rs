//! Loyalty ledger service
//!
//! Counts completed services per client and triggers voucher issuance when
//! the running count lands on a multiple of the active config's threshold.

use navalha_core::{
    models::{ClientServiceCount, CompletionOutcome},
    traits::{LoyaltyRepository, VoucherConfigRepository},
    AppResult, Clock,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Loyalty ledger over the counter and config stores
pub struct LoyaltyService<L, C> {
    loyalty: Arc<L>,
    configs: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<L, C> Clone for LoyaltyService<L, C> {
    fn clone(&self) -> Self {
        Self {
            loyalty: Arc::clone(&self.loyalty),
            configs: Arc::clone(&self.configs),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L, C> LoyaltyService<L, C>
where
    L: LoyaltyRepository,
    C: VoucherConfigRepository,
{
    /// Create a new loyalty service
    pub fn new(loyalty: Arc<L>, configs: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            loyalty,
            configs,
            clock,
        }
    }

    /// Record one completed service for a client.
    ///
    /// Increments the counter (creating it lazily) and adds `amount_paid`
    /// to cumulative spend. When an active config exists and the
    /// post-increment count is an exact multiple of its threshold, a
    /// voucher is minted in the same store transaction. Without an active
    /// config the increment still happens.
    ///
    /// The modulo check runs against whatever config is active at
    /// completion time; changing `services_required` mid-progress neither
    /// resets nor rescales a client's count.
    #[instrument(skip(self))]
    pub async fn record_completed_service(
        &self,
        client_id: Uuid,
        amount_paid: Decimal,
    ) -> AppResult<CompletionOutcome> {
        let config = self.configs.active().await?;
        let outcome = self
            .loyalty
            .record_completion(client_id, amount_paid, config.as_ref(), self.clock.now())
            .await?;

        if let Some(voucher) = &outcome.voucher {
            info!(
                "Client {} reached {} completed services, voucher {} issued",
                client_id, outcome.count.completed_services, voucher.code
            );
        }

        Ok(outcome)
    }

    /// Current counter for a client, if any service was ever completed
    pub async fn client_count(&self, client_id: Uuid) -> AppResult<Option<ClientServiceCount>> {
        self.loyalty.find_by_client(client_id).await
    }
}
