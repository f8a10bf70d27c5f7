//! Voucher lifecycle service
//!
//! Issues vouchers, redeems them exactly once with lazy expiry on access,
//! and manages the single active issuance configuration.

use navalha_core::{
    models::{Actor, AuditEvent, NewVoucherConfig, Voucher, VoucherConfig, VoucherStatus},
    policy,
    traits::{AppointmentRepository, AuditSink, VoucherConfigRepository, VoucherRepository},
    AppError, AppResult, Clock,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Voucher lifecycle manager
pub struct VoucherManager<V, C, A> {
    vouchers: Arc<V>,
    configs: Arc<C>,
    appointments: Arc<A>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl<V, C, A> VoucherManager<V, C, A>
where
    V: VoucherRepository,
    C: VoucherConfigRepository,
    A: AppointmentRepository,
{
    /// Create a new voucher manager
    pub fn new(
        vouchers: Arc<V>,
        configs: Arc<C>,
        appointments: Arc<A>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            vouchers,
            configs,
            appointments,
            audit,
            clock,
        }
    }

    /// Mint a voucher for a client under the given config
    #[instrument(skip(self, config))]
    pub async fn issue(&self, client_id: Uuid, config: &VoucherConfig) -> AppResult<Voucher> {
        let voucher = Voucher::issue(client_id, config, self.clock.now());
        let created = self.vouchers.create(&voucher).await?;

        info!("Voucher {} issued to client {}", created.code, client_id);
        Ok(created)
    }

    /// Redeem a voucher by code.
    ///
    /// Only the owning client may redeem, only while the voucher is
    /// `Active` and not past expiry; a voucher past its expiry is moved to
    /// `Expired` on the spot and the call fails with `Expired`. When an
    /// appointment is supplied it must exist and belong to the actor. A
    /// voucher is redeemable exactly once.
    #[instrument(skip(self))]
    pub async fn redeem(
        &self,
        actor: &Actor,
        code: &str,
        appointment_id: Option<Uuid>,
    ) -> AppResult<Voucher> {
        let voucher = self
            .vouchers
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("voucher {}", code)))?;

        if !policy::can_redeem_voucher(actor, &voucher) {
            return Err(AppError::Forbidden);
        }

        if voucher.status != VoucherStatus::Active {
            return Err(AppError::InvalidState(format!(
                "voucher {} is {}",
                code, voucher.status
            )));
        }

        let now = self.clock.now();
        if voucher.is_expired_at(now) {
            // Lazy expiry: materialize the state change, then report it
            self.vouchers.mark_expired(voucher.id, now).await?;
            warn!("Voucher {} expired on access", code);
            return Err(AppError::Expired(code.to_string()));
        }

        if let Some(appointment_id) = appointment_id {
            let appointment = self
                .appointments
                .find_by_id(appointment_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("appointment {}", appointment_id)))?;

            if appointment.client_id != actor.id {
                return Err(AppError::Forbidden);
            }
        }

        let redeemed = self
            .vouchers
            .redeem_checked(voucher.id, appointment_id, now)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!("voucher {} is no longer active", code))
            })?;

        info!("Voucher {} redeemed by client {}", code, actor.id);

        self.audit
            .record(
                AuditEvent::new("voucher.redeem", "voucher", now)
                    .actor(actor.id)
                    .resource_id(redeemed.id)
                    .details(json!({ "appointment_id": appointment_id })),
            )
            .await;

        Ok(redeemed)
    }

    /// Create and activate a new issuance config. Administrators only.
    ///
    /// Deactivates whatever config was active, in the same store
    /// transaction, keeping at most one config active.
    #[instrument(skip(self, input))]
    pub async fn configure(
        &self,
        actor: &Actor,
        input: NewVoucherConfig,
    ) -> AppResult<VoucherConfig> {
        if !policy::can_configure_vouchers(actor) {
            return Err(AppError::Forbidden);
        }

        input.validate()?;

        let now = self.clock.now();
        let config = VoucherConfig::from_input(input, now);
        let activated = self.configs.activate(&config).await?;

        self.audit
            .record(
                AuditEvent::new("voucher.configure", "voucher_config", now)
                    .actor(actor.id)
                    .resource_id(activated.id)
                    .details(json!({
                        "services_required": activated.services_required,
                        "discount_percentage": activated.discount_percentage,
                        "validity_days": activated.validity_days,
                    })),
            )
            .await;

        Ok(activated)
    }

    /// The currently active issuance config
    pub async fn active_config(&self) -> AppResult<Option<VoucherConfig>> {
        self.configs.active().await
    }

    /// Vouchers belonging to a client
    pub async fn list_for_client(&self, client_id: Uuid) -> AppResult<Vec<Voucher>> {
        self.vouchers.list_by_client(client_id).await
    }
}
