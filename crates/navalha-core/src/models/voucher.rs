//! Loyalty voucher and voucher configuration models
//!
//! Vouchers are minted by the loyalty ledger when a client's completed
//! service count crosses the active config's threshold. A voucher moves
//! `Active -> Used` or `Active -> Expired`, never back.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Voucher status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    /// Issued and redeemable
    #[default]
    Active,
    /// Redeemed, exactly once
    Used,
    /// Past expiry; materialized lazily on access
    Expired,
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoucherStatus::Active => write!(f, "active"),
            VoucherStatus::Used => write!(f, "used"),
            VoucherStatus::Expired => write!(f, "expired"),
        }
    }
}

impl VoucherStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(VoucherStatus::Active),
            "used" => Some(VoucherStatus::Used),
            "expired" => Some(VoucherStatus::Expired),
            _ => None,
        }
    }
}

/// Voucher issuance configuration
///
/// At most one config is active at a time; activating a new one
/// deactivates the previous in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherConfig {
    /// Unique identifier
    pub id: Uuid,

    /// Completed services required per voucher
    pub services_required: i32,

    /// Discount granted, percent of the service price
    pub discount_percentage: i32,

    /// Days until an issued voucher expires
    pub validity_days: i32,

    /// Human-readable description
    pub description: Option<String>,

    /// Whether this config currently drives issuance
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a voucher configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewVoucherConfig {
    #[validate(range(min = 1))]
    pub services_required: i32,

    #[validate(range(min = 1, max = 100))]
    pub discount_percentage: i32,

    #[validate(range(min = 1))]
    pub validity_days: i32,

    pub description: Option<String>,
}

impl VoucherConfig {
    /// Build an active config from validated input
    pub fn from_input(input: NewVoucherConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            services_required: input.services_required,
            discount_percentage: input.discount_percentage,
            validity_days: input.validity_days,
            description: input.description,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Loyalty discount voucher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// Unique identifier
    pub id: Uuid,

    /// Owning client
    pub client_id: Uuid,

    /// Config in force when the voucher was minted
    pub config_id: Uuid,

    /// Globally unique, URL-safe redemption code
    pub code: String,

    /// Discount carried over from the config
    pub discount_percentage: i32,

    /// Current status
    pub status: VoucherStatus,

    /// Expiry instant
    pub expires_at: DateTime<Utc>,

    /// When the voucher was redeemed
    pub used_at: Option<DateTime<Utc>>,

    /// Appointment the voucher was redeemed against
    pub redeemed_appointment_id: Option<Uuid>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// Mint a new active voucher for a client under the given config
    pub fn issue(client_id: Uuid, config: &VoucherConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            config_id: config.id,
            code: generate_code(),
            discount_percentage: config.discount_percentage,
            status: VoucherStatus::Active,
            expires_at: now + Duration::days(i64::from(config.validity_days)),
            used_at: None,
            redeemed_appointment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the voucher is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Generate a redemption code: 32 lowercase hex chars, URL-safe and
/// collision-resistant (UUIDv4 entropy).
pub fn generate_code() -> String {
    Uuid::new_v4().simple().to_string()
}
