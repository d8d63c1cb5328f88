//! License records and key generation.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Validity period of a freshly issued license.
pub const LICENSE_VALIDITY_DAYS: i64 = 365;

/// Number of random bytes in a license key (rendered as 32 hex chars).
const LICENSE_KEY_BYTES: usize = 16;

/// Lifecycle status of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    #[default]
    Pending,
    Active,
    Expired,
    Revoked,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Pending => "pending",
            LicenseStatus::Active => "active",
            LicenseStatus::Expired => "expired",
            LicenseStatus::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time-bounded entitlement issued per purchased unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Opaque unique key handed to the customer.
    pub key: String,

    /// When the license became usable (issuance time).
    pub activation_date: DateTime<Utc>,

    /// When the license stops being usable.
    pub expiry_date: DateTime<Utc>,

    pub status: LicenseStatus,
}

impl License {
    /// Issues a fresh license activated at `now`, expiring 365 days later.
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            key: generate_license_key(),
            activation_date: now,
            expiry_date: now + Duration::days(LICENSE_VALIDITY_DAYS),
            status: LicenseStatus::Active,
        }
    }

    /// Returns true if the license has passed its expiry date.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry_date
    }
}

/// Generates a cryptographically unpredictable license key.
///
/// 16 bytes from the OS RNG, hex encoded: 128 bits of entropy in a
/// fixed-length 32-character token.
pub fn generate_license_key() -> String {
    let mut bytes = [0u8; LICENSE_KEY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
