#![allow(async_fn_in_trait)]

pub mod mysql;

#[cfg(test)]
pub mod memory;

use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::model::otp::OtpRecord;
use crate::model::role::Role;
use crate::model::user::UserRecord;

/// Failure surface of the stores. `Duplicate` is the unique-constraint hit
/// (email or employee code); everything else is persistence unavailability.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "duplicate key")]
    Duplicate,
    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(sqlx::Error),
}

pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub manager_id: Option<u64>,
    pub employee_code: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
}

pub struct NewOtp {
    pub email: String,
    pub code: String,
    pub role: Role,
    pub manager_id: Option<u64>,
    pub expires_at: DateTime<Utc>,
}

/// Identity-record port consumed by the registration orchestrator. Email
/// uniqueness is the store's own constraint; `insert` reports a hit as
/// [`StoreError::Duplicate`] rather than relying on a prior `email_exists`
/// check that another writer may have raced past.
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Look up a user by id that actually carries the MANAGER role.
    async fn find_manager(&self, id: u64) -> Result<Option<UserRecord>, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;
}

/// Pending-code port. Single consumption is enforced here: `consume` is an
/// atomic check-and-set against the store, not a read-then-write, so two
/// racing redeemers see exactly one `true`.
pub trait OtpStore: Send + Sync {
    async fn insert(&self, otp: NewOtp) -> Result<OtpRecord, StoreError>;

    /// Exact (email, code) match with the consumed flag still clear. Expiry
    /// is NOT filtered here; the ledger re-checks it at call time.
    async fn find_unconsumed(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<OtpRecord>, StoreError>;

    /// Flip the consumed flag. Returns `false` when some other caller
    /// already won, or the row is gone.
    async fn consume(&self, id: u64) -> Result<bool, StoreError>;

    /// Range-delete every record expiring before `cutoff`, consumed or not.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
