use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One pending registration code. Several unconsumed rows may exist for the
/// same email; redemption matches on the exact (email, otp) pair and stale
/// rows die by mismatch or by the sweep.
#[derive(Debug, Clone, FromRow)]
pub struct OtpRecord {
    pub id: u64,
    pub email: String,
    pub otp: String,
    pub role_id: u8,
    pub manager_id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
}
