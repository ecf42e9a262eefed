use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rand::Rng;

use crate::model::otp::OtpRecord;
use crate::model::role::Role;
use crate::store::{NewOtp, OtpStore, StoreError};

const OTP_CHARSET: &[u8] = b"0123456789";
const OTP_LENGTH: usize = 6;

/// Cadence of the background sweep. Fixed, not configuration.
pub const SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(300);

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LENGTH)
        .map(|_| OTP_CHARSET[rng.random_range(0..OTP_CHARSET.len())] as char)
        .collect()
}

/// The pending-code ledger. Owns code generation, expiry arithmetic and the
/// sweep; single consumption is delegated to the store's conditional update.
#[derive(Clone)]
pub struct OtpLedger<S: OtpStore> {
    store: S,
    ttl_minutes: i64,
}

impl<S: OtpStore> OtpLedger<S> {
    pub fn new(store: S, ttl_minutes: i64) -> Self {
        Self { store, ttl_minutes }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    /// Generate and persist a fresh code, returning it for outward dispatch.
    /// Piggybacks a purge of every already-expired record, for any email.
    /// Deliberately does NOT check for existing active codes on this email;
    /// concurrent codes are allowed and stale ones die by mismatch or sweep.
    pub async fn issue(
        &self,
        email: &str,
        role: Role,
        manager_id: Option<u64>,
    ) -> Result<String, StoreError> {
        self.store.delete_expired(Utc::now()).await?;

        let code = generate_code();
        self.store
            .insert(NewOtp {
                email: email.to_string(),
                code: code.clone(),
                role,
                manager_id,
                expires_at: Utc::now() + Duration::minutes(self.ttl_minutes),
            })
            .await?;

        Ok(code)
    }

    /// Exact (email, code) match, unconsumed, with expiry re-verified here
    /// at call time: the sweep may not have run yet. A miss is a bare miss —
    /// the caller cannot tell a wrong code from an expired one.
    pub async fn redeem(&self, email: &str, code: &str) -> Result<Option<OtpRecord>, StoreError> {
        let record = self.store.find_unconsumed(email, code).await?;
        Ok(record.filter(|r| r.expires_at > Utc::now()))
    }

    /// One-way flip of the consumed flag. `false` means another caller got
    /// there first.
    pub async fn consume(&self, record: &OtpRecord) -> Result<bool, StoreError> {
        self.store.consume(record.id).await
    }

    pub async fn sweep_expired(&self) -> Result<u64, StoreError> {
        self.store.delete_expired(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemOtpStore;

    fn ledger(store: MemOtpStore) -> OtpLedger<MemOtpStore> {
        OtpLedger::new(store, 10)
    }

    #[test]
    fn code_is_six_ascii_digits() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[actix_rt::test]
    async fn issue_persists_one_unconsumed_record() {
        let store = MemOtpStore::new();
        let code = ledger(store.clone())
            .issue("m@x.com", Role::Manager, None)
            .await
            .unwrap();

        let records = store.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].otp, code);
        assert!(!records[0].is_used);
        assert!(records[0].expires_at > Utc::now());
    }

    #[actix_rt::test]
    async fn issue_purges_expired_records_of_any_email() {
        let store = MemOtpStore::new();
        let ledger = ledger(store.clone());

        ledger.issue("old@x.com", Role::Manager, None).await.unwrap();
        store.expire(1, Utc::now() - Duration::minutes(1));

        ledger.issue("new@x.com", Role::Manager, None).await.unwrap();
        let emails: Vec<_> = store.all().into_iter().map(|o| o.email).collect();
        assert_eq!(emails, vec!["new@x.com"]);
    }

    #[actix_rt::test]
    async fn redeem_matches_exact_pair_only() {
        let store = MemOtpStore::new();
        let ledger = ledger(store.clone());
        let code = ledger.issue("m@x.com", Role::Manager, None).await.unwrap();

        let wrong = if code == "000000" { "000001" } else { "000000" };
        assert!(ledger.redeem("m@x.com", wrong).await.unwrap().is_none());
        assert!(ledger.redeem("other@x.com", &code).await.unwrap().is_none());
        let record = ledger.redeem("m@x.com", &code).await.unwrap().unwrap();
        assert_eq!(record.role_id, Role::Manager.id());
    }

    #[actix_rt::test]
    async fn redeem_filters_expiry_even_before_sweep() {
        let store = MemOtpStore::new();
        let ledger = ledger(store.clone());
        let code = ledger.issue("m@x.com", Role::Manager, None).await.unwrap();

        store.expire(1, Utc::now() - Duration::seconds(1));
        assert!(ledger.redeem("m@x.com", &code).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn consume_is_one_way_and_single_winner() {
        let store = MemOtpStore::new();
        let ledger = ledger(store.clone());
        let code = ledger.issue("m@x.com", Role::Manager, None).await.unwrap();

        let record = ledger.redeem("m@x.com", &code).await.unwrap().unwrap();
        assert!(ledger.consume(&record).await.unwrap());
        assert!(!ledger.consume(&record).await.unwrap());

        // consumed records never redeem again
        assert!(ledger.redeem("m@x.com", &code).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn multiple_concurrent_codes_per_email_are_permitted() {
        let store = MemOtpStore::new();
        let ledger = ledger(store.clone());

        let first = ledger.issue("m@x.com", Role::Manager, None).await.unwrap();
        let second = ledger.issue("m@x.com", Role::Manager, None).await.unwrap();
        assert_eq!(store.all().len(), 2);

        // both stay independently redeemable while valid
        assert!(ledger.redeem("m@x.com", &first).await.unwrap().is_some() || first == second);
        assert!(ledger.redeem("m@x.com", &second).await.unwrap().is_some());
    }

    #[actix_rt::test]
    async fn sweep_removes_all_and_only_expired_regardless_of_consumption() {
        let store = MemOtpStore::new();
        let ledger = ledger(store.clone());

        let live = ledger.issue("live@x.com", Role::Manager, None).await.unwrap();
        ledger.issue("gone@x.com", Role::Manager, None).await.unwrap();
        let consumed_code = ledger.issue("used@x.com", Role::Manager, None).await.unwrap();

        let consumed = ledger.redeem("used@x.com", &consumed_code).await.unwrap().unwrap();
        assert!(ledger.consume(&consumed).await.unwrap());

        let past = Utc::now() - Duration::minutes(1);
        store.expire(2, past);
        store.expire(consumed.id, past);

        let removed = ledger.sweep_expired().await.unwrap();
        assert_eq!(removed, 2);

        let remaining = store.all();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].otp, live);
    }
}
