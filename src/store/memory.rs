//! In-memory store implementations backing the test suite. Exclusivity is
//! provided the same way the database provides it: a single guarded mutation
//! per call, so `consume` and `insert` keep their check-and-set semantics
//! under concurrent callers.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::model::otp::OtpRecord;
use crate::model::role::Role;
use crate::model::user::UserRecord;
use crate::store::{NewOtp, NewUser, OtpStore, StoreError, UserStore};

#[derive(Clone, Default)]
pub struct MemUserStore {
    users: Arc<Mutex<Vec<UserRecord>>>,
}

impl MemUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-existing account (e.g. the manager an invite points at).
    pub fn seed(&self, role: Role, email: &str) -> u64 {
        let mut users = self.users.lock().unwrap();
        let id = users.len() as u64 + 1;
        users.push(UserRecord {
            id,
            email: email.to_lowercase(),
            password: "$argon2id$seeded".into(),
            role_id: role.id(),
            first_name: Some("Seeded".into()),
            last_name: Some("User".into()),
            manager_id: None,
            employee_code: None,
            department: None,
            is_active: true,
            is_verified: true,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        });
        id
    }

    pub fn all(&self) -> Vec<UserRecord> {
        self.users.lock().unwrap().clone()
    }
}

impl UserStore for MemUserStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let email = email.to_lowercase();
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn find_manager(&self, id: u64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id && u.role_id == Role::Manager.id())
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let email = user.email.to_lowercase();
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::Duplicate);
        }
        let record = UserRecord {
            id: users.len() as u64 + 1,
            email,
            password: user.password_hash,
            role_id: user.role.id(),
            first_name: Some(user.first_name),
            last_name: Some(user.last_name),
            manager_id: user.manager_id,
            employee_code: user.employee_code,
            department: user.department,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        users.push(record.clone());
        Ok(record)
    }
}

#[derive(Clone, Default)]
pub struct MemOtpStore {
    otps: Arc<Mutex<Vec<OtpRecord>>>,
}

impl MemOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<OtpRecord> {
        self.otps.lock().unwrap().clone()
    }

    /// Force a record's expiry into the past, for expiry-path tests.
    pub fn expire(&self, id: u64, at: DateTime<Utc>) {
        let mut otps = self.otps.lock().unwrap();
        if let Some(rec) = otps.iter_mut().find(|o| o.id == id) {
            rec.expires_at = at;
        }
    }
}

impl OtpStore for MemOtpStore {
    async fn insert(&self, otp: NewOtp) -> Result<OtpRecord, StoreError> {
        let mut otps = self.otps.lock().unwrap();
        let record = OtpRecord {
            id: otps.iter().map(|o| o.id).max().unwrap_or(0) + 1,
            email: otp.email.to_lowercase(),
            otp: otp.code,
            role_id: otp.role.id(),
            manager_id: otp.manager_id,
            created_at: Some(Utc::now()),
            expires_at: otp.expires_at,
            is_used: false,
        };
        otps.push(record.clone());
        Ok(record)
    }

    async fn find_unconsumed(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<OtpRecord>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .otps
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.email == email && o.otp == code && !o.is_used)
            .cloned())
    }

    async fn consume(&self, id: u64) -> Result<bool, StoreError> {
        let mut otps = self.otps.lock().unwrap();
        match otps.iter_mut().find(|o| o.id == id && !o.is_used) {
            Some(rec) => {
                rec.is_used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut otps = self.otps.lock().unwrap();
        let before = otps.len();
        otps.retain(|o| o.expires_at >= cutoff);
        Ok((before - otps.len()) as u64)
    }
}
