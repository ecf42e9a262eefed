use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::model::otp::OtpRecord;
use crate::model::role::Role;
use crate::model::user::{USER_COLUMNS, UserRecord};
use crate::store::{NewOtp, NewUser, OtpStore, StoreError, UserStore};
use crate::utils::{email_cache, email_filter};

fn db_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code() == Some("23000".into()) {
            return StoreError::Duplicate;
        }
    }
    StoreError::Unavailable(e)
}

#[derive(Clone)]
pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl UserStore for MySqlUserStore {
    /// Three-tier existence check: cuckoo filter fast negative, moka cache
    /// fast positive, database fallback. The unique constraint on
    /// `users.email` remains the authority at insert time.
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        if !email_filter::might_exist(email) {
            return Ok(false);
        }

        if email_cache::is_taken(email).await {
            return Ok(true);
        }

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
        )
        .bind(email.to_lowercase())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn find_manager(&self, id: u64) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND role_id = ?"
        ))
        .bind(id)
        .bind(Role::Manager.id())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let email = user.email.to_lowercase();

        let result = sqlx::query(
            r#"
            INSERT INTO users
            (email, password, role_id, first_name, last_name, manager_id,
             employee_code, department, is_active, is_verified)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&email)
        .bind(&user.password_hash)
        .bind(user.role.id())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.manager_id)
        .bind(&user.employee_code)
        .bind(&user.department)
        .bind(user.is_active)
        .bind(user.is_verified)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        // keep the fast-path structures in step with the table
        email_filter::insert(&email);
        email_cache::mark_taken(&email).await;

        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(result.last_insert_id())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }
}

#[derive(Clone)]
pub struct MySqlOtpStore {
    pool: MySqlPool,
}

impl MySqlOtpStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const OTP_COLUMNS: &str = "id, email, otp, role_id, manager_id, created_at, expires_at, is_used";

impl OtpStore for MySqlOtpStore {
    async fn insert(&self, otp: NewOtp) -> Result<OtpRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO otps (email, otp, role_id, manager_id, expires_at, is_used)
            VALUES (?, ?, ?, ?, ?, FALSE)
            "#,
        )
        .bind(otp.email.to_lowercase())
        .bind(&otp.code)
        .bind(otp.role.id())
        .bind(otp.manager_id)
        .bind(otp.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query_as::<_, OtpRecord>(&format!(
            "SELECT {OTP_COLUMNS} FROM otps WHERE id = ?"
        ))
        .bind(result.last_insert_id())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn find_unconsumed(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<OtpRecord>, StoreError> {
        sqlx::query_as::<_, OtpRecord>(&format!(
            "SELECT {OTP_COLUMNS} FROM otps WHERE email = ? AND otp = ? AND is_used = FALSE LIMIT 1"
        ))
        .bind(email.to_lowercase())
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn consume(&self, id: u64) -> Result<bool, StoreError> {
        // conditional update: at most one concurrent caller sees rows_affected = 1
        let result = sqlx::query("UPDATE otps SET is_used = TRUE WHERE id = ? AND is_used = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM otps WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected())
    }
}
