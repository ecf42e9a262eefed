use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::model::user::UserRecord;
use crate::service::mailer::{self, EmailSender};
use crate::service::otp::OtpLedger;
use crate::store::{NewUser, OtpStore, StoreError, UserStore};

const TEMP_PASSWORD_LENGTH: usize = 8;
const EMPLOYEE_CODE_PREFIX: &str = "EMP";
const EMPLOYEE_CODE_LENGTH: usize = 8;
const EMPLOYEE_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_temp_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

fn generate_employee_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..EMPLOYEE_CODE_LENGTH)
        .map(|_| EMPLOYEE_CODE_CHARSET[rng.random_range(0..EMPLOYEE_CODE_CHARSET.len())] as char)
        .collect();
    format!("{EMPLOYEE_CODE_PREFIX}{suffix}")
}

/// The two-phase registration orchestrator:
/// `initiate` proves nothing yet — it parks a code in the ledger and mails
/// it out; `complete` proves control of the inbox and only then
/// materializes the account. Email uniqueness is checked in both phases
/// because the invitee controls how much time passes between them.
#[derive(Clone)]
pub struct RegistrationService<U, O, M>
where
    U: UserStore,
    O: OtpStore,
    M: EmailSender,
{
    users: U,
    ledger: OtpLedger<O>,
    mailer: M,
}

impl<U, O, M> RegistrationService<U, O, M>
where
    U: UserStore,
    O: OtpStore,
    M: EmailSender,
{
    pub fn new(users: U, ledger: OtpLedger<O>, mailer: M) -> Self {
        Self {
            users,
            ledger,
            mailer,
        }
    }

    /// Phase one. The code travels to the invitee only; the caller gets a
    /// bare acknowledgment.
    pub async fn initiate(
        &self,
        email: &str,
        role: Role,
        manager_id: Option<u64>,
    ) -> Result<(), ApiError> {
        if self.users.email_exists(email).await? {
            return Err(ApiError::Conflict("Email already registered".into()));
        }

        if role == Role::Employee && manager_id.is_none() {
            return Err(ApiError::InvalidRequest(
                "Manager ID is required for employee registration".into(),
            ));
        }

        let code = self.ledger.issue(email, role, manager_id).await?;
        info!(email, %role, "registration OTP issued");

        let (subject, body) =
            mailer::registration_otp_email(role, &code, self.ledger.ttl_minutes());
        if let Err(e) = self.mailer.send(email, &subject, &body).await {
            // the ledger record is committed; delivery is fire-and-forget
            warn!(email, error = %e, "failed to dispatch OTP email");
        }

        Ok(())
    }

    /// Phase two. Redeem, re-check uniqueness, atomically consume, then
    /// materialize the account and mail the temporary credential.
    pub async fn complete(&self, email: &str, submitted_code: &str) -> Result<UserRecord, ApiError> {
        let record = self
            .ledger
            .redeem(email, submitted_code)
            .await?
            .ok_or(ApiError::InvalidOrExpiredCode)?;

        // mandatory second check: another actor may have registered this
        // email since issuance
        if self.users.email_exists(email).await? {
            return Err(ApiError::Conflict("User already registered".into()));
        }

        if !self.ledger.consume(&record).await? {
            // a concurrent redeemer won the conditional update
            return Err(ApiError::InvalidOrExpiredCode);
        }

        let role = Role::from_id(record.role_id)
            .ok_or_else(|| ApiError::InvalidRequest("Invalid role on OTP record".into()))?;

        // the manager must exist at materialization time, not issuance time
        let manager_id = match (role, record.manager_id) {
            (Role::Employee, Some(id)) => {
                self.users
                    .find_manager(id)
                    .await?
                    .ok_or_else(|| ApiError::NotFound(format!("Manager not found with ID: {id}")))?;
                Some(id)
            }
            _ => None,
        };

        let temp_password = generate_temp_password();
        let new_user = NewUser {
            email: email.to_string(),
            password_hash: hash_password(&temp_password),
            role,
            first_name: "New".into(),
            last_name: "User".into(),
            manager_id,
            employee_code: (role == Role::Employee).then(generate_employee_code),
            department: (role == Role::Employee).then(|| "To be updated".into()),
            is_active: true,
            is_verified: true,
        };

        let user = self.users.insert(new_user).await.map_err(|e| match e {
            StoreError::Duplicate => ApiError::Conflict("User already registered".into()),
            other => other.into(),
        })?;
        info!(email = %user.email, %role, user_id = user.id, "account materialized");

        let (subject, body) = mailer::credentials_email(&user.email, role, &temp_password);
        if let Err(e) = self.mailer.send(&user.email, &subject, &body).await {
            warn!(email = %user.email, error = %e, "failed to dispatch credentials email");
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::service::mailer::MockEmailSender;
    use crate::store::memory::{MemOtpStore, MemUserStore};

    struct Harness {
        users: MemUserStore,
        otps: MemOtpStore,
        mailer: MockEmailSender,
        service: RegistrationService<MemUserStore, MemOtpStore, MockEmailSender>,
    }

    fn harness() -> Harness {
        let users = MemUserStore::new();
        let otps = MemOtpStore::new();
        let mailer = MockEmailSender::new();
        let service = RegistrationService::new(
            users.clone(),
            OtpLedger::new(otps.clone(), 10),
            mailer.clone(),
        );
        Harness {
            users,
            otps,
            mailer,
            service,
        }
    }

    /// Pull the code out of the captured invitation mail, the same way the
    /// invitee would.
    fn code_from_invite(mailer: &MockEmailSender) -> String {
        let sent = mailer.sent();
        let body = &sent.last().unwrap().body;
        let line = body
            .lines()
            .find(|l| l.starts_with("OTP: "))
            .expect("invite mail carries an OTP line")
            .to_string();
        line.trim_start_matches("OTP: ").to_string()
    }

    #[test]
    fn temp_password_is_eight_alphanumerics() {
        for _ in 0..20 {
            let pw = generate_temp_password();
            assert_eq!(pw.len(), 8);
            assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn employee_code_is_prefixed_uppercase_alphanumeric() {
        for _ in 0..20 {
            let code = generate_employee_code();
            assert_eq!(code.len(), 11);
            let suffix = code.strip_prefix("EMP").unwrap();
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[actix_rt::test]
    async fn initiate_creates_exactly_one_unconsumed_record() {
        let h = harness();
        h.service
            .initiate("m@x.com", Role::Manager, None)
            .await
            .unwrap();

        let records = h.otps.all();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_used);
        assert_eq!(records[0].email, "m@x.com");

        // the code reaches the invitee, not the caller
        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "m@x.com");
        assert!(sent[0].body.contains(&records[0].otp));
    }

    #[actix_rt::test]
    async fn initiate_rejects_registered_email() {
        let h = harness();
        h.users.seed(Role::Manager, "taken@x.com");

        let err = h
            .service
            .initiate("taken@x.com", Role::Manager, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert!(h.otps.all().is_empty());
    }

    #[actix_rt::test]
    async fn employee_invite_without_manager_is_invalid_and_leaves_no_record() {
        let h = harness();
        let err = h
            .service
            .initiate("emp@x.com", Role::Employee, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(h.otps.all().is_empty());
        assert!(h.mailer.sent().is_empty());
    }

    #[actix_rt::test]
    async fn manager_registration_end_to_end() {
        let h = harness();
        h.service
            .initiate("manager@x.com", Role::Manager, None)
            .await
            .unwrap();
        let code = code_from_invite(&h.mailer);

        let user = h.service.complete("manager@x.com", &code).await.unwrap();
        assert_eq!(user.role(), Some(Role::Manager));
        assert!(user.is_verified);
        assert!(user.is_active);
        assert!(user.employee_code.is_none());

        // credential mail carries a temp password that verifies against the
        // stored hash and is not the hash itself
        let welcome = h.mailer.sent().last().unwrap().clone();
        let password_line = welcome
            .body
            .lines()
            .find(|l| l.starts_with("Password: "))
            .unwrap()
            .to_string();
        let temp_password = password_line.trim_start_matches("Password: ");
        assert_ne!(user.password, temp_password);
        assert!(verify_password(temp_password, &user.password).is_ok());
    }

    #[actix_rt::test]
    async fn employee_registration_links_manager_and_assigns_code() {
        let h = harness();
        let manager_id = h.users.seed(Role::Manager, "boss@x.com");

        h.service
            .initiate("emp@x.com", Role::Employee, Some(manager_id))
            .await
            .unwrap();
        let code = code_from_invite(&h.mailer);

        let user = h.service.complete("emp@x.com", &code).await.unwrap();
        assert_eq!(user.role(), Some(Role::Employee));
        assert_eq!(user.manager_id, Some(manager_id));
        let employee_code = user.employee_code.unwrap();
        assert!(employee_code.starts_with("EMP"));
        assert_eq!(employee_code.len(), 11);
        assert_eq!(user.department.as_deref(), Some("To be updated"));
    }

    #[actix_rt::test]
    async fn second_redemption_of_same_code_fails() {
        let h = harness();
        h.service
            .initiate("m@x.com", Role::Manager, None)
            .await
            .unwrap();
        let code = code_from_invite(&h.mailer);

        h.service.complete("m@x.com", &code).await.unwrap();
        let err = h.service.complete("m@x.com", &code).await.unwrap_err();
        // indistinguishable from a wrong code by design; the second pass
        // dies on the uniqueness re-check or the consumed flag, both mapped
        // to caller-visible validation errors
        assert!(matches!(
            err,
            ApiError::InvalidOrExpiredCode | ApiError::Conflict(_)
        ));
    }

    #[actix_rt::test]
    async fn expired_code_fails_even_if_unconsumed() {
        let h = harness();
        h.service
            .initiate("m@x.com", Role::Manager, None)
            .await
            .unwrap();
        let record = h.otps.all().remove(0);
        h.otps
            .expire(record.id, chrono::Utc::now() - chrono::Duration::seconds(1));

        let err = h.service.complete("m@x.com", &record.otp).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidOrExpiredCode));
    }

    #[actix_rt::test]
    async fn email_registered_in_the_interim_conflicts() {
        let h = harness();
        h.service
            .initiate("m@x.com", Role::Manager, None)
            .await
            .unwrap();
        let code = code_from_invite(&h.mailer);

        h.users.seed(Role::Manager, "m@x.com");

        let err = h.service.complete("m@x.com", &code).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        // the code was not burned by the failed attempt
        assert!(!h.otps.all()[0].is_used);
    }

    #[actix_rt::test]
    async fn missing_manager_at_materialization_is_not_found() {
        let h = harness();
        // manager id 99 never existed; issuance does not care
        h.service
            .initiate("emp@x.com", Role::Employee, Some(99))
            .await
            .unwrap();
        let code = code_from_invite(&h.mailer);

        let err = h.service.complete("emp@x.com", &code).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_rt::test]
    async fn concurrent_completion_has_exactly_one_winner() {
        let h = harness();
        h.service
            .initiate("m@x.com", Role::Manager, None)
            .await
            .unwrap();
        let code = code_from_invite(&h.mailer);

        let (a, b) = futures::join!(
            h.service.complete("m@x.com", &code),
            h.service.complete("m@x.com", &code),
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert_eq!(h.users.all().len(), 1);
    }
}
