use anyhow::Context;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::model::role::Role;

/// Outbound notification port. Fire-and-forget from the caller's view: a
/// send failure never rolls back state that already committed.
#[allow(async_fn_in_trait)]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .context("invalid SMTP relay host")?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .context("invalid SMTP from address")?;

        Ok(Self { transport, from })
    }
}

impl EmailSender for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>().context("invalid recipient address")?)
            .subject(subject)
            .body(body.to_string())
            .context("failed to build message")?;

        self.transport
            .send(message)
            .await
            .context("SMTP send failed")?;

        Ok(())
    }
}

/// Subject and body of the OTP invitation mail, with role-specific framing.
pub fn registration_otp_email(role: Role, code: &str, valid_minutes: i64) -> (String, String) {
    let role_message = match role {
        Role::Manager => "You are being registered as a Manager at StaffHub.",
        Role::Employee => "You are being registered as an Employee at StaffHub.",
        Role::Admin => "You are being registered at StaffHub.",
    };

    let subject = "Registration Invitation - StaffHub".to_string();
    let body = format!(
        "{role_message}\n\n\
         To complete your registration, please use the following OTP:\n\
         OTP: {code}\n\
         This OTP is valid for {valid_minutes} minutes.\n\n\
         Steps to complete registration:\n\
         1. Use this OTP to verify your email\n\
         2. You will receive your login credentials via email\n\
         3. Login and update your profile\n\n\
         Best regards,\nThe StaffHub Team"
    );

    (subject, body)
}

/// Subject and body of the welcome mail carrying the temporary credential.
pub fn credentials_email(email: &str, role: Role, password: &str) -> (String, String) {
    let subject = "Welcome to StaffHub".to_string();
    let body = format!(
        "Congratulations! You are now registered as a {role} at StaffHub.\n\n\
         Your login credentials:\n\
         Email: {email}\n\
         Password: {password}\n\n\
         Important: Please login and change your password immediately.\n\n\
         Best regards,\nThe StaffHub Team"
    );

    (subject, body)
}

#[cfg(test)]
pub use mock::{MockEmailSender, SentEmail};

#[cfg(test)]
mod mock {
    use std::sync::{Arc, Mutex};

    use super::EmailSender;

    #[derive(Debug, Clone)]
    pub struct SentEmail {
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    /// Captures outbound mail instead of delivering it.
    #[derive(Clone, Default)]
    pub struct MockEmailSender {
        sent: Arc<Mutex<Vec<SentEmail>>>,
    }

    impl MockEmailSender {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<SentEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl EmailSender for MockEmailSender {
        async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }
}
