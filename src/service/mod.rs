pub mod mailer;
pub mod otp;
pub mod registration;
pub mod user;

use crate::service::mailer::SmtpMailer;
use crate::service::registration::RegistrationService;
use crate::store::mysql::{MySqlOtpStore, MySqlUserStore};

/// Concrete wiring used by the running server; tests substitute the
/// in-memory stores and the mock mailer.
pub type Registration = RegistrationService<MySqlUserStore, MySqlOtpStore, SmtpMailer>;
