//! # Email Integration
//!
//! Email delivery for the password reset flow.

use std::sync::Arc;

use super::errors::{AuthError, AuthResult};

/// Email configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server host
    pub smtp_host: String,

    /// SMTP server port
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_user: String,

    /// SMTP password (should come from secrets)
    pub smtp_password: String,

    /// From email address
    pub from_email: String,

    /// From name
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@trailhead.local".to_string(),
            from_name: "Trailhead".to_string(),
        }
    }
}

/// Email template types
#[derive(Debug, Clone)]
pub enum EmailTemplate {
    /// Password reset with the raw token link
    PasswordReset { user_email: String, reset_url: String },
}

/// Email sender trait for abstraction
pub trait EmailSender: Send + Sync {
    fn send(&self, template: EmailTemplate) -> AuthResult<()>;
}

/// Mock email sender for testing
#[derive(Debug, Default)]
pub struct MockEmailSender {
    /// Sent emails (for assertion in tests)
    pub sent: std::sync::RwLock<Vec<EmailTemplate>>,

    /// When set, every send fails; exercises the token-cleanup path
    pub fail: std::sync::atomic::AtomicBool,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }

    pub fn last_reset_url(&self) -> Option<String> {
        self.sent.read().unwrap().last().map(|t| match t {
            EmailTemplate::PasswordReset { reset_url, .. } => reset_url.clone(),
        })
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

impl EmailSender for MockEmailSender {
    fn send(&self, template: EmailTemplate) -> AuthResult<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AuthError::EmailSendFailed);
        }
        self.sent.write().unwrap().push(template);
        Ok(())
    }
}

/// SMTP email sender
pub struct SmtpEmailSender {
    config: EmailConfig,
}

impl SmtpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn render_template(&self, template: &EmailTemplate) -> (String, String, String) {
        match template {
            EmailTemplate::PasswordReset {
                user_email,
                reset_url,
            } => {
                let subject = format!(
                    "Your password reset token (valid for {} minutes)",
                    super::user::RESET_TOKEN_TTL_MINUTES
                );
                let body = format!(
                    "Forgot your password? Submit a PATCH request with your new password and \
                     confirm_password to: {}.\n\
                     If you didn't forget your password, please ignore this email.",
                    reset_url
                );
                (user_email.clone(), subject, body)
            }
        }
    }
}

impl EmailSender for SmtpEmailSender {
    fn send(&self, template: EmailTemplate) -> AuthResult<()> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials, Message,
            SmtpTransport, Transport,
        };

        let (to, subject, body) = self.render_template(&template);

        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|_| AuthError::EmailSendFailed)?,
            )
            .to(to.parse().map_err(|_| AuthError::EmailSendFailed)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|_| AuthError::EmailSendFailed)?;

        let mailer = if self.config.smtp_user.is_empty() {
            // No authentication, for local development SMTP servers
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_user.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|_| AuthError::EmailSendFailed)?
                .credentials(creds)
                .port(self.config.smtp_port)
                .build()
        };

        mailer.send(&email).map_err(|_| AuthError::EmailSendFailed)?;

        Ok(())
    }
}

/// Create a boxed email sender based on config
pub fn create_email_sender(config: Option<EmailConfig>) -> Arc<dyn EmailSender> {
    match config {
        Some(cfg) => Arc::new(SmtpEmailSender::new(cfg)),
        None => Arc::new(MockEmailSender::new()),
    }
}
