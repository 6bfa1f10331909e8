//! Outbound mail seam
//!
//! Delivery is an external collaborator, so the trait is the boundary: the
//! default implementation records messages in the logs, and tests plug in
//! recording or failing mailers.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Development mailer: logs instead of delivering.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Outbound mail (log only)"
        );
        tracing::debug!(body = %message.body, "Mail body");
        Ok(())
    }
}

/// Build the account-verification message.
pub fn verification_message(from: &str, app_url: &str, to: &str, token: &str) -> MailMessage {
    let link = format!("{}/api/auth/verify/{}", app_url, token);
    MailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Verify your email address".to_string(),
        body: format!(
            "Welcome to Casino App!\nClick the link below to verify your email address:\n{}\n",
            link
        ),
    }
}

/// Build the password-reset message.
pub fn reset_message(from: &str, app_url: &str, to: &str, token: &str) -> MailMessage {
    let link = format!("{}/auth/reset-password/{}", app_url, token);
    MailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        body: format!(
            "Click the link below to reset your password:\n{}\nThis link will expire in 1 hour.\n",
            link
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_message_carries_the_link() {
        let message =
            verification_message("casino@test.local", "http://localhost:3001", "a@gmail.com", "tok123");
        assert_eq!(message.from, "casino@test.local");
        assert_eq!(message.to, "a@gmail.com");
        assert!(message
            .body
            .contains("http://localhost:3001/api/auth/verify/tok123"));
    }

    #[test]
    fn test_reset_message_carries_the_link_and_expiry_note() {
        let message =
            reset_message("casino@test.local", "http://localhost:3001", "a@gmail.com", "tok456");
        assert!(message
            .body
            .contains("http://localhost:3001/auth/reset-password/tok456"));
        assert!(message.body.contains("expire in 1 hour"));
    }
}
