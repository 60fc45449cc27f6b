//! SMTP email provider implementation using Lettre.

use crate::error::{AuthError, Result};
use crate::providers::EmailProvider;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP email provider using Lettre.
///
/// # Examples
///
/// ```ignore
/// use event_vibe_auth::providers::SmtpEmailProvider;
///
/// let provider = SmtpEmailProvider::new(
///     "smtp.example.com",
///     587,
///     "mailer",
///     "app_password",
///     "Event Vibe <noreply@eventvibe.example>",
/// )?;
/// ```
#[derive(Clone)]
pub struct SmtpEmailProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: lettre::message::Mailbox,
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider using STARTTLS.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailError`] if the relay host or the sender
    /// address is invalid.
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        from: &str,
    ) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
            .map_err(|e| AuthError::EmailError(format!("SMTP relay error: {e}")))?
            .port(smtp_port)
            .credentials(Credentials::new(username.into(), password.into()))
            .build();
        let from = from
            .parse()
            .map_err(|e| AuthError::EmailError(format!("Invalid from address: {e}")))?;

        Ok(Self { transport, from })
    }

    fn verification_body(link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>Verify your email for Event Vibe</h2>
        <p>Follow this link to verify your email address.</p>
        <p><a href="{link}">Verify email</a></p>
        <p style="color: #666; font-size: 14px;">
            If you didn't ask to verify this address, you can ignore this email.
        </p>
        <p style="color: #666; font-size: 12px;">{link}</p>
    </div>
</body>
</html>"#
        )
    }
}

impl EmailProvider for SmtpEmailProvider {
    async fn send_verification_email(&self, to: &str, link: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| AuthError::EmailError(format!("Invalid to address: {e}")))?)
            .subject("Verify your email for Event Vibe")
            .header(ContentType::TEXT_HTML)
            .body(Self::verification_body(link))
            .map_err(|e| AuthError::EmailError(format!("Failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AuthError::EmailError(format!("Failed to send email: {e}")))?;

        tracing::info!(to = %to, "Verification email sent");
        Ok(())
    }
}
