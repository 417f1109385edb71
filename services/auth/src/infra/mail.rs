use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::MailSettings;
use crate::domain::types::CODE_TTL_SECS;
use crate::error::DeliveryError;

/// SMTP sender for verification emails.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    brand_name: String,
}

impl SmtpMailer {
    /// `secure` selects implicit TLS (SMTPS); otherwise STARTTLS is required.
    pub fn new(settings: &MailSettings) -> Result<Self, DeliveryError> {
        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| DeliveryError::Mail(e.to_string()))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.pass.clone(),
            ))
            .build();

        let address: Address = settings
            .from_address
            .parse()
            .map_err(|e: lettre::address::AddressError| DeliveryError::Address(e.to_string()))?;

        Ok(Self {
            transport,
            from: Mailbox::new(Some(settings.from_name.clone()), address),
            brand_name: settings.brand_name.clone(),
        })
    }

    pub async fn send_code(&self, to: &str, code: &str) -> Result<(), DeliveryError> {
        let to: Address = to
            .parse()
            .map_err(|e: lettre::address::AddressError| DeliveryError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, to))
            .subject(format!("{} verification code", self.brand_name))
            .header(ContentType::TEXT_HTML)
            .body(render_code_email(&self.brand_name, code))
            .map_err(|e| DeliveryError::Mail(e.to_string()))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Mail(e.to_string()))?;
        info!(smtp_code = %response.code(), "verification email accepted");
        Ok(())
    }
}

pub fn render_code_email(brand_name: &str, code: &str) -> String {
    let minutes = CODE_TTL_SECS / 60;
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 480px; margin: 0 auto; padding: 24px; color: #111;">
  <h2 style="margin: 0 0 12px;">{brand_name}</h2>
  <p style="margin: 0 0 12px;">Use this code to verify your email:</p>
  <p style="font-size: 28px; letter-spacing: 6px; font-weight: 700; margin: 12px 0 18px;">{code}</p>
  <p style="margin: 0 0 8px; color: #555;">The code expires in {minutes} minutes. If you did not request this, you can ignore this email.</p>
</div>"#
    )
}
