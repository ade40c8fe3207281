//! Outbound OTP mail over SMTP.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::MailError;

const OTP_SUBJECT: &str = "Your OTP for Registration";

/// Relay seam for the registration-code mail.
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError>;
}

/// SMTP relay via lettre. The blocking transport runs on the blocking pool.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn send_blocking(config: &SmtpConfig, to: &str, code: &str) -> Result<(), MailError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| MailError::Relay(e.to_string()))?
            .port(config.port)
            .credentials(creds)
            .build();

        let email = Message::builder()
            .from(
                config
                    .from_address
                    .parse()
                    .map_err(|e| MailError::InvalidAddress {
                        address: config.from_address.clone(),
                        reason: format!("{e}"),
                    })?,
            )
            .to(to.parse().map_err(|e| MailError::InvalidAddress {
                address: to.to_string(),
                reason: format!("{e}"),
            })?)
            .subject(OTP_SUBJECT)
            .body(format!("Your OTP is: {code}"))
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(&email)
            .map_err(|e| MailError::Send(e.to_string()))?;

        info!(to, "OTP mail relayed");
        Ok(())
    }
}

#[async_trait]
impl OtpMailer for SmtpMailer {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let config = self.config.clone();
        let to = to.to_string();
        let code = code.to_string();

        tokio::task::spawn_blocking(move || Self::send_blocking(&config, &to, &code))
            .await
            .map_err(|e| MailError::Send(format!("mail task panicked: {e}")))?
    }
}
