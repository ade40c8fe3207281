//! Client side of the OTP backend — what the registration flow calls to get
//! a code mailed out.

use async_trait::async_trait;
use serde_json::json;

use crate::error::OtpError;

/// Dispatch seam so the registration flow can be tested without a running
/// backend.
#[async_trait]
pub trait OtpDispatcher: Send + Sync {
    /// Post `{email, otp}` to the backend's `/send-otp`.
    async fn dispatch(&self, email: &str, code: &str) -> Result<(), OtpError>;
}

/// HTTP client for the OTP backend.
#[derive(Clone)]
pub struct OtpBackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl OtpBackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl OtpDispatcher for OtpBackendClient {
    async fn dispatch(&self, email: &str, code: &str) -> Result<(), OtpError> {
        let response = self
            .client
            .post(format!("{}/send-otp", self.base_url))
            .json(&json!({"email": email, "otp": code}))
            .send()
            .await
            .map_err(|e| OtpError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OtpError::Backend {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = OtpBackendClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
