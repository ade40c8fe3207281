//! Registration workflow — OTP-gated account creation.
//!
//! One manager per registration session. The flow: request a code for the
//! email, re-enter it to verify, then complete registration (account
//! creation, optional profile-image upload, profile record write,
//! verification mail). Later steps do not roll back earlier ones; a failed
//! profile write can leave an account without a record, matching the
//! deployed behavior.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::error::RegistrationError;
use crate::identity::{IdentityProvider, ObjectStorage};
use crate::otp::{OtpDispatcher, generate_code};
use crate::store::{RealtimeStore, user_path};

/// Fields the registration form submits.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Raw bytes of the selected profile image, if any.
    pub profile_image: Option<Vec<u8>>,
}

/// Per-session registration state and workflow.
pub struct RegistrationManager {
    identity: Arc<dyn IdentityProvider>,
    storage: Arc<dyn ObjectStorage>,
    store: Arc<dyn RealtimeStore>,
    dispatcher: Arc<dyn OtpDispatcher>,
    code: Option<String>,
    otp_sent: bool,
    verified: bool,
}

impl RegistrationManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn ObjectStorage>,
        store: Arc<dyn RealtimeStore>,
        dispatcher: Arc<dyn OtpDispatcher>,
    ) -> Self {
        Self {
            identity,
            storage,
            store,
            dispatcher,
            code: None,
            otp_sent: false,
            verified: false,
        }
    }

    pub fn otp_sent(&self) -> bool {
        self.otp_sent
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    /// Generate a fresh code for `email` and dispatch it through the OTP
    /// backend. A repeat request replaces the session's pending code.
    pub async fn request_otp(&mut self, email: &str) -> Result<(), RegistrationError> {
        if email.trim().is_empty() {
            return Err(RegistrationError::EmailRequired);
        }

        match self.identity.lookup_email(email).await {
            Ok(methods) if !methods.is_empty() => return Err(RegistrationError::EmailInUse),
            Ok(_) => {}
            Err(e) => {
                warn!(email, error = %e, "email lookup failed");
                return Err(RegistrationError::InvalidEmail);
            }
        }

        let code = generate_code();
        self.code = Some(code.clone());

        self.dispatcher
            .dispatch(email, &code)
            .await
            .map_err(RegistrationError::OtpSendFailed)?;

        self.otp_sent = true;
        info!(email, "OTP dispatched");
        Ok(())
    }

    /// Compare `submitted` against the most recently generated code held by
    /// this session.
    ///
    /// Note: the check is local, not authoritative against the backend's
    /// stored copy. The backend's `/verify-otp` exists for a client that
    /// wants the server-side check instead.
    pub fn verify_otp(&mut self, submitted: &str) -> Result<(), RegistrationError> {
        match &self.code {
            Some(code) if code == submitted.trim() => {
                self.verified = true;
                Ok(())
            }
            _ => Err(RegistrationError::InvalidOtp),
        }
    }

    /// Create the account and its profile record. Rejects outright unless
    /// the session is verified; validates every field before any remote
    /// call. Returns the new account's uid.
    pub async fn complete_registration(
        &self,
        request: RegistrationRequest,
    ) -> Result<String, RegistrationError> {
        if !self.verified {
            return Err(RegistrationError::NotVerified);
        }

        for (field, value) in [
            ("name", &request.name),
            ("email", &request.email),
            ("password", &request.password),
            ("confirm_password", &request.confirm_password),
        ] {
            if value.trim().is_empty() {
                return Err(RegistrationError::MissingField { field });
            }
        }
        if request.password != request.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }

        let account = self
            .identity
            .create_account(&request.email, &request.password)
            .await?;

        let mut profile_image_url = None;
        if let Some(bytes) = request.profile_image {
            let path = format!("profileImages/{}", account.uid);
            profile_image_url = Some(self.storage.upload(&path, bytes).await?);
        }

        self.store
            .put(
                &user_path(&account.uid),
                json!({
                    "name": request.name,
                    "email": request.email,
                    "profileImage": profile_image_url,
                }),
            )
            .await?;

        self.identity
            .send_email_verification(&account.id_token)
            .await?;

        info!(uid = %account.uid, "registration complete");
        Ok(account.uid)
    }
}
