//! Identity-provider and object-storage seams.
//!
//! Registration delegates authentication wholesale to a hosted identity
//! provider; this module defines the traits the workflow calls and the
//! Firebase REST implementations behind them, plus in-memory stubs for
//! tests and local mode.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::FirebaseConfig;
use crate::error::{IdentityError, StorageError};

/// A freshly created account. The token authorizes follow-up calls such as
/// the email-verification dispatch.
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    pub uid: String,
    pub id_token: String,
}

/// Hosted identity provider: existence lookup, account creation,
/// verification dispatch.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign-in methods registered for an email. Non-empty means the address
    /// is already in use.
    async fn lookup_email(&self, email: &str) -> Result<Vec<String>, IdentityError>;

    /// Create an email/password account.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CreatedAccount, IdentityError>;

    /// Trigger the provider's own email-verification mail for the account.
    async fn send_email_verification(&self, id_token: &str) -> Result<(), IdentityError>;
}

/// Remote object storage for profile images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `bytes` under `path`, returning a retrievable address.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError>;
}

// ── Firebase REST implementations ───────────────────────────────────

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Deserialize)]
struct CreateAuthUriResponse {
    #[serde(rename = "signinMethods", default)]
    signin_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "idToken")]
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "downloadTokens", default)]
    download_tokens: Option<String>,
}

/// Firebase Auth over the identity-toolkit REST API.
#[derive(Clone)]
pub struct FirebaseAuth {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirebaseAuth {
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
        }
    }

    /// Point at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, method, self.api_key)
    }

    /// Provider error body text, or the transport error, as a plain string.
    /// Registration surfaces this verbatim.
    async fn error_text(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<serde_json::Value>().await {
            Ok(body) => body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("status {status}")),
            Err(_) => format!("status {status}"),
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn lookup_email(&self, email: &str) -> Result<Vec<String>, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("createAuthUri"))
            .json(&json!({
                "identifier": email,
                "continueUri": "http://localhost",
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Lookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::Lookup(Self::error_text(response).await));
        }

        let body: CreateAuthUriResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Lookup(e.to_string()))?;
        Ok(body.signin_methods)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CreatedAccount, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("signUp"))
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::CreateAccount(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::CreateAccount(Self::error_text(response).await));
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::CreateAccount(e.to_string()))?;
        Ok(CreatedAccount {
            uid: body.local_id,
            id_token: body.id_token,
        })
    }

    async fn send_email_verification(&self, id_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.endpoint("sendOobCode"))
            .json(&json!({
                "requestType": "VERIFY_EMAIL",
                "idToken": id_token,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Verification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::Verification(Self::error_text(response).await));
        }
        Ok(())
    }
}

/// Firebase Storage uploads over its REST API.
#[derive(Clone)]
pub struct FirebaseStorage {
    client: reqwest::Client,
    bucket: String,
}

impl FirebaseStorage {
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            bucket: config.storage_bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let upload_url = format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o?name={}",
            self.bucket, path
        );

        let response = self
            .client
            .post(&upload_url)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(StorageError::Upload {
                path: path.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let body: UploadResponse = response.json().await.map_err(|e| StorageError::Upload {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let token = body
            .download_tokens
            .ok_or_else(|| StorageError::MissingUrl(path.to_string()))?;

        Ok(format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o/{}?alt=media&token={}",
            self.bucket,
            path.replace('/', "%2F"),
            token
        ))
    }
}

// ── In-memory stubs ─────────────────────────────────────────────────

/// In-memory identity provider for tests and local mode.
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, String>>,
    verification_sent: Mutex<Vec<String>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an email so lookups report it as taken.
    pub fn seed(&self, email: &str) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), Uuid::new_v4().to_string());
    }

    /// Emails a verification mail was dispatched for (by token).
    pub fn verification_count(&self) -> usize {
        self.verification_sent.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn lookup_email(&self, email: &str) -> Result<Vec<String>, IdentityError> {
        if !email.contains('@') {
            return Err(IdentityError::Lookup("INVALID_IDENTIFIER".into()));
        }
        let accounts = self.accounts.lock().unwrap();
        Ok(if accounts.contains_key(email) {
            vec!["password".to_string()]
        } else {
            Vec::new()
        })
    }

    async fn create_account(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<CreatedAccount, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(IdentityError::CreateAccount("EMAIL_EXISTS".into()));
        }
        let uid = Uuid::new_v4().to_string();
        accounts.insert(email.to_string(), uid.clone());
        Ok(CreatedAccount {
            id_token: format!("token-{uid}"),
            uid,
        })
    }

    async fn send_email_verification(&self, id_token: &str) -> Result<(), IdentityError> {
        self.verification_sent
            .lock()
            .unwrap()
            .push(id_token.to_string());
        Ok(())
    }
}

/// In-memory object storage for tests and local mode.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes);
        Ok(format!("memory://{path}"))
    }
}
