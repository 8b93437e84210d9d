use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use imagegen_core::OwnerId;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::ServiceSettings;

const MIN_PASSWORD_LEN: usize = 6;

/// The signed-in user as seen by the clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: OwnerId,
    pub email: Option<String>,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("this email is already registered")]
    AlreadyRegistered,
    #[error("sign-up needs email confirmation before signing in")]
    ConfirmationRequired,
    #[error("auth service rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
}

/// Current identity, observable by anyone holding a clone.
///
/// The engine forwards owner changes into the state machine; the REST
/// clients read the access token from here on every request.
#[derive(Debug, Clone)]
pub struct AuthSession {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl AuthSession {
    pub fn anonymous() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, identity: Option<Identity>) {
        self.tx.send_replace(identity);
    }

    pub fn sign_out(&self) {
        engine_info!("Signing out");
        self.set(None);
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.tx.borrow().as_ref().map(|identity| identity.user_id.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.tx
            .borrow()
            .as_ref()
            .map(|identity| identity.access_token.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if !is_plausible_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty() && !tail.ends_with('.'))
}

#[derive(Serialize)]
struct PasswordBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<UserBody>,
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    #[serde(alias = "error_description", alias = "message")]
    msg: Option<String>,
}

/// Email/password sign-in and sign-up against the auth endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl AuthClient {
    pub fn new(settings: ServiceSettings) -> Result<Self, AuthError> {
        let client = settings
            .build_client()
            .map_err(|err| AuthError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        validate_credentials(email, password)?;
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let identity = self.post_credentials(url, email, password).await?;
        engine_info!("Signed in as {}", identity.user_id);
        Ok(identity)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        validate_credentials(email, password)?;
        let url = self.endpoint("auth/v1/signup")?;
        let identity = self.post_credentials(url, email, password).await?;
        engine_info!("Signed up as {}", identity.user_id);
        Ok(identity)
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, AuthError> {
        self.settings
            .endpoint(path)
            .map_err(|err| AuthError::Network(err.to_string()))
    }

    async fn post_credentials(
        &self,
        url: url::Url,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(url)
            .header("apikey", &self.settings.api_key)
            .json(&PasswordBody { email, password })
            .send()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.msg)
                .unwrap_or(body);
            engine_warn!("Auth request failed with {}: {}", status, message);
            return Err(classify_rejection(status.as_u16(), message));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|err| AuthError::Rejected {
            status: status.as_u16(),
            message: err.to_string(),
        })?;
        match (parsed.access_token, parsed.user) {
            (Some(access_token), Some(user)) => Ok(Identity {
                user_id: user.id,
                email: user.email,
                access_token,
            }),
            _ => Err(AuthError::ConfirmationRequired),
        }
    }
}

fn classify_rejection(status: u16, message: String) -> AuthError {
    if message.contains("Invalid login credentials") {
        AuthError::InvalidCredentials
    } else if message.contains("already registered") {
        AuthError::AlreadyRegistered
    } else {
        AuthError::Rejected { status, message }
    }
}
