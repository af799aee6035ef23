use std::convert::Infallible;
use std::env;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use log::error;
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

/// The two privilege levels of the API, each bound to its own shared
/// secret. There is no per-user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Guest,
    Dashboard,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("environment variable {0} not set")]
    MissingConfig(&'static str),

    #[error("hashing failed: {0}")]
    Hash(String),
}

/// Role secrets and state tokens, loaded once at startup and handed to the
/// gate at construction. Nothing reads these from the environment after
/// boot, and there is no runtime mutation path.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub guest_key: String,
    pub dashboard_key: String,
    pub guest_state_key: String,
    pub dashboard_state_key: String,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self {
            guest_key: require_env("GUEST_KEY")?,
            dashboard_key: require_env("DASHBOARD_KEY")?,
            guest_state_key: require_env("GUEST_STATE_KEY")?,
            dashboard_state_key: require_env("DASHBOARD_STATE_KEY")?,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, AuthError> {
    env::var(name).map_err(|_| AuthError::MissingConfig(name))
}

/// Maps a required role plus a presented credential to an allow/deny
/// decision. Denials are logged at error level; there is no rate limiting
/// or lockout.
pub struct RoleGate {
    config: AuthConfig,
}

impl RoleGate {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    fn secret(&self, role: Role) -> &str {
        match role {
            Role::Guest => &self.config.guest_key,
            Role::Dashboard => &self.config.dashboard_key,
        }
    }

    /// The opaque state token handed back to a caller who logs in as
    /// `role`; replayed client-side, never validated server-side.
    pub fn state_key(&self, role: Role) -> &str {
        match role {
            Role::Guest => &self.config.guest_state_key,
            Role::Dashboard => &self.config.dashboard_state_key,
        }
    }

    /// The guest secret itself, re-published in hashed form to a dashboard
    /// login so the dashboard can exercise guest operations.
    pub fn guest_secret(&self) -> &str {
        &self.config.guest_key
    }

    pub async fn authorize(&self, role: Role, credential: Option<&str>) -> bool {
        let Some(credential) = credential else {
            error!("Authorization failed for {:?}: no credential presented", role);
            return false;
        };

        let allowed = verify_credential(credential, self.secret(role)).await;
        if !allowed {
            error!(
                "Authorization failed for {:?}: credential did not verify",
                role
            );
        }
        allowed
    }
}

/// Checks a presented credential against the configured plaintext secret.
/// The client holds a salted hash of the secret and replays it, so the
/// comparison direction is inverted: the presented value is parsed as a PHC
/// string and the secret is verified against it. Anything malformed
/// verifies false. Argon2 is CPU-bound, so the work runs on the blocking
/// pool.
pub async fn verify_credential(presented: &str, secret: &str) -> bool {
    let presented = presented.to_owned();
    let secret = secret.to_owned();

    tokio::task::spawn_blocking(move || match PasswordHash::new(&presented) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    })
    .await
    .unwrap_or(false)
}

/// Hashes a secret with a fresh random salt, producing a PHC string that
/// `verify_credential` accepts. Only used when re-publishing the guest
/// secret to the dashboard at login.
pub async fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let secret = secret.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;

        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hash(e.to_string()))?
}

/// The caller-supplied credential, taken verbatim from the `authorization`
/// header. Extraction never fails; an absent or non-UTF-8 header simply
/// yields `None` and the role gate denies it.
pub struct Credential(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Ok(Credential(credential))
    }
}

/// Builds a request against the router for handler tests, with an optional
/// credential and JSON body.
#[cfg(feature = "test_utils")]
pub fn create_test_request(
    method: &str,
    uri: &str,
    credential: Option<&str>,
    body: Option<serde_json::Value>,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);

    if let Some(credential) = credential {
        builder = builder.header(AUTHORIZATION, credential);
    }

    match body {
        Some(json) => builder
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}
