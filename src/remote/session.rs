//! Auth session resolution for the remote store.
//!
//! The remote store only consumes an authenticated identity; how the user
//! signed in is the auth collaborator's business. Providers expose a fast
//! (possibly cached) lookup plus a slower authoritative check.

use crate::remote::config::RemoteConfig;
use crate::remote::store::RemoteError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A resolved authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Backend identity the row-level policies are scoped to.
    pub user_id: String,
    /// Bearer token sent on every remote request.
    pub access_token: String,
}

/// Source of the current authenticated session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Fast lookup of a cached session, if one is known.
    async fn cached_session(&self) -> Option<AuthSession>;

    /// Authoritative check against the auth backend.
    ///
    /// `Ok(None)` means "definitely signed out" as opposed to a transport
    /// failure.
    async fn resolve_session(&self) -> Result<Option<AuthSession>, RemoteError>;
}

/// Session provider backed by the Supabase auth endpoint.
pub struct SupabaseSession {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
    cached: Arc<RwLock<Option<AuthSession>>>,
}

impl SupabaseSession {
    /// Create a provider for the given backend.
    pub fn new(config: &RemoteConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: Arc::new(RwLock::new(None)),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Install the access token obtained at sign-in.
    ///
    /// Clears any cached identity so the next lookup re-resolves.
    pub async fn set_access_token(&self, token: String) {
        *self.access_token.write().await = Some(token);
        *self.cached.write().await = None;
    }

    /// Forget the token and cached identity (sign-out).
    pub async fn clear(&self) {
        *self.access_token.write().await = None;
        *self.cached.write().await = None;
    }
}

#[async_trait]
impl SessionProvider for SupabaseSession {
    async fn cached_session(&self) -> Option<AuthSession> {
        self.cached.read().await.clone()
    }

    async fn resolve_session(&self) -> Result<Option<AuthSession>, RemoteError> {
        let Some(token) = self.access_token.read().await.clone() else {
            return Ok(None);
        };

        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            // Token rejected: signed out, not a transport failure
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::Http(format!(
                "auth endpoint returned status {status}"
            )));
        }

        let user: AuthUserResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;

        let session = AuthSession {
            user_id: user.id,
            access_token: token,
        };
        *self.cached.write().await = Some(session.clone());

        Ok(Some(session))
    }
}

#[derive(Debug, Deserialize)]
struct AuthUserResponse {
    id: String,
}

/// Fixed-session provider for tests and local tooling.
pub struct StaticSession {
    session: Option<AuthSession>,
}

impl StaticSession {
    /// A provider that always resolves to the given identity.
    pub fn signed_in(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            session: Some(AuthSession {
                user_id: user_id.into(),
                access_token: access_token.into(),
            }),
        }
    }

    /// A provider with no session at all.
    pub fn signed_out() -> Self {
        Self { session: None }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn cached_session(&self) -> Option<AuthSession> {
        self.session.clone()
    }

    async fn resolve_session(&self) -> Result<Option<AuthSession>, RemoteError> {
        Ok(self.session.clone())
    }
}
