//! Remote backend configuration from the environment.

/// Environment variable holding the backend project URL.
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";

/// Environment variable holding the backend public (anon) key.
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

/// Connection settings for the remote backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// Returns `None` when either value is missing or empty. That is not an
    /// error: it selects local-only mode.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var(ENV_SUPABASE_URL).ok()?;
        let anon_key = std::env::var(ENV_SUPABASE_ANON_KEY).ok()?;

        if url.trim().is_empty() || anon_key.trim().is_empty() {
            tracing::warn!("Remote backend not configured; using local storage only");
            return None;
        }

        Some(Self { url, anon_key })
    }
}
