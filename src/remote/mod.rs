//! Remote backend persistence, scoped to an authenticated identity.

pub mod config;
pub mod session;
pub mod store;

pub use config::RemoteConfig;
pub use session::{AuthSession, SessionProvider, StaticSession, SupabaseSession};
pub use store::{RemoteError, RemoteStore};
