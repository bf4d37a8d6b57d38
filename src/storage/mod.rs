//! Local on-device persistence, available offline and without an account.

pub mod database;
pub mod schema;

pub use database::{Database, DatabaseError};
