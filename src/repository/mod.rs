//! Repositories orchestrating the remote and local stores.

pub mod fallback;
pub mod readings;
pub mod reminders;

pub use fallback::{with_fallback, StorePath};
pub use readings::{ReadingRepository, RepositoryError};
pub use reminders::ReminderRepository;
