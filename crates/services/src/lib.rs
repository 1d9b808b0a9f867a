//! # services
//!
//! The business-rule layer. Each service owns one entity's operations, talks
//! to storage only through the domain port traits, and enforces ownership,
//! archival and validation rules before any write happens. The scheduler and
//! archiver are the background halves driven by the worker binary.

pub mod archiver;
pub mod earmarks;
pub mod events;
pub mod favorites;
pub mod notifications;
pub mod reminders;
pub mod users;

#[cfg(test)]
pub(crate) mod testutil;

pub use archiver::Archiver;
pub use earmarks::EarmarkService;
pub use events::{EventPatch, EventService};
pub use favorites::FavoriteService;
pub use notifications::NotificationService;
pub use reminders::ReminderScheduler;
pub use users::UserService;
