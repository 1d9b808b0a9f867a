//! # storage-adapters
//!
//! sqlx/Postgres implementations of the domain persistence ports. Each entity
//! gets its own typed repository owning its row struct and mapping; the
//! shared transactional primitives live in [`store`].

pub mod store;

mod earmarks;
mod event_items;
mod events;
mod favorites;
mod notifications;
mod reminders;
mod users;

pub use earmarks::PgEarmarkRepo;
pub use event_items::PgEventItemRepo;
pub use events::PgEventRepo;
pub use favorites::PgFavoriteRepo;
pub use notifications::PgNotificationRepo;
pub use reminders::PgReminderRepo;
pub use store::PgStore;
pub use users::PgUserRepo;
