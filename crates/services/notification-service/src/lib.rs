//! In-memory notification center.
//!
//! A [`NotificationCenter`] keeps an ordered list of short-lived messages.
//! Each message is removed automatically after a fixed delay (4 seconds by
//! default) unless it is dismissed first. Components that only need to emit
//! messages receive a [`NotificationContext`]; the [`NotificationHub`] keeps
//! one center per user for the HTTP API.

pub mod center;
pub mod context;
pub mod error;
pub mod hub;
pub mod notification;

pub use center::{NotificationCenter, DEFAULT_TTL};
pub use context::NotificationContext;
pub use error::NotificationError;
pub use hub::NotificationHub;
pub use notification::{Notification, NotificationId, Severity};
