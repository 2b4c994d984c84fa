//! Notification fan-out and the recipient's notification inbox.

pub mod notifier;
pub mod service;

pub use notifier::Notifier;
pub use service::{NotificationList, NotificationService};
