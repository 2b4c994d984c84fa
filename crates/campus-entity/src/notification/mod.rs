//! Notifications fanned out to everyone in a resource's scope.

pub mod event;
pub mod model;

pub use event::NotificationEvent;
pub use model::Notification;
