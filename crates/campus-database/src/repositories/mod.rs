//! Repository traits and their backends.
//!
//! Services only see the traits. [`postgres`] holds the sqlx
//! implementations and [`memory`] a single in-process store that
//! implements all of them.

pub mod attachment;
pub mod directory;
pub mod memory;
pub mod notification;
pub mod postgres;
pub mod resource;
pub mod submission;

pub use attachment::AttachmentRepository;
pub use directory::RecipientDirectory;
pub use notification::NotificationRepository;
pub use resource::ResourceRepository;
pub use submission::SubmissionRepository;
