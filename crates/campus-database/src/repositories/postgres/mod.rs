//! PostgreSQL repository implementations.

pub mod attachment;
pub mod directory;
pub mod notification;
pub mod resource;
pub mod submission;

pub use attachment::PgAttachmentRepository;
pub use directory::PgRecipientDirectory;
pub use notification::PgNotificationRepository;
pub use resource::PgResourceRepository;
pub use submission::PgSubmissionRepository;
