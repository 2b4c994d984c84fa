//! Scoped resource entities: the record itself, its visibility scope, its
//! kind, and the status workflows it moves through.

pub mod filter;
pub mod kind;
pub mod model;
pub mod scope;
pub mod status;

pub use filter::ResourceFilter;
pub use kind::ResourceKind;
pub use model::{Resource, ResourceDetail};
pub use scope::Scope;
pub use status::{Status, Workflow};
