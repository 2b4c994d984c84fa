//! Status workflows: the guarded transition operation.

pub mod service;

pub use service::{TransitionRequest, WorkflowService};
pub(crate) use service::apply_transition;
