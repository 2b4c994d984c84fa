//! Student submissions against assignments and exams.

pub mod service;

pub use service::{GradeRequest, SubmissionService};
