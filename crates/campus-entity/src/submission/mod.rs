//! Student submissions against assignments and exams.

pub mod model;

pub use model::{MAX_GRADE_LEN, Submission};
