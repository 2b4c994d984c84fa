//! Visibility scope of a resource.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::error::AppError;

/// The `{department, year, subject?}` tuple controlling who may read a
/// resource. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Scope {
    /// Department code, e.g. `"CSE"`.
    pub department: String,
    /// Academic year label, e.g. `"2nd"`.
    pub year: String,
    /// Optional subject within the department and year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Scope {
    /// Build a scope from raw form input.
    ///
    /// Surrounding whitespace is trimmed. A blank department or year is a
    /// validation error; a blank subject is treated as absent.
    pub fn new(
        department: impl AsRef<str>,
        year: impl AsRef<str>,
        subject: Option<impl AsRef<str>>,
    ) -> Result<Self, AppError> {
        let department = department.as_ref().trim();
        let year = year.as_ref().trim();

        if department.is_empty() {
            return Err(AppError::validation("Scope department is required"));
        }
        if year.is_empty() {
            return Err(AppError::validation("Scope year is required"));
        }

        let subject = subject
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            department: department.to_string(),
            year: year.to_string(),
            subject,
        })
    }

    /// Whether a principal enrolled in `department`/`year` falls inside this scope.
    ///
    /// Subjects do not narrow read access: a student sees every subject of
    /// their own department and year.
    pub fn admits(&self, department: Option<&str>, year: Option<&str>) -> bool {
        match (department, year) {
            (Some(d), Some(y)) => d.trim() == self.department && y.trim() == self.year,
            _ => false,
        }
    }

    /// Whether another scope addresses the same department and year.
    pub fn same_cohort(&self, other: &Scope) -> bool {
        self.department == other.department && self.year == other.year
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "{}/{}/{}", self.department, self.year, subject),
            None => write!(f, "{}/{}", self.department, self.year),
        }
    }
}
