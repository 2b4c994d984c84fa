//! Profile entity model.
//!
//! Profiles are written by the hosted auth system; this service only reads
//! them to resolve notification recipients.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::UserId;

use crate::resource::Scope;

/// Portal role of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "profile_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    /// Enrolled student.
    Student,
    /// Teaching staff.
    Faculty,
    /// Portal administrator.
    Admin,
}

/// Directory entry for one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// The principal.
    pub user_id: UserId,
    /// Portal role.
    pub role: ProfileRole,
    /// Department the principal belongs to.
    pub department: Option<String>,
    /// Academic year, for students.
    pub year: Option<String>,
}

impl Profile {
    /// Whether this principal belongs to the scope's department and year.
    pub fn in_scope(&self, scope: &Scope) -> bool {
        scope.admits(self.department.as_deref(), self.year.as_deref())
    }
}
