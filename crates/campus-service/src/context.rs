//! Request context carrying the acting principal.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::types::UserId;
use campus_entity::resource::{Resource, Scope};

/// Context for the current request.
///
/// Built by the API layer from gateway headers and passed into every
/// service method so each operation knows who is acting and which cohort
/// they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting principal.
    pub user_id: UserId,
    /// Department the principal belongs to, if known.
    pub department: Option<String>,
    /// Academic year the principal belongs to, if known.
    pub year: Option<String>,
    /// Caller-supplied budget for uploads and fan-out.
    #[serde(skip)]
    pub deadline: Option<Duration>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for a principal with no known cohort.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            department: None,
            year: None,
            deadline: None,
            request_time: Utc::now(),
        }
    }

    /// Attach the principal's department and year.
    pub fn with_cohort(mut self, department: impl Into<String>, year: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self.year = Some(year.into());
        self
    }

    /// Attach a caller deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether the principal belongs to `scope`'s department and year.
    pub fn in_scope(&self, scope: &Scope) -> bool {
        scope.admits(self.department.as_deref(), self.year.as_deref())
    }

    /// Whether the principal may read `resource`: owners always can,
    /// everyone else needs a matching cohort.
    pub fn can_read(&self, resource: &Resource) -> bool {
        resource.is_owned_by(self.user_id) || self.in_scope(&resource.scope)
    }

    /// The caller deadline, or `fallback` when none was supplied.
    pub fn deadline_or(&self, fallback: Duration) -> Duration {
        self.deadline.unwrap_or(fallback)
    }
}
