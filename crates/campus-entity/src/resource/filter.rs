//! Filters for resource list queries.

use serde::{Deserialize, Serialize};

use campus_core::types::UserId;

use super::kind::ResourceKind;
use super::status::Status;

/// Optional predicates combined with `AND` when listing resources.
///
/// Results are always ordered most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    /// Exact department match.
    pub department: Option<String>,
    /// Exact year match.
    pub year: Option<String>,
    /// Exact subject match.
    pub subject: Option<String>,
    /// Restrict to one kind.
    pub kind: Option<ResourceKind>,
    /// Restrict to one status.
    pub status: Option<Status>,
    /// Restrict to resources created by this principal.
    pub owner_id: Option<UserId>,
}

impl ResourceFilter {
    /// Whether a resource with the given attributes passes every predicate.
    pub fn matches(&self, resource: &super::Resource) -> bool {
        let eq = |want: &Option<String>, have: &str| want.as_deref().is_none_or(|w| w == have);

        eq(&self.department, &resource.scope.department)
            && eq(&self.year, &resource.scope.year)
            && self
                .subject
                .as_deref()
                .is_none_or(|s| resource.scope.subject.as_deref() == Some(s))
            && self.kind.is_none_or(|k| k == resource.kind)
            && self.status.is_none_or(|s| s == resource.status)
            && self.owner_id.is_none_or(|o| o == resource.owner_id)
    }
}
