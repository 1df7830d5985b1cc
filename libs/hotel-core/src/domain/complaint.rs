use super::entity::{Entity, EntityRepository};
use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in-progress",
            ComplaintStatus::Resolved => "resolved",
        }
    }

    pub fn can_transition_to(&self, next: ComplaintStatus) -> bool {
        use ComplaintStatus::*;
        match (self, next) {
            (Resolved, InProgress) => false,
            // pending <-> in-progress, anything -> resolved, resolved -> pending (re-open)
            _ => true,
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    /// Guest name as reported.
    pub client: String,
    pub room: u32,
    pub issue: String,
    pub status: ComplaintStatus,
    /// Free-form display time, e.g. "2 hours ago".
    pub time: String,
    pub branch_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    pub client: String,
    pub room: u32,
    pub issue: String,
    pub status: ComplaintStatus,
    pub time: String,
    pub branch_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplaintStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}

impl Entity for Complaint {
    const COLLECTION: &'static str = "complaints";
    const FILTERS: &'static [&'static str] = &["branchId", "status"];

    type Draft = NewComplaint;
    type Patch = ComplaintPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn branch_scope(&self) -> Option<&str> {
        Some(&self.branch_id)
    }

    fn draft_branch_scope(draft: &NewComplaint) -> Option<&str> {
        Some(&draft.branch_id)
    }

    fn check_patch(&self, patch: &ComplaintPatch) -> Result<(), CoreError> {
        match patch.status {
            Some(next) if !self.status.can_transition_to(next) => Err(CoreError::Validation(
                format!("complaint {} cannot move from {} to {}", self.id, self.status, next),
            )),
            _ => Ok(()),
        }
    }
}

impl EntityRepository<Complaint> {
    pub async fn by_branch(&self, branch_id: &str) -> Result<Vec<Complaint>, CoreError> {
        self.get_by_filter("branchId", branch_id).await
    }
}
