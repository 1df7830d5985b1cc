use super::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A hotel location. `rooms`, `occupancy` and `revenue` are the figures
/// recorded on the branch itself, not values derived from its rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub location: String,
    pub rooms: u32,
    /// Percentage, 0-100.
    pub occupancy: u32,
    pub revenue: f64,
    pub admin_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBranch {
    pub name: String,
    pub location: String,
    pub rooms: u32,
    pub occupancy: u32,
    pub revenue: f64,
    pub admin_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
}

// A branch scopes itself.
impl Entity for Branch {
    const COLLECTION: &'static str = "branches";
    const FILTERS: &'static [&'static str] = &["location", "adminId"];

    type Draft = NewBranch;
    type Patch = BranchPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn branch_scope(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn draft_branch_scope(_draft: &NewBranch) -> Option<&str> {
        None
    }
}
