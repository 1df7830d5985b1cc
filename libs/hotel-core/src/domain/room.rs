use super::entity::{Entity, EntityRepository, clearable};
use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Cleaning => "cleaning",
            RoomStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub room_number: u32,
    pub status: RoomStatus,
    pub guest: Option<String>,
    pub check_out: Option<String>,
    pub branch_id: String,
    pub room_type: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub room_number: u32,
    pub status: RoomStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    pub branch_id: String,
    pub room_type: String,
    pub price: f64,
}

/// Partial room update. `guest` and `checkOut` accept `null` to clear them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RoomStatus>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub guest: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub check_out: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

// Rooms cycle through housekeeping states freely, so no patch is rejected.
impl Entity for Room {
    const COLLECTION: &'static str = "rooms";
    const FILTERS: &'static [&'static str] = &["branchId", "status"];

    type Draft = NewRoom;
    type Patch = RoomPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn branch_scope(&self) -> Option<&str> {
        Some(&self.branch_id)
    }

    fn draft_branch_scope(draft: &NewRoom) -> Option<&str> {
        Some(&draft.branch_id)
    }
}

impl EntityRepository<Room> {
    pub async fn by_branch(&self, branch_id: &str) -> Result<Vec<Room>, CoreError> {
        self.get_by_filter("branchId", branch_id).await
    }
}
