use super::entity::{Entity, EntityRepository};
use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked-in",
            BookingStatus::CheckedOut => "checked-out",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this state still holds its room.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::CheckedIn)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        *self == next
            || matches!(
                (self, next),
                (Pending, Confirmed)
                    | (Pending, Cancelled)
                    | (Confirmed, CheckedIn)
                    | (Confirmed, Cancelled)
                    | (CheckedIn, CheckedOut)
            )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub guest_name: String,
    pub email: String,
    pub room_number: u32,
    pub room_type: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub check_in: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub check_out: String,
    pub branch_id: String,
    pub status: BookingStatus,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub guest_name: String,
    pub email: String,
    pub room_number: u32,
    pub room_type: String,
    pub check_in: String,
    pub check_out: String,
    pub branch_id: String,
    pub status: BookingStatus,
    pub total_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

impl Entity for Booking {
    const COLLECTION: &'static str = "bookings";
    const FILTERS: &'static [&'static str] = &["branchId", "email", "status"];

    type Draft = NewBooking;
    type Patch = BookingPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn branch_scope(&self) -> Option<&str> {
        Some(&self.branch_id)
    }

    fn draft_branch_scope(draft: &NewBooking) -> Option<&str> {
        Some(&draft.branch_id)
    }

    fn check_patch(&self, patch: &BookingPatch) -> Result<(), CoreError> {
        match patch.status {
            Some(next) if !self.status.can_transition_to(next) => Err(CoreError::Validation(
                format!("booking {} cannot move from {} to {}", self.id, self.status, next),
            )),
            _ => Ok(()),
        }
    }
}

impl EntityRepository<Booking> {
    pub async fn by_branch(&self, branch_id: &str) -> Result<Vec<Booking>, CoreError> {
        self.get_by_filter("branchId", branch_id).await
    }

    pub async fn by_email(&self, email: &str) -> Result<Vec<Booking>, CoreError> {
        self.get_by_filter("email", email).await
    }
}
