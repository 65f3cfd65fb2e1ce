use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::engine::types::{MemberState, MemberStatus};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub points: i32,
    pub status: String,
    pub rank_change: i32,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Engine-side view of this row. An unparseable status column is treated
    /// as inactive so a bad row can never join the leaderboard.
    pub fn state(&self) -> MemberState {
        MemberState {
            id: self.id,
            name: self.name.clone(),
            points: self.points,
            status: self.status.parse().unwrap_or(MemberStatus::Inactive),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub event_type: String,
    pub date: DateTime<Utc>,
    pub is_draft: bool,
    pub is_reverted: bool,
    /// JSON-encoded status → delta overrides, when the event carries any.
    pub custom_rules: Option<String>,
    pub selected_members: Option<Vec<Uuid>>,
    /// Poll column id this event was imported from, if any.
    pub airtable_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new event. The id is generated by the caller so
/// attendance and history rows can reference it inside one transaction.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub id: Uuid,
    pub name: String,
    pub event_type: String,
    pub date: DateTime<Utc>,
    pub is_draft: bool,
    pub custom_rules: Option<String>,
    pub selected_members: Option<Vec<Uuid>>,
    pub airtable_event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub status: String,
    pub points_change: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// History row joined with member / event names for the read endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PointHistoryEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub event_id: Option<Uuid>,
    pub points_change: i32,
    pub reason: String,
    pub new_total: i32,
    pub timestamp: DateTime<Utc>,
    pub member_name: String,
    pub event_name: Option<String>,
}
