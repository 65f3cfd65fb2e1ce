use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Membership lifecycle state. Only active members appear on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            other => anyhow::bail!("unknown member status: {other}"),
        }
    }
}

/// Per-event attendance outcome. `Inactive` carries a side effect: it flips
/// the member's overall status to inactive during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    ExcusedAbsent,
    ExcusedLate,
    Inactive,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::ExcusedAbsent => "excused_absent",
            AttendanceStatus::ExcusedLate => "excused_late",
            AttendanceStatus::Inactive => "inactive",
        }
    }

    /// Human-readable form used in point-history reasons ("excused absent").
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::ExcusedAbsent => "excused absent",
            AttendanceStatus::ExcusedLate => "excused late",
            AttendanceStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            "excused_absent" => Ok(AttendanceStatus::ExcusedAbsent),
            "excused_late" => Ok(AttendanceStatus::ExcusedLate),
            "inactive" => Ok(AttendanceStatus::Inactive),
            other => anyhow::bail!("unknown attendance status: {other}"),
        }
    }
}

/// In-memory view of one member, loaded once per reconciliation.
#[derive(Debug, Clone)]
pub struct MemberState {
    pub id: Uuid,
    pub name: String,
    pub points: i32,
    pub status: MemberStatus,
}

/// One point change to feed through the reconciler.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub member_id: Uuid,
    pub points_change: i32,
    /// Flip the member to inactive as a side effect (attendance "inactive").
    pub marks_inactive: bool,
    /// Point-history reason, e.g. "Weekly Meeting - excused absent".
    pub reason: String,
    /// When set, an attendance record with this status is written alongside
    /// the point change.
    pub attendance: Option<AttendanceStatus>,
}

impl Mutation {
    /// Attendance-driven mutation with the standard reason format,
    /// `"{event name} - {status label}"`, e.g. "Weekly Meeting - excused
    /// absent". An `inactive` status carries the member-deactivation side
    /// effect.
    pub fn from_attendance(
        event_name: &str,
        member_id: Uuid,
        status: AttendanceStatus,
        points_change: i32,
    ) -> Self {
        Mutation {
            member_id,
            points_change,
            marks_inactive: status == AttendanceStatus::Inactive,
            reason: format!("{event_name} - {}", status.label()),
            attendance: Some(status),
        }
    }
}

/// New values to persist for one member after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPatch {
    pub member_id: Uuid,
    pub points: i32,
    pub status: MemberStatus,
    pub rank_change: i32,
}

/// Append-only ledger entry produced by a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub member_id: Uuid,
    /// None for manual adjustments not tied to an event.
    pub event_id: Option<Uuid>,
    pub points_change: i32,
    pub reason: String,
    /// Balance immediately after this entry.
    pub new_total: i32,
}

/// Attendance row captured at reconciliation time. `points_change` is the
/// delta actually applied, never recomputed later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub status: AttendanceStatus,
    pub points_change: i32,
    pub notes: Option<String>,
}

/// Everything a reconciliation wants persisted, in one unit.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub patches: Vec<MemberPatch>,
    pub history: Vec<HistoryRow>,
    pub attendance: Vec<AttendanceRow>,
}
