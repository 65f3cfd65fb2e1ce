//! Attendance-to-points rules per event category.

use std::collections::HashMap;

use crate::engine::types::AttendanceStatus;

pub const ACTIVE_MEETING: &str = "Active Meeting";
pub const EXEC_MEETING: &str = "Exec Meeting";
pub const SOCIAL_EVENT: &str = "Social Event";
pub const CUSTOM_EVENT: &str = "Custom Event";

/// Per-event override of the standard table, keyed by status.
pub type CustomRules = HashMap<AttendanceStatus, i32>;

/// Standard meeting deltas. Active and exec meetings share the same table.
fn meeting_delta(status: AttendanceStatus) -> i32 {
    match status {
        AttendanceStatus::Absent => -5,
        AttendanceStatus::Late => -2,
        AttendanceStatus::ExcusedAbsent | AttendanceStatus::ExcusedLate => -1,
        AttendanceStatus::Present | AttendanceStatus::Inactive => 0,
    }
}

/// Resolve the point delta for one attendance status.
///
/// An explicit custom-rule entry wins, including an explicit 0. Social events
/// have no status-keyed deltas (the flat per-member award is handled by the
/// caller); any other category, known or not, uses the standard meeting table.
pub fn point_change(
    event_type: &str,
    status: AttendanceStatus,
    custom_rules: Option<&CustomRules>,
) -> i32 {
    if let Some(rules) = custom_rules {
        if let Some(&delta) = rules.get(&status) {
            return delta;
        }
    }
    match event_type {
        SOCIAL_EVENT => 0,
        _ => meeting_delta(status),
    }
}
