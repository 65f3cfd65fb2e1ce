//! Rules-table resolution.

use std::collections::HashMap;

use clubpoints_server::engine::rules::{
    point_change, CustomRules, ACTIVE_MEETING, EXEC_MEETING, SOCIAL_EVENT,
};
use clubpoints_server::engine::types::AttendanceStatus::*;

#[test]
fn standard_meeting_deltas() {
    assert_eq!(point_change(ACTIVE_MEETING, Absent, None), -5);
    assert_eq!(point_change(ACTIVE_MEETING, Late, None), -2);
    assert_eq!(point_change(ACTIVE_MEETING, ExcusedAbsent, None), -1);
    assert_eq!(point_change(ACTIVE_MEETING, ExcusedLate, None), -1);
    assert_eq!(point_change(ACTIVE_MEETING, Present, None), 0);
    assert_eq!(point_change(ACTIVE_MEETING, Inactive, None), 0);
}

#[test]
fn exec_meetings_use_the_same_table() {
    for status in [Present, Absent, Late, ExcusedAbsent, ExcusedLate, Inactive] {
        assert_eq!(
            point_change(EXEC_MEETING, status, None),
            point_change(ACTIVE_MEETING, status, None),
        );
    }
}

#[test]
fn unknown_category_falls_back_to_standard_meeting() {
    assert_eq!(point_change("Hackathon Night", Absent, None), -5);
    assert_eq!(point_change("", Late, None), -2);
}

#[test]
fn social_events_have_no_status_deltas() {
    for status in [Present, Absent, Late, ExcusedAbsent, ExcusedLate, Inactive] {
        assert_eq!(point_change(SOCIAL_EVENT, status, None), 0);
    }
}

#[test]
fn custom_rule_overrides_the_standard_delta() {
    let custom: CustomRules = HashMap::from([(Absent, -10)]);
    assert_eq!(point_change(ACTIVE_MEETING, Absent, Some(&custom)), -10);
}

#[test]
fn explicit_zero_custom_rule_wins() {
    let custom: CustomRules = HashMap::from([(Absent, 0)]);
    assert_eq!(point_change(ACTIVE_MEETING, Absent, Some(&custom)), 0);
}

#[test]
fn statuses_missing_from_custom_rules_fall_through() {
    let custom: CustomRules = HashMap::from([(Absent, -10)]);
    assert_eq!(point_change(ACTIVE_MEETING, Late, Some(&custom)), -2);
}
