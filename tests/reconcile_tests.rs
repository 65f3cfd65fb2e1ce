//! End-to-end properties of the reconciliation core.

use clubpoints_server::engine::reconcile::reconcile;
use clubpoints_server::engine::types::{
    AttendanceStatus, MemberState, MemberStatus, Mutation, ReconcileOutcome,
};
use uuid::Uuid;

fn member(name: &str, points: i32) -> MemberState {
    MemberState {
        id: Uuid::new_v4(),
        name: name.into(),
        points,
        status: MemberStatus::Active,
    }
}

fn adjustment(member_id: Uuid, delta: i32, reason: &str) -> Mutation {
    Mutation {
        member_id,
        points_change: delta,
        marks_inactive: false,
        reason: reason.into(),
        attendance: None,
    }
}

#[test]
fn history_totals_stay_consistent_with_balance() {
    // Starting value 100, then a run of reconciliations; the sum of history
    // deltas plus 100 must equal the final balance.
    let mut members = vec![member("Ada", 100), member("Grace", 100)];
    let ada = members[0].id;

    let mut all_history = Vec::new();
    for delta in [-5, 3, -2, 10, -1] {
        let outcome = reconcile(
            &mut members,
            &[adjustment(ada, delta, "test adjustment")],
            None,
        );
        all_history.extend(outcome.history);
    }

    let logged: i32 = all_history
        .iter()
        .filter(|h| h.member_id == ada)
        .map(|h| h.points_change)
        .sum();
    assert_eq!(100 + logged, members[0].points);

    // Each entry's new_total equals the previous total plus its delta.
    let mut running = 100;
    for entry in all_history.iter().filter(|h| h.member_id == ada) {
        running += entry.points_change;
        assert_eq!(entry.new_total, running);
    }
}

#[test]
fn zero_delta_mutations_write_no_history() {
    let mut members = vec![member("Ada", 100)];
    let ada = members[0].id;

    let outcome = reconcile(&mut members, &[adjustment(ada, 0, "noop")], None);
    assert!(outcome.history.is_empty());
}

#[test]
fn inactive_side_effect_is_logged_even_at_zero_delta() {
    let mut members = vec![member("Ada", 100), member("Grace", 90)];
    let ada = members[0].id;
    let grace = members[1].id;

    let mutation = Mutation {
        member_id: ada,
        points_change: 0,
        marks_inactive: true,
        reason: "Weekly Meeting - inactive".into(),
        attendance: Some(AttendanceStatus::Inactive),
    };
    let outcome = reconcile(&mut members, &[mutation], Some(Uuid::new_v4()));

    assert_eq!(outcome.history.len(), 1);
    assert_eq!(members[0].status, MemberStatus::Inactive);

    // Ada leaves the board: her patch keeps rank_change 0, Grace moves up.
    let ada_patch = outcome.patches.iter().find(|p| p.member_id == ada).unwrap();
    assert_eq!(ada_patch.status, MemberStatus::Inactive);
    assert_eq!(ada_patch.rank_change, 0);

    let grace_patch = outcome.patches.iter().find(|p| p.member_id == grace).unwrap();
    assert_eq!(grace_patch.rank_change, 1);
}

#[test]
fn unknown_members_are_skipped_silently() {
    let mut members = vec![member("Ada", 100)];
    let outcome = reconcile(
        &mut members,
        &[adjustment(Uuid::new_v4(), -50, "ghost")],
        None,
    );

    assert!(outcome.history.is_empty());
    assert_eq!(members[0].points, 100);
    // The lone active member is still patched (rank refresh), unmoved.
    assert_eq!(outcome.patches.len(), 1);
    assert_eq!(outcome.patches[0].rank_change, 0);
}

#[test]
fn submit_then_revert_restores_points_exactly() {
    let mut members = vec![member("Maya", 100), member("Noah", 100)];
    let maya = members[0].id;
    let noah = members[1].id;
    let event_id = Uuid::new_v4();

    // Standard meeting: Maya absent (-5), Noah present (0).
    let submit = vec![
        Mutation {
            member_id: maya,
            points_change: -5,
            marks_inactive: false,
            reason: "Weekly Meeting - absent".into(),
            attendance: Some(AttendanceStatus::Absent),
        },
        Mutation {
            member_id: noah,
            points_change: 0,
            marks_inactive: false,
            reason: "Weekly Meeting - present".into(),
            attendance: Some(AttendanceStatus::Present),
        },
    ];
    let submitted: ReconcileOutcome = reconcile(&mut members, &submit, Some(event_id));
    assert_eq!(members[0].points, 95);
    assert_eq!(submitted.attendance.len(), 2);
    // Present at zero delta leaves no history entry.
    assert_eq!(submitted.history.len(), 1);

    // Revert applies the inverse of each captured delta.
    let revert: Vec<Mutation> = submitted
        .attendance
        .iter()
        .map(|row| Mutation {
            member_id: row.member_id,
            points_change: -row.points_change,
            marks_inactive: false,
            reason: "Event reverted".into(),
            attendance: None,
        })
        .collect();
    let reverted = reconcile(&mut members, &revert, Some(event_id));

    assert_eq!(members[0].points, 100);
    assert_eq!(members[1].points, 100);
    assert_eq!(reverted.history.len(), 1);
    assert_eq!(reverted.history[0].points_change, 5);
    assert_eq!(reverted.history[0].reason, "Event reverted");
    assert_eq!(reverted.history[0].new_total, 100);
}

#[test]
fn social_award_touches_only_selected_members() {
    let mut members = vec![member("Ana", 100), member("Ben", 100), member("Cal", 100)];
    let ana = members[0].id;
    let cal = members[2].id;
    let event_id = Uuid::new_v4();

    let mutations: Vec<Mutation> = [ana, cal]
        .iter()
        .map(|&member_id| Mutation {
            member_id,
            points_change: 10,
            marks_inactive: false,
            reason: "Beach Day - Social Event".into(),
            attendance: Some(AttendanceStatus::Present),
        })
        .collect();
    let outcome = reconcile(&mut members, &mutations, Some(event_id));

    assert_eq!(members[0].points, 110);
    assert_eq!(members[1].points, 100);
    assert_eq!(members[2].points, 110);
    assert_eq!(outcome.history.len(), 2);
    assert!(outcome.history.iter().all(|h| h.points_change == 10));
}

#[test]
fn rank_only_reconciliation_is_idempotent() {
    let mut members = vec![member("Ada", 120), member("Grace", 80), member("Lin", 100)];

    let first = reconcile(&mut members, &[], None);
    let second = reconcile(&mut members, &[], None);

    // No mutations means old and new snapshots agree: all deltas zero, and a
    // second pass changes nothing.
    for outcome in [&first, &second] {
        assert_eq!(outcome.patches.len(), 3);
        assert!(outcome.patches.iter().all(|p| p.rank_change == 0));
        assert!(outcome.history.is_empty());
    }
}

#[test]
fn rank_movement_is_reported_against_the_pre_mutation_order() {
    // Dee (rank 4 of 4) jumps to rank 1 on a +40 swing.
    let mut members = vec![
        member("Ada", 130),
        member("Bea", 120),
        member("Cyd", 110),
        member("Dee", 100),
    ];
    let dee = members[3].id;

    let outcome = reconcile(&mut members, &[adjustment(dee, 40, "bonus")], None);

    let patch = outcome.patches.iter().find(|p| p.member_id == dee).unwrap();
    assert_eq!(patch.points, 140);
    assert_eq!(patch.rank_change, 3);

    // Everyone else slipped one place.
    for other in outcome.patches.iter().filter(|p| p.member_id != dee) {
        assert_eq!(other.rank_change, -1);
    }
}

#[test]
fn duplicate_attendance_entries_apply_once() {
    let mut members = vec![member("Ada", 100)];
    let ada = members[0].id;
    let event_id = Uuid::new_v4();

    let entry = Mutation::from_attendance("Weekly Meeting", ada, AttendanceStatus::Absent, -5);
    let outcome = reconcile(&mut members, &[entry.clone(), entry], Some(event_id));

    // The repeated entry is dropped whole: one deduction, one attendance
    // row, one ledger entry.
    assert_eq!(members[0].points, 95);
    assert_eq!(outcome.attendance.len(), 1);
    assert_eq!(outcome.history.len(), 1);
}

#[test]
fn attendance_reasons_spell_statuses_with_spaces() {
    let excused = Mutation::from_attendance(
        "Weekly Meeting",
        Uuid::new_v4(),
        AttendanceStatus::ExcusedAbsent,
        -1,
    );
    assert_eq!(excused.reason, "Weekly Meeting - excused absent");
    assert!(!excused.marks_inactive);
    assert_eq!(excused.attendance, Some(AttendanceStatus::ExcusedAbsent));

    let inactive =
        Mutation::from_attendance("Weekly Meeting", Uuid::new_v4(), AttendanceStatus::Inactive, 0);
    assert_eq!(inactive.reason, "Weekly Meeting - inactive");
    assert!(inactive.marks_inactive);
}

#[test]
fn points_may_go_negative() {
    let mut members = vec![member("Ada", 3)];
    let ada = members[0].id;

    reconcile(&mut members, &[adjustment(ada, -10, "penalty")], None);
    assert_eq!(members[0].points, -7);
}
