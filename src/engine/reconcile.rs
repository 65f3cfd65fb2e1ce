//! The reconciliation core shared by every point-mutating flow.
//!
//! Manual adjustments, attendance posts, event submissions, reverts and
//! rank-only recalculations all reduce to the same sequence: snapshot ranks,
//! apply a batch of mutations, snapshot again, diff. This function is pure
//! over the loaded member set; `db::ledger` persists the outcome in a single
//! transaction.

use uuid::Uuid;

use crate::engine::rank;
use crate::engine::types::{
    AttendanceRow, HistoryRow, MemberPatch, MemberState, MemberStatus, Mutation, ReconcileOutcome,
};

/// Apply `mutations` to `members` and compute what must be persisted.
///
/// Mutations referencing a member not in the loaded set are skipped silently,
/// as is a second attendance-bearing mutation for a member who already has an
/// attendance row in this batch (only one row per member and event exists).
/// A history row is written for every mutation except a zero delta with no
/// inactive side effect. Rank changes are diffed against the set as it stood
/// before any mutation; members that drop out of the active set fall out of
/// the new snapshot and keep a rank change of 0.
pub fn reconcile(
    members: &mut [MemberState],
    mutations: &[Mutation],
    event_id: Option<Uuid>,
) -> ReconcileOutcome {
    let old_ranks = rank::snapshot_ranks(members);

    let mut history = Vec::new();
    let mut attendance = Vec::new();
    let mut touched: Vec<Uuid> = Vec::new();

    for mutation in mutations {
        // One attendance row per member and event; a duplicate entry in the
        // batch is dropped whole, never double-applied.
        if event_id.is_some()
            && mutation.attendance.is_some()
            && attendance
                .iter()
                .any(|row: &AttendanceRow| row.member_id == mutation.member_id)
        {
            continue;
        }

        let Some(member) = members.iter_mut().find(|m| m.id == mutation.member_id) else {
            continue;
        };

        member.points += mutation.points_change;
        if mutation.marks_inactive {
            member.status = MemberStatus::Inactive;
        }
        if !touched.contains(&member.id) {
            touched.push(member.id);
        }

        if let Some(status) = mutation.attendance {
            // Attendance rows only make sense for event-backed flows.
            if let Some(event_id) = event_id {
                attendance.push(AttendanceRow {
                    event_id,
                    member_id: member.id,
                    status,
                    points_change: mutation.points_change,
                    notes: None,
                });
            }
        }

        if mutation.points_change != 0 || mutation.marks_inactive {
            history.push(HistoryRow {
                member_id: member.id,
                event_id,
                points_change: mutation.points_change,
                reason: mutation.reason.clone(),
                new_total: member.points,
            });
        }
    }

    let new_ranks = rank::snapshot_ranks(members);
    let deltas = rank::rank_deltas(&old_ranks, &new_ranks);

    // Patch every member that was mutated or is still on the leaderboard.
    let patches = members
        .iter()
        .filter(|m| m.status == MemberStatus::Active || touched.contains(&m.id))
        .map(|m| MemberPatch {
            member_id: m.id,
            points: m.points,
            status: m.status,
            rank_change: deltas.get(&m.id).copied().unwrap_or(0),
        })
        .collect();

    ReconcileOutcome {
        patches,
        history,
        attendance,
    }
}
