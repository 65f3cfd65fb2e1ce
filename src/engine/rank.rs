//! Leaderboard ranking: snapshot the total order, diff two snapshots.

use std::collections::HashMap;

use uuid::Uuid;

use crate::engine::types::{MemberState, MemberStatus};

/// 1-based ranks for all active members, ordered by points descending with
/// an exact byte-wise name comparison as tie-break. Byte-wise (not locale
/// aware) so that two snapshots of the same list are always identical.
pub fn snapshot_ranks(members: &[MemberState]) -> HashMap<Uuid, u32> {
    let mut active: Vec<&MemberState> = members
        .iter()
        .filter(|m| m.status == MemberStatus::Active)
        .collect();
    active.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
    active
        .iter()
        .enumerate()
        .map(|(i, m)| (m.id, i as u32 + 1))
        .collect()
}

/// Movement since the old snapshot: positive = moved up, negative = down.
/// Members with no old rank (newly active) count as unmoved, delta 0.
pub fn rank_deltas(old: &HashMap<Uuid, u32>, new: &HashMap<Uuid, u32>) -> HashMap<Uuid, i32> {
    new.iter()
        .map(|(id, &new_rank)| {
            let old_rank = old.get(id).copied().unwrap_or(new_rank);
            (*id, old_rank as i32 - new_rank as i32)
        })
        .collect()
}
