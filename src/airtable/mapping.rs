//! Fuzzy identity resolution between poll person names and club members.
//!
//! Deliberately simple: case-insensitive containment in either direction,
//! else first-token equality. Existing imports depend on exactly this
//! behavior, so don't swap in an edit-distance scheme without re-verifying
//! every stored mapping.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use uuid::Uuid;

// Successful resolutions keyed by normalized poll name. Polls repeat the
// same respondents week after week, so remembering a match skips the member
// scan on every re-sync.
static MATCHES: Lazy<DashMap<String, Uuid>> = Lazy::new(DashMap::new);

/// "quinn" matches "Quinn Kiefer"; "Kit Zeliff" matches "Kit"; "ash b"
/// matches "Ash Barrett" via containment; "Sam Smith" matches "Sam Jones"
/// via first-token equality.
pub fn flexible_name_match(poll_name: &str, member_name: &str) -> bool {
    let poll = poll_name.trim().to_lowercase();
    let member = member_name.trim().to_lowercase();

    if member.contains(&poll) || poll.contains(&member) {
        return true;
    }

    let poll_first = poll.split_whitespace().next();
    let member_first = member.split_whitespace().next();
    match (poll_first, member_first) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Resolve a poll person name to a member id, consulting and warming the
/// match cache. A cached id that no longer appears in `members` (the member
/// was deleted or went inactive) is dropped and the name re-resolved from
/// scratch.
pub fn resolve_member(poll_name: &str, members: &[(Uuid, String)]) -> Option<Uuid> {
    let key = poll_name.trim().to_lowercase();

    if let Some(hit) = MATCHES.get(&key) {
        let cached = *hit;
        drop(hit);
        if members.iter().any(|(id, _)| *id == cached) {
            return Some(cached);
        }
        MATCHES.remove(&key);
    }

    let found = members
        .iter()
        .find(|(_, name)| flexible_name_match(poll_name, name))
        .map(|(id, _)| *id)?;
    MATCHES.insert(key, found);
    Some(found)
}
