use std::collections::HashSet;

use crate::models::{HubId, HubRecord};

/// Remove hubs whose id was already seen. Stable: the earliest record per id
/// survives and first-seen order is preserved. Id-less hubs all share the
/// [`HubId::Missing`] key, so only the first of them is kept.
pub fn dedupe(hubs: Vec<HubRecord>) -> Vec<HubRecord> {
    let mut unique = Vec::with_capacity(hubs.len());
    let mut seen: HashSet<HubId> = HashSet::new();

    for hub in hubs {
        if seen.insert(hub.id.clone()) {
            unique.push(hub);
        }
    }

    unique
}
