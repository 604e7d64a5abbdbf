//! Per-filter change lists.
//!
//! Each filter can carry an "added" list and a "removed" list. They record
//! which entities started or stopped matching the filter since the lists
//! were last cleared, which happens once per frame during cleanup.

use crate::ecs::Entity;

/// Which change list a query reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Entities that started matching this frame.
    Added,
    /// Entities that stopped matching this frame.
    Removed,
}

/// The added/removed lists of one filter. Lists exist only once queried.
#[derive(Debug, Default)]
pub(crate) struct ChangeLists {
    added: Option<Vec<Entity>>,
    removed: Option<Vec<Entity>>,
}

impl ChangeLists {
    /// Return the requested list, creating it on first use.
    ///
    /// A new added list is seeded with `current` (everything matching now
    /// counts as added this frame); a new removed list starts empty.
    pub fn get_or_create(&mut self, kind: Listener, current: &[Entity]) -> &[Entity] {
        match kind {
            Listener::Added => self.added.get_or_insert_with(|| current.to_vec()),
            Listener::Removed => self.removed.get_or_insert_with(Vec::new),
        }
    }

    /// Record a change in match state for `entity`.
    pub fn record(&mut self, entity: Entity, matched_before: bool, matches_now: bool) {
        match (matched_before, matches_now) {
            (false, true) => push_unique(&mut self.added, entity),
            (true, false) => push_unique(&mut self.removed, entity),
            _ => {}
        }
    }

    /// Record an entity that is leaving the world while matching.
    pub fn record_removed(&mut self, entity: Entity) {
        push_unique(&mut self.removed, entity);
    }

    pub fn clear(&mut self) {
        if let Some(list) = self.added.as_mut() {
            list.clear();
        }
        if let Some(list) = self.removed.as_mut() {
            list.clear();
        }
    }
}

fn push_unique(list: &mut Option<Vec<Entity>>, entity: Entity) {
    // Inactive lists are not tracked
    if let Some(list) = list {
        if !list.contains(&entity) {
            list.push(entity);
        }
    }
}
