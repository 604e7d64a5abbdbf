//! Filter keys, the matching predicate and the memoized filter index.
//!
//! A filter is an ordered list of component tokens. A plain token requires
//! the component, a `!`-prefixed token requires its absence. The canonical
//! key is the tokens joined with commas; token order is significant, so
//! `"a,b"` and `"b,a"` are memoized separately.
//!
//! Filter entries are created lazily by the first query (one full scan of
//! the entity store). After that every mutation path keeps them current and
//! they are never rescanned.

use crate::ecs::entity::{Components, EntityStore};
use crate::ecs::listener::ChangeLists;
use crate::ecs::{ComponentId, Entity};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One parsed filter token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Term {
    With(ComponentId),
    Without(ComponentId),
    /// Empty or otherwise malformed token; never matches.
    Invalid,
}

impl Term {
    fn parse(token: &str) -> Self {
        match token.strip_prefix('!') {
            Some("") => Term::Invalid,
            Some(name) => Term::Without(ComponentId::intern(name)),
            None if token.is_empty() => Term::Invalid,
            None => Term::With(ComponentId::intern(token)),
        }
    }

    /// Evaluate against `components`, treating `ignored` as absent.
    fn holds(&self, components: &Components, ignored: &[ComponentId]) -> bool {
        let present = |id: &ComponentId| components.contains_key(id) && !ignored.contains(id);
        match self {
            Term::With(id) => present(id),
            Term::Without(id) => !present(id),
            Term::Invalid => false,
        }
    }
}

/// Canonical, parsed filter key.
///
/// Equality and hashing follow the canonical text, so a key can be looked
/// up by `&str`.
#[derive(Clone)]
pub struct FilterKey {
    text: String,
    terms: Vec<Term>,
}

impl FilterKey {
    /// Build a key from caller-ordered tokens.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        let text = tokens
            .iter()
            .map(|token| token.as_ref())
            .collect::<Vec<&str>>()
            .join(",");
        Self::parse(&text)
    }

    /// Parse a comma separated key such as `"position,!frozen"`.
    pub fn parse(text: &str) -> Self {
        Self {
            text: text.to_string(),
            terms: text.split(',').map(Term::parse).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Whether `components` satisfy every term.
    ///
    /// Components listed in `ignored` are treated as absent, which answers
    /// "would this entity match without component X" without mutating it.
    pub fn matches(&self, components: &Components, ignored: &[ComponentId]) -> bool {
        self.terms.iter().all(|term| term.holds(components, ignored))
    }
}

impl PartialEq for FilterKey {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for FilterKey {}

impl Hash for FilterKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Borrow<str> for FilterKey {
    fn borrow(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilterKey({:?})", self.text)
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Memoized matches of one filter plus its change lists.
#[derive(Debug, Default)]
pub(crate) struct FilterEntry {
    pub matches: Vec<Entity>,
    pub listeners: ChangeLists,
}

/// All filters queried so far.
#[derive(Default)]
pub(crate) struct FilterIndex {
    entries: HashMap<FilterKey, FilterEntry>,
}

impl FilterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the entry for `key`, seeding it with a full scan on first use.
    pub fn get_or_seed(&mut self, key: FilterKey, store: &EntityStore) -> &mut FilterEntry {
        self.entries.entry(key).or_insert_with_key(|key| {
            let matches = store
                .entities()
                .iter()
                .copied()
                .filter(|&entity| {
                    store
                        .components(entity)
                        .is_some_and(|components| key.matches(components, &[]))
                })
                .collect::<Vec<_>>();
            tracing::trace!(filter = %key, seeded = matches.len(), "filter created");
            FilterEntry {
                matches,
                listeners: ChangeLists::default(),
            }
        })
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&FilterEntry> {
        self.entries.get(key)
    }

    /// Bring every entry's membership of `entity` in line with `components`.
    ///
    /// `None` means the entity left the world.
    pub fn reconcile(&mut self, entity: Entity, components: Option<&Components>) {
        for (key, entry) in &mut self.entries {
            let now = components.is_some_and(|components| key.matches(components, &[]));
            let position = entry.matches.iter().position(|&e| e == entity);
            match (now, position) {
                (true, None) => entry.matches.push(entity),
                (false, Some(position)) => {
                    entry.matches.remove(position);
                }
                _ => {}
            }
        }
    }

    /// Record listener transitions caused by toggling `component`.
    ///
    /// `components` must currently contain `component`: call after inserting
    /// it when adding, before deleting it when removing.
    pub fn record_toggle(
        &mut self,
        entity: Entity,
        components: &Components,
        component: ComponentId,
        adding: bool,
    ) {
        for (key, entry) in &mut self.entries {
            let with = key.matches(components, &[]);
            let without = key.matches(components, &[component]);
            if adding {
                entry.listeners.record(entity, without, with);
            } else {
                entry.listeners.record(entity, with, without);
            }
        }
    }

    /// Record a newly created entity in the added lists it matches.
    pub fn record_spawn(&mut self, entity: Entity, components: &Components) {
        for (key, entry) in &mut self.entries {
            if key.matches(components, &[]) {
                entry.listeners.record(entity, false, true);
            }
        }
    }

    /// Record an entity leaving the world in every removed list it matches.
    pub fn record_despawn(&mut self, entity: Entity, components: &Components) {
        for (key, entry) in &mut self.entries {
            if key.matches(components, &[]) {
                entry.listeners.record_removed(entity);
            }
        }
    }

    pub fn clear_listeners(&mut self) {
        for entry in self.entries.values_mut() {
            entry.listeners.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
