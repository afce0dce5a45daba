//! Relationship store: the declared subordinate -> manager table.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::instrument;

use crate::domain::entities::Relationship;

/// Insertion-ordered set of relationships, keyed by subordinate.
///
/// Keying by subordinate gives the "one manager per employee" invariant for
/// free; insertion order drives the order of direct reports in the forest.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    relationships: IndexMap<String, Relationship>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subordinate_id: &str) -> Option<&Relationship> {
        self.relationships.get(subordinate_id)
    }

    pub fn contains(&self, subordinate_id: &str) -> bool {
        self.relationships.contains_key(subordinate_id)
    }

    /// Declared manager of a placed subordinate.
    pub fn manager_of(&self, subordinate_id: &str) -> Option<&str> {
        self.relationships
            .get(subordinate_id)
            .and_then(|r| r.manager_id.as_deref())
    }

    /// Insert or replace the relationship for its subordinate.
    ///
    /// A changed manager moves the relationship to the end, so a re-parented
    /// employee shows up as the newest report of its new manager.
    #[instrument(level = "trace", skip(self))]
    pub fn upsert(&mut self, relationship: Relationship) {
        match self.relationships.get(&relationship.subordinate_id) {
            Some(existing) if existing.manager_id == relationship.manager_id => {}
            Some(_) => {
                self.relationships
                    .shift_remove(&relationship.subordinate_id);
                self.relationships
                    .insert(relationship.subordinate_id.clone(), relationship);
            }
            None => {
                self.relationships
                    .insert(relationship.subordinate_id.clone(), relationship);
            }
        }
    }

    pub fn remove(&mut self, subordinate_id: &str) -> Option<Relationship> {
        self.relationships.shift_remove(subordinate_id)
    }

    /// Remove a batch of subordinates, returning how many were present.
    pub fn remove_all<S: AsRef<str>>(&mut self, subordinate_ids: &[S]) -> usize {
        subordinate_ids
            .iter()
            .filter(|id| self.remove(id.as_ref()).is_some())
            .count()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Relationship) -> bool) {
        self.relationships.retain(|_, r| keep(r));
    }

    pub fn clear(&mut self) {
        self.relationships.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// True if `target` lies on the manager chain starting at `start`
    /// (`start` itself included).
    ///
    /// Follows declared links, including ones whose manager is not placed
    /// yet, since placing that manager would activate the link.
    #[instrument(level = "trace", skip(self))]
    pub fn chain_contains(&self, start: &str, target: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if id == target {
                return true;
            }
            if !visited.insert(id) {
                return false;
            }
            current = self.manager_of(id);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(edges: &[(&str, Option<&str>)]) -> RelationshipStore {
        let mut store = RelationshipStore::new();
        for (sub, mgr) in edges {
            store.upsert(Relationship::new(*sub, *mgr));
        }
        store
    }

    #[test]
    fn given_existing_subordinate_when_upserting_new_manager_then_replaces_and_moves_last() {
        let mut store = store(&[("a", Some("m")), ("b", Some("m"))]);

        store.upsert(Relationship::new("a", Some("n")));

        assert_eq!(store.len(), 2);
        assert_eq!(store.manager_of("a"), Some("n"));
        let order: Vec<&str> = store.iter().map(|r| r.subordinate_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn given_same_manager_when_upserting_then_keeps_position() {
        let mut store = store(&[("a", Some("m")), ("b", Some("m"))]);

        store.upsert(Relationship::new("a", Some("m")));

        let order: Vec<&str> = store.iter().map(|r| r.subordinate_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn given_chain_when_walking_then_finds_ancestors_only() {
        let store = store(&[("c", Some("b")), ("b", Some("a")), ("a", None)]);

        assert!(store.chain_contains("c", "a"));
        assert!(store.chain_contains("c", "c"));
        assert!(!store.chain_contains("a", "c"));
    }

    #[test]
    fn given_dangling_link_when_walking_then_follows_declared_manager() {
        // "x" is declared under "y" but "y" is not placed
        let store = store(&[("x", Some("y"))]);

        assert!(store.chain_contains("x", "y"));
    }

    #[test]
    fn given_ids_when_removing_all_then_counts_present_ones() {
        let mut store = store(&[("a", None), ("b", Some("a"))]);

        let removed = store.remove_all(&["a", "b", "zzz"]);

        assert_eq!(removed, 2);
        assert!(store.is_empty());
    }
}
