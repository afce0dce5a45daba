//! Tree builder: turns the relationship store into a levelled forest.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument};

use crate::domain::entities::RosterIndex;
use crate::domain::error::{EditError, EditResult};
use crate::domain::forest::Forest;
use crate::domain::store::RelationshipStore;

/// Default bound on node levels (root = 0).
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Constructs the reporting forest from declared relationships.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    max_level: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL)
    }
}

impl TreeBuilder {
    pub fn new(max_level: usize) -> Self {
        Self { max_level }
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Build the forest and assign levels.
    ///
    /// Only subordinates present in the store become nodes. A declared manager
    /// that is not itself placed leaves the subordinate as a root.
    #[instrument(level = "debug", skip_all, fields(relationships = store.len()))]
    pub fn build(&self, store: &RelationshipStore, roster: &RosterIndex) -> EditResult<Forest> {
        let mut forest = Forest::new();

        for relationship in store.iter() {
            let employee = roster
                .get(&relationship.subordinate_id)
                .ok_or_else(|| EditError::InvalidReference(relationship.subordinate_id.clone()))?;
            let node_idx = forest.insert_node(employee.clone(), relationship.manager_id.clone());

            let Some(manager_id) = relationship.manager_id.as_deref() else {
                continue;
            };
            if !store.contains(manager_id) {
                debug!(
                    "dangling manager {} for {}, keeping as root",
                    manager_id, relationship.subordinate_id
                );
                continue;
            }
            let manager = roster
                .get(manager_id)
                .ok_or_else(|| EditError::InvalidReference(manager_id.to_string()))?;
            let manager_idx = forest.insert_node(
                manager.clone(),
                store.get(manager_id).and_then(|r| r.manager_id.clone()),
            );
            forest.attach(node_idx, manager_idx);
        }

        // Roots in store order
        let roots = store
            .iter()
            .filter_map(|r| forest.index_of(&r.subordinate_id))
            .filter(|&idx| forest.get_node(idx).is_some_and(|n| n.parent.is_none()))
            .collect();
        forest.set_roots(roots);

        self.assign_levels(&mut forest)?;
        debug!("built forest: {} nodes, {} roots", forest.len(), forest.roots().len());
        Ok(forest)
    }

    /// Recompute every level breadth-first from the roots.
    ///
    /// Fails if a level passes the bound or if some node is unreachable from
    /// any root, which only happens when the relationships contain a cycle.
    #[instrument(level = "debug", skip_all)]
    pub fn assign_levels(&self, forest: &mut Forest) -> EditResult<()> {
        let mut queue: VecDeque<_> = forest.roots().iter().map(|&idx| (idx, 0usize)).collect();
        let mut visited = HashSet::new();

        while let Some((idx, level)) = queue.pop_front() {
            if !visited.insert(idx) {
                let id = forest.get_node(idx).map(|n| n.id().to_string()).unwrap_or_default();
                return Err(EditError::CycleDetected(id));
            }
            let Some(node) = forest.get_node_mut(idx) else {
                continue;
            };
            if level > self.max_level {
                return Err(EditError::DepthExceeded {
                    id: node.id().to_string(),
                    level,
                    max: self.max_level,
                });
            }
            node.level = level;
            queue.extend(node.children.iter().map(|&child| (child, level + 1)));
        }

        if visited.len() != forest.len() {
            let id = forest
                .nodes()
                .find(|(idx, _)| !visited.contains(idx))
                .map(|(_, node)| node.id().to_string())
                .unwrap_or_default();
            return Err(EditError::CycleDetected(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EmployeeRecord, Relationship};

    fn roster(ids: &[&str]) -> RosterIndex {
        RosterIndex::from_records(ids.iter().map(|id| EmployeeRecord::new(*id, id.to_uppercase())))
            .unwrap()
    }

    fn store(edges: &[(&str, Option<&str>)]) -> RelationshipStore {
        let mut store = RelationshipStore::new();
        for (sub, mgr) in edges {
            store.upsert(Relationship::new(*sub, *mgr));
        }
        store
    }

    #[test]
    fn given_chain_when_building_then_assigns_levels_top_down() {
        let roster = roster(&["a", "b", "c"]);
        let store = store(&[("c", Some("b")), ("b", Some("a")), ("a", None)]);

        let forest = TreeBuilder::default().build(&store, &roster).unwrap();

        assert_eq!(forest.roots().len(), 1);
        assert_eq!(forest.node("a").unwrap().level, 0);
        assert_eq!(forest.node("b").unwrap().level, 1);
        assert_eq!(forest.node("c").unwrap().level, 2);
        assert_eq!(forest.depth(), 3);
    }

    #[test]
    fn given_unplaced_manager_when_building_then_subordinate_is_root() {
        let roster = roster(&["a", "m"]);
        let store = store(&[("a", Some("m"))]);

        let forest = TreeBuilder::default().build(&store, &roster).unwrap();

        assert_eq!(forest.len(), 1, "manager only referenced must not become a node");
        let a = forest.node("a").unwrap();
        assert!(a.is_root());
        assert_eq!(a.manager_id.as_deref(), Some("m"));
        assert_eq!(a.level, 0);
    }

    #[test]
    fn given_reports_declared_in_order_when_building_then_children_keep_that_order() {
        let roster = roster(&["r", "y", "x"]);
        let store = store(&[("r", None), ("y", Some("r")), ("x", Some("r"))]);

        let forest = TreeBuilder::default().build(&store, &roster).unwrap();

        let r = forest.index_of("r").unwrap();
        let children: Vec<&str> = forest.children_of(r).map(|(_, n)| n.id()).collect();
        assert_eq!(children, vec!["y", "x"]);
    }

    #[test]
    fn given_manager_declared_after_report_when_building_then_links_anyway() {
        let roster = roster(&["r", "x"]);
        let store = store(&[("x", Some("r")), ("r", None)]);

        let forest = TreeBuilder::default().build(&store, &roster).unwrap();

        assert_eq!(forest.roots().len(), 1);
        assert_eq!(forest.root_nodes().next().unwrap().id(), "r");
        assert_eq!(forest.node("x").unwrap().level, 1);
    }

    #[test]
    fn given_level_past_bound_when_building_then_depth_exceeded() {
        let roster = roster(&["a", "b", "c"]);
        let store = store(&[("a", None), ("b", Some("a")), ("c", Some("b"))]);

        let result = TreeBuilder::new(1).build(&store, &roster);

        assert_eq!(
            result.unwrap_err(),
            EditError::DepthExceeded {
                id: "c".into(),
                level: 2,
                max: 1
            }
        );
    }

    #[test]
    fn given_cyclic_relationships_when_building_then_cycle_detected() {
        // Only reachable by bypassing the service's placement checks
        let roster = roster(&["a", "b"]);
        let store = store(&[("a", Some("b")), ("b", Some("a"))]);

        let result = TreeBuilder::default().build(&store, &roster);

        assert!(matches!(result, Err(EditError::CycleDetected(_))));
    }

    #[test]
    fn given_subordinate_missing_from_roster_when_building_then_invalid_reference() {
        let roster = roster(&["a"]);
        let store = store(&[("ghost", None)]);

        let result = TreeBuilder::default().build(&store, &roster);

        assert_eq!(result.unwrap_err(), EditError::InvalidReference("ghost".into()));
    }
}
