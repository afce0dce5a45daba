//! Hierarchy service
//!
//! Owns the roster, the relationship store, the derived forest and the view
//! state, and exposes the edit operations the front end drives.

use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::{
    flatten, visible_chart, ChartNode, EditError, EditResult, EmployeeRecord, FlatRow, Forest,
    Relationship, RelationshipStore, RosterIndex, TreeBuilder, ViewState,
};

/// Outcome of seeding the hierarchy from the roster's declared managers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Employees placed by the seed
    pub placed: usize,
    /// Employees whose placement was rejected, with the reason
    pub skipped: Vec<(String, EditError)>,
}

/// Shape of the current forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyStats {
    pub placed: usize,
    pub roots: usize,
    /// Levels in the tallest tree
    pub depth: usize,
    pub leaves: usize,
    pub max_level: usize,
}

/// Hierarchy construction engine.
///
/// Every structural edit validates, applies to a copy of the store, rebuilds
/// the forest from that copy, and only then commits. A failed edit leaves
/// store, forest and view state untouched.
#[derive(Debug)]
pub struct HierarchyService {
    roster: RosterIndex,
    store: RelationshipStore,
    forest: Forest,
    view: ViewState,
    builder: TreeBuilder,
}

impl HierarchyService {
    pub fn new(roster: RosterIndex, builder: TreeBuilder) -> Self {
        Self {
            roster,
            store: RelationshipStore::new(),
            forest: Forest::new(),
            view: ViewState::new(),
            builder,
        }
    }

    /// Index raw roster records and start an empty hierarchy.
    pub fn from_records(
        records: Vec<EmployeeRecord>,
        builder: TreeBuilder,
    ) -> ApplicationResult<Self> {
        let roster = RosterIndex::from_records(records)?;
        Ok(Self::new(roster, builder))
    }

    pub fn roster(&self) -> &RosterIndex {
        &self.roster
    }

    pub fn store(&self) -> &RelationshipStore {
        &self.store
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// Place `subordinate_id` under `manager_id`, or as a root when `None`.
    ///
    /// Re-placing an employee replaces its manager.
    #[instrument(level = "debug", skip(self))]
    pub fn place(&mut self, subordinate_id: &str, manager_id: Option<&str>) -> EditResult<()> {
        self.validate_placement(subordinate_id, manager_id)?;

        let mut store = self.store.clone();
        store.upsert(Relationship::new(subordinate_id, manager_id));
        let forest = self.builder.build(&store, &self.roster)?;

        self.store = store;
        self.forest = forest;
        debug!(
            "placed {} under {}",
            subordinate_id,
            manager_id.unwrap_or("<root>")
        );
        Ok(())
    }

    fn validate_placement(&self, subordinate_id: &str, manager_id: Option<&str>) -> EditResult<()> {
        if !self.roster.contains(subordinate_id) {
            return Err(EditError::InvalidReference(subordinate_id.to_string()));
        }
        let Some(manager_id) = manager_id else {
            return Ok(());
        };
        if !self.roster.contains(manager_id) {
            return Err(EditError::InvalidReference(manager_id.to_string()));
        }
        if manager_id == subordinate_id {
            return Err(EditError::SelfReport(subordinate_id.to_string()));
        }
        if self.store.chain_contains(manager_id, subordinate_id) {
            return Err(EditError::CycleWouldForm {
                subordinate: subordinate_id.to_string(),
                manager: manager_id.to_string(),
            });
        }
        Ok(())
    }

    /// Remove an employee together with everyone reporting to it, directly or
    /// transitively.
    ///
    /// Returns the removed identifiers in pre-order; empty when the employee
    /// was never placed. Dropping a whole subtree only shortens chains, so the
    /// rebuild cannot hit the level bound or a cycle.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, subordinate_id: &str) -> Vec<String> {
        if !self.store.contains(subordinate_id) {
            debug!("remove: {} not placed, nothing to do", subordinate_id);
            return Vec::new();
        }

        let removed = self.forest.subtree_ids(subordinate_id);
        let mut store = self.store.clone();
        store.remove_all(&removed);
        let forest = match self.builder.build(&store, &self.roster) {
            Ok(forest) => forest,
            Err(e) => {
                warn!("remove {}: rebuild failed, keeping hierarchy: {}", subordinate_id, e);
                return Vec::new();
            }
        };

        self.store = store;
        self.forest = forest;
        self.view.forget(&removed);
        info!("removed {} employee(s) under {}", removed.len(), subordinate_id);
        removed
    }

    /// Drop every relationship and all view state.
    pub fn clear(&mut self) {
        self.store.clear();
        self.view.clear();
        self.forest = Forest::new();
        debug!("hierarchy cleared");
    }

    /// Flip a node's expanded flag. Returns the new state, or `None` when the
    /// employee is not placed.
    pub fn toggle_expanded(&mut self, node_id: &str) -> Option<bool> {
        if !self.forest.contains(node_id) {
            debug!("toggle: {} not placed, ignoring", node_id);
            return None;
        }
        Some(self.view.toggle(node_id))
    }

    pub fn is_expanded(&self, node_id: &str) -> bool {
        self.view.is_expanded(node_id)
    }

    pub fn expand_all(&mut self) {
        self.set_all_expanded(true);
    }

    pub fn collapse_all(&mut self) {
        self.set_all_expanded(false);
    }

    fn set_all_expanded(&mut self, expanded: bool) {
        let ids = self.forest.iter().map(|(_, node)| node.id());
        self.view.set_all(ids, expanded);
    }

    /// Table rows: level ascending, then display name.
    pub fn flattened_view(&self) -> Vec<FlatRow<'_>> {
        flatten(&self.forest)
    }

    /// Chart trees with collapsed nodes pruned.
    pub fn chart(&self) -> Vec<ChartNode<'_>> {
        visible_chart(&self.forest, &self.view)
    }

    pub fn stats(&self) -> HierarchyStats {
        HierarchyStats {
            placed: self.forest.len(),
            roots: self.forest.roots().len(),
            depth: self.forest.depth(),
            leaves: self.forest.leaf_nodes().len(),
            max_level: self.builder.max_level(),
        }
    }

    /// Roster records not yet placed, in roster order.
    pub fn unplaced(&self) -> Vec<&EmployeeRecord> {
        self.roster
            .iter()
            .filter(|record| !self.store.contains(&record.id))
            .collect()
    }

    /// Place every roster employee under its declared manager.
    ///
    /// Unknown or self-referencing managers make the employee a root.
    /// Rejected placements are skipped and reported, the rest still apply.
    #[instrument(level = "debug", skip(self))]
    pub fn seed_from_roster(&mut self) -> SeedReport {
        let declared: Vec<(String, Option<String>)> = self
            .roster
            .iter()
            .map(|record| {
                let manager = record
                    .manager
                    .as_ref()
                    .filter(|m| *m != &record.id && self.roster.contains(m))
                    .cloned();
                (record.id.clone(), manager)
            })
            .collect();

        let mut report = SeedReport::default();
        for (id, manager) in declared {
            match self.place(&id, manager.as_deref()) {
                Ok(()) => report.placed += 1,
                Err(e) => {
                    warn!("seed: skipping {}: {}", id, e);
                    report.skipped.push((id, e));
                }
            }
        }
        info!(
            "seeded {} employee(s), skipped {}",
            report.placed,
            report.skipped.len()
        );
        report
    }

    /// Swap in a refreshed roster.
    ///
    /// Relationships whose subordinate or manager disappeared are dropped
    /// (their reports become roots, not removed). Returns the dropped
    /// subordinate identifiers.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn replace_roster(&mut self, records: Vec<EmployeeRecord>) -> ApplicationResult<Vec<String>> {
        let roster = RosterIndex::from_records(records)?;

        let mut store = self.store.clone();
        let mut dropped = Vec::new();
        store.retain(|r| {
            let keep = roster.contains(&r.subordinate_id)
                && r.manager_id.as_deref().map_or(true, |m| roster.contains(m));
            if !keep {
                dropped.push(r.subordinate_id.clone());
            }
            keep
        });
        let forest = self.builder.build(&store, &roster)?;

        self.roster = roster;
        self.store = store;
        self.forest = forest;
        self.view.forget(&dropped);
        if !dropped.is_empty() {
            warn!("roster refresh dropped {} relationship(s)", dropped.len());
        }
        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(ids: &[&str]) -> HierarchyService {
        let records = ids
            .iter()
            .map(|id| EmployeeRecord::new(*id, id.to_uppercase()))
            .collect();
        HierarchyService::from_records(records, TreeBuilder::default()).unwrap()
    }

    #[test]
    fn given_failed_place_when_inspecting_then_nothing_changed() {
        let mut svc = service(&["a", "b"]);
        svc.place("a", None).unwrap();

        let err = svc.place("b", Some("ghost")).unwrap_err();

        assert_eq!(err, EditError::InvalidReference("ghost".into()));
        assert_eq!(svc.store().len(), 1);
        assert_eq!(svc.forest().len(), 1);
    }

    #[test]
    fn given_unplaced_id_when_toggling_then_ignored() {
        let mut svc = service(&["a"]);

        assert_eq!(svc.toggle_expanded("a"), None);
        assert!(svc.view_state().is_empty());
    }

    #[test]
    fn given_two_trees_when_computing_stats_then_counts_shape() {
        let mut svc = service(&["a", "b", "c", "d"]);
        svc.place("a", None).unwrap();
        svc.place("b", Some("a")).unwrap();
        svc.place("c", Some("b")).unwrap();
        svc.place("d", None).unwrap();

        let stats = svc.stats();

        assert_eq!(
            stats,
            HierarchyStats {
                placed: 4,
                roots: 2,
                depth: 3,
                leaves: 2,
                max_level: crate::domain::DEFAULT_MAX_LEVEL,
            }
        );
    }

    #[test]
    fn given_middle_manager_when_removing_then_rest_keeps_levels() {
        let mut svc = service(&["a", "b", "c", "d"]);
        svc.place("a", None).unwrap();
        svc.place("b", Some("a")).unwrap();
        svc.place("c", Some("b")).unwrap();
        svc.place("d", Some("a")).unwrap();

        let removed: Vec<String> = svc.remove("b");

        assert_eq!(removed, vec!["b", "c"]);
        assert_eq!(svc.forest().node("d").unwrap().level, 1);
        assert_eq!(svc.stats().placed, 2);
    }

    #[test]
    fn given_unknown_subordinate_when_placing_then_invalid_reference() {
        let mut svc = service(&["a"]);

        let err = svc.place("nobody", None).unwrap_err();

        assert_eq!(err, EditError::InvalidReference("nobody".into()));
    }
}
