//! View projections over the forest: flattened table rows, the visible chart,
//! and per-node expand/collapse state.

use std::collections::HashMap;

use generational_arena::Index;
use itertools::Itertools;

use crate::domain::entities::EmployeeRecord;
use crate::domain::forest::Forest;

/// Expanded flags keyed by employee identifier.
///
/// Independent of forest structure: rebuilding the forest keeps the flags,
/// only removing a node drops its entry. Unknown ids read as collapsed.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    expanded: HashMap<String, bool>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    /// Flip the flag, returning the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        let entry = self.expanded.entry(id.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn set(&mut self, id: &str, expanded: bool) {
        self.expanded.insert(id.to_string(), expanded);
    }

    pub fn set_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>, expanded: bool) {
        for id in ids {
            self.set(id, expanded);
        }
    }

    pub fn forget<S: AsRef<str>>(&mut self, ids: &[S]) {
        for id in ids {
            self.expanded.remove(id.as_ref());
        }
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// One row of the flattened table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow<'a> {
    pub employee: &'a EmployeeRecord,
    pub level: usize,
    pub direct_reports: usize,
}

/// Pre-order rows sorted by level, then display name.
///
/// The sort is stable, so equal (level, name) pairs keep pre-order.
pub fn flatten(forest: &Forest) -> Vec<FlatRow<'_>> {
    forest
        .iter()
        .map(|(_, node)| FlatRow {
            employee: &node.employee,
            level: node.level,
            direct_reports: node.direct_report_count(),
        })
        .sorted_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then_with(|| a.employee.name.cmp(&b.employee.name))
        })
        .collect()
}

/// A node of the chart as it should be drawn.
///
/// `children` is empty for collapsed nodes even when `direct_reports` is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartNode<'a> {
    pub employee: &'a EmployeeRecord,
    pub level: usize,
    pub direct_reports: usize,
    pub expanded: bool,
    pub children: Vec<ChartNode<'a>>,
}

/// Visible chart trees, one per root, honoring the expanded flags.
pub fn visible_chart<'a>(forest: &'a Forest, view: &ViewState) -> Vec<ChartNode<'a>> {
    forest
        .roots()
        .iter()
        .filter_map(|&idx| chart_node(forest, view, idx))
        .collect()
}

fn chart_node<'a>(forest: &'a Forest, view: &ViewState, idx: Index) -> Option<ChartNode<'a>> {
    let node = forest.get_node(idx)?;
    let expanded = view.is_expanded(node.id());
    let children = if expanded {
        node.children
            .iter()
            .filter_map(|&child| chart_node(forest, view, child))
            .collect()
    } else {
        Vec::new()
    };
    Some(ChartNode {
        employee: &node.employee,
        level: node.level,
        direct_reports: node.direct_report_count(),
        expanded,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unknown_id_when_reading_then_collapsed() {
        let view = ViewState::new();
        assert!(!view.is_expanded("nobody"));
    }

    #[test]
    fn given_flag_when_toggling_twice_then_back_to_collapsed() {
        let mut view = ViewState::new();

        assert!(view.toggle("a"));
        assert!(!view.toggle("a"));
        assert!(!view.is_expanded("a"));
    }

    #[test]
    fn given_entries_when_forgetting_then_only_named_are_dropped() {
        let mut view = ViewState::new();
        view.set_all(["a", "b", "c"], true);

        view.forget(&["a", "c"]);

        assert_eq!(view.len(), 1);
        assert!(view.is_expanded("b"));
    }
}
