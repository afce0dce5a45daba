use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::EmployeeRecord;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct HierarchyNode {
    /// Employee placed at this node
    pub employee: EmployeeRecord,
    /// Depth below the root, assigned by the level pass
    pub level: usize,
    /// Declared manager, even when that manager is not placed
    pub manager_id: Option<String>,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of direct reports, in declaration order
    pub children: Vec<Index>,
}

impl HierarchyNode {
    pub fn id(&self) -> &str {
        &self.employee.id
    }

    pub fn direct_report_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena-backed forest of reporting trees.
///
/// Rebuilt from scratch after every structural edit; callers only ever see it
/// through shared references.
#[derive(Debug)]
pub struct Forest {
    arena: Arena<HierarchyNode>,
    roots: Vec<Index>,
    by_id: HashMap<String, Index>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Materialize a detached node, or return the one already created for
    /// this employee.
    #[instrument(level = "trace", skip(self, employee), fields(id = %employee.id))]
    pub fn insert_node(&mut self, employee: EmployeeRecord, manager_id: Option<String>) -> Index {
        if let Some(&idx) = self.by_id.get(&employee.id) {
            if let Some(node) = self.arena.get_mut(idx) {
                node.manager_id = manager_id;
            }
            return idx;
        }
        let id = employee.id.clone();
        let idx = self.arena.insert(HierarchyNode {
            employee,
            level: 0,
            manager_id,
            parent: None,
            children: Vec::new(),
        });
        self.by_id.insert(id, idx);
        idx
    }

    /// Append `child` to `parent`'s direct reports.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, child: Index, parent: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<Index>) {
        self.roots = roots;
    }

    pub fn get_node(&self, idx: Index) -> Option<&HierarchyNode> {
        self.arena.get(idx)
    }

    pub(crate) fn get_node_mut(&mut self, idx: Index) -> Option<&mut HierarchyNode> {
        self.arena.get_mut(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&HierarchyNode> {
        self.index_of(id).and_then(|idx| self.get_node(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.roots.iter().filter_map(|&idx| self.get_node(idx))
    }

    pub fn children_of(&self, idx: Index) -> impl Iterator<Item = (Index, &HierarchyNode)> {
        self.get_node(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&child| self.get_node(child).map(|n| (child, n)))
    }

    /// All nodes in arena order, no structural ordering implied.
    pub fn nodes(&self) -> impl Iterator<Item = (Index, &HierarchyNode)> {
        self.arena.iter()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order walk over every tree, roots in order.
    pub fn iter(&self) -> PreOrderIterator {
        PreOrderIterator::new(self, self.roots.clone())
    }

    /// Pre-order walk of the subtree rooted at `idx`.
    pub fn iter_subtree(&self, idx: Index) -> PreOrderIterator {
        PreOrderIterator::new(self, vec![idx])
    }

    /// Identifiers of `id` and all its transitive reports, pre-order.
    /// Empty when `id` is not in the forest.
    #[instrument(level = "debug", skip(self))]
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        match self.index_of(id) {
            Some(idx) => self
                .iter_subtree(idx)
                .map(|(_, node)| node.employee.id.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of nodes in the subtree rooted at `idx`, itself included.
    pub fn subtree_count(&self, idx: Index) -> usize {
        self.iter_subtree(idx).count()
    }

    /// Number of levels in the tallest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.arena
            .iter()
            .map(|(_, node)| node.level + 1)
            .max()
            .unwrap_or(0)
    }

    /// Employees without direct reports, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.employee.id.clone())
            .collect()
    }
}

pub struct PreOrderIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(forest: &'a Forest, mut starts: Vec<Index>) -> Self {
        starts.reverse();
        Self {
            forest,
            stack: starts,
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
