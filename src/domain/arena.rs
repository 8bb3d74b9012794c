use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{MemberId, MemberNode, MemberStatus, PackageTier};

/// Data payload for tree nodes representing matrix positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub id: MemberId,
    pub display_name: String,
    pub package_tier: PackageTier,
    /// Distance from the true root
    pub depth: usize,
    pub status: MemberStatus,
    pub point_value: u64,
}

impl NodeData {
    /// Copy the payload of a member, leaving its children behind.
    pub fn from_member(member: &MemberNode) -> Self {
        Self {
            id: member.id.clone(),
            display_name: member.display_name.clone(),
            package_tier: member.package_tier,
            depth: member.depth,
            status: member.status,
            point_value: member.point_value,
        }
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Member data for this node
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Position among the parent's children
    pub slot: usize,
    /// Indices of child nodes in the arena, in positional order
    pub children: Vec<Index>,
}

/// Arena-based tree structure for efficient hierarchy management.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Parent links are plain indices, so the arena is the only owner of nodes.
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let slot = parent
            .and_then(|p| self.arena.get(p))
            .map(|p| p.children.len())
            .unwrap_or(0);
        let node = TreeNode {
            data,
            parent,
            slot,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal from the root, children in stored order.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `start`.
    pub fn iter_from(&self, start: Index) -> TreeIterator {
        TreeIterator::new(self, Some(start))
    }

    /// Post-order traversal from the root: children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self, self.root)
    }

    /// Number of levels in the tree (1 for a lone root, 0 when empty).
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                height = height.max(level);
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        height
    }

    /// Chain of indices from the root down to `idx`, inclusive.
    pub fn path_to(&self, idx: Index) -> Vec<Index> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            match self.get_node(i) {
                Some(node) => {
                    path.push(i);
                    current = node.parent;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Rebuild the owned subtree rooted at `idx`, subtracting `rebase` from every depth.
    #[instrument(level = "trace", skip(self))]
    pub fn to_member_node(&self, idx: Index, rebase: usize) -> Option<MemberNode> {
        // Children are finished before their parent, so each parent drains them from `built`.
        let mut built: HashMap<Index, MemberNode> = HashMap::new();
        for (current, node) in PostOrderIterator::new(self, Some(idx)) {
            let children = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(
                current,
                MemberNode {
                    id: node.data.id.clone(),
                    display_name: node.data.display_name.clone(),
                    package_tier: node.data.package_tier,
                    depth: node.data.depth.saturating_sub(rebase),
                    status: node.data.status,
                    point_value: node.data.point_value,
                    children,
                },
            );
        }
        built.remove(&idx)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<Index>) -> Self {
        let mut stack = Vec::new();
        if let Some(start) = start {
            stack.push(start);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
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

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<Index>) -> Self {
        let mut stack = Vec::new();
        if let Some(start) = start {
            stack.push((start, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(id: &str, depth: usize) -> NodeData {
        NodeData {
            id: MemberId::from(id),
            display_name: id.to_uppercase(),
            package_tier: PackageTier::Basic,
            depth,
            status: MemberStatus::Active,
            point_value: 0,
        }
    }

    //      root
    //      /  \
    //     a    b
    //     |
    //     c
    fn sample() -> (TreeArena, Index, Index, Index, Index) {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(data("root", 0), None);
        let a = tree.insert_node(data("a", 1), Some(root));
        let b = tree.insert_node(data("b", 1), Some(root));
        let c = tree.insert_node(data("c", 2), Some(a));
        (tree, root, a, b, c)
    }

    #[test]
    fn given_tree_when_iterating_then_visits_preorder() {
        let (tree, ..) = sample();
        let ids: Vec<_> = tree.iter().map(|(_, n)| n.data.id.to_string()).collect();
        assert_eq!(ids, vec!["root", "a", "c", "b"]);
    }

    #[test]
    fn given_tree_when_postorder_iterating_then_root_comes_last() {
        let (tree, ..) = sample();
        let ids: Vec<_> = tree
            .iter_postorder()
            .map(|(_, n)| n.data.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b", "root"]);
    }

    #[test]
    fn given_tree_when_inserting_then_records_slots_and_height() {
        let (tree, _, a, b, c) = sample();
        assert_eq!(tree.get_node(a).unwrap().slot, 0);
        assert_eq!(tree.get_node(b).unwrap().slot, 1);
        assert_eq!(tree.get_node(c).unwrap().slot, 0);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn given_node_when_computing_path_then_starts_at_root() {
        let (tree, root, a, _, c) = sample();
        assert_eq!(tree.path_to(c), vec![root, a, c]);
    }

    #[test]
    fn given_subtree_when_rebuilding_with_rebase_then_depths_start_at_zero() {
        let (tree, _, a, ..) = sample();
        let node = tree.to_member_node(a, 1).unwrap();
        assert_eq!(node.depth, 0);
        assert_eq!(node.children[0].depth, 1);
        assert_eq!(node.children[0].id.as_str(), "c");
    }

    /// Single chain of `levels` nodes.
    fn chain(levels: usize) -> (TreeArena, Index) {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(data("n0", 0), None);
        let mut parent = root;
        for depth in 1..levels {
            parent = tree.insert_node(data(&format!("n{depth}"), depth), Some(parent));
        }
        (tree, root)
    }

    #[test]
    fn given_very_deep_chain_when_computing_height_then_counts_every_level() {
        let (tree, _) = chain(200_000);
        assert_eq!(tree.height(), 200_000);
    }

    #[test]
    fn given_deep_chain_when_rebuilding_then_keeps_every_level() {
        let (tree, root) = chain(1_000);

        let node = tree.to_member_node(root, 0).unwrap();

        let mut levels = 1;
        let mut current = &node;
        while let Some(child) = current.children.first() {
            assert_eq!(child.depth, levels);
            levels += 1;
            current = child;
        }
        assert_eq!(levels, 1_000);
        assert_eq!(current.id.as_str(), "n999");
    }

    #[test]
    fn given_empty_arena_when_querying_then_reports_nothing() {
        let tree = TreeArena::new();
        assert_eq!(tree.height(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.iter().count(), 0);
    }
}
