//! Tree builder: validates a nested member tree and lays it out in an arena.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::entities::{MemberId, MemberNode, PackageTier};
use crate::domain::error::{DomainError, DomainResult, TreeViolation};

/// Arena plus the id index built alongside it.
#[derive(Debug)]
pub struct BuiltTree {
    pub arena: TreeArena,
    pub index: HashMap<MemberId, Index>,
}

/// Constructs arena trees from nested member values, enforcing the matrix invariants.
pub struct TreeBuilder {
    max_arity: usize,
}

impl TreeBuilder {
    pub fn new(max_arity: usize) -> DomainResult<Self> {
        if max_arity == 0 {
            return Err(DomainError::InvalidArity(max_arity));
        }
        Ok(Self { max_arity })
    }

    pub fn max_arity(&self) -> usize {
        self.max_arity
    }

    /// Build a validated arena from `root`.
    ///
    /// Traversal is pre-order with children in stored order, so the first
    /// violation reported is the first one a depth-first reader would meet.
    #[instrument(level = "debug", skip(self, root), fields(root = %root.id))]
    pub fn build(&self, root: &MemberNode) -> DomainResult<BuiltTree> {
        let mut arena = TreeArena::new();
        let mut index: HashMap<MemberId, Index> = HashMap::new();
        // (node, parent index, expected depth)
        let mut stack: Vec<(&MemberNode, Option<Index>, usize)> = vec![(root, None, 0)];

        while let Some((node, parent_idx, expected_depth)) = stack.pop() {
            self.validate_node(node, expected_depth)?;
            if index.contains_key(&node.id) {
                return Err(DomainError::invalid(&node.id, TreeViolation::DuplicateId));
            }

            let current_idx = arena.insert_node(NodeData::from_member(node), parent_idx);
            index.insert(node.id.clone(), current_idx);

            // Reverse push keeps children in positional order on insertion
            for child in node.children.iter().rev() {
                stack.push((child, Some(current_idx), expected_depth + 1));
            }
        }

        debug!("built tree: {} nodes, height {}", arena.len(), arena.height());
        Ok(BuiltTree { arena, index })
    }

    fn validate_node(&self, node: &MemberNode, expected_depth: usize) -> DomainResult<()> {
        if node.id.as_str().trim().is_empty() {
            return Err(DomainError::invalid(&node.id, TreeViolation::BlankId));
        }
        if node.children.len() > self.max_arity {
            return Err(DomainError::invalid(
                &node.id,
                TreeViolation::ArityExceeded {
                    children: node.children.len(),
                    max: self.max_arity,
                },
            ));
        }
        if node.depth != expected_depth {
            return Err(DomainError::invalid(
                &node.id,
                TreeViolation::DepthMismatch {
                    expected: expected_depth,
                    found: node.depth,
                },
            ));
        }
        let has_package = node.package_tier != PackageTier::None;
        if node.status.is_empty() && has_package {
            return Err(DomainError::invalid(
                &node.id,
                TreeViolation::PackageOnEmptySlot(node.package_tier),
            ));
        }
        if !node.status.is_empty() && !has_package {
            return Err(DomainError::invalid(&node.id, TreeViolation::MissingPackage));
        }
        Ok(())
    }
}
