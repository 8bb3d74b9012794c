//! Tree store: sole owner of the canonical matrix tree.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, info, instrument};

use crate::domain::arena::{TreeArena, TreeNode};
use crate::domain::builder::TreeBuilder;
use crate::domain::entities::{MemberId, MemberNode};
use crate::domain::error::{DomainError, DomainResult};

/// Default branching factor of the portal's matrix.
pub const DEFAULT_MAX_ARITY: usize = 3;

#[derive(Debug)]
struct LoadedTree {
    arena: TreeArena,
    index: HashMap<MemberId, Index>,
    root: Index,
}

/// Holds the canonical tree and answers lookups.
///
/// Read-only after `load`; share it between navigators and aggregators
/// behind an `Arc`.
#[derive(Debug)]
pub struct TreeStore {
    max_arity: usize,
    tree: Option<LoadedTree>,
}

impl TreeStore {
    pub fn new(max_arity: usize) -> DomainResult<Self> {
        if max_arity == 0 {
            return Err(DomainError::InvalidArity(max_arity));
        }
        Ok(Self {
            max_arity,
            tree: None,
        })
    }

    /// Build a store and load `root` in one step.
    pub fn with_tree(max_arity: usize, root: &MemberNode) -> DomainResult<Self> {
        let mut store = Self::new(max_arity)?;
        store.load(root)?;
        Ok(store)
    }

    pub fn max_arity(&self) -> usize {
        self.max_arity
    }

    pub fn is_loaded(&self) -> bool {
        self.tree.is_some()
    }

    /// Replace the canonical tree wholesale.
    ///
    /// All-or-nothing: on error the previous tree (if any) is kept.
    #[instrument(level = "debug", skip(self, root), fields(root = %root.id))]
    pub fn load(&mut self, root: &MemberNode) -> DomainResult<()> {
        let built = TreeBuilder::new(self.max_arity)?.build(root)?;
        let root_idx = built.arena.root().ok_or(DomainError::NotLoaded)?;
        info!(
            "loaded tree rooted at '{}' with {} nodes",
            root.id,
            built.arena.len()
        );
        self.tree = Some(LoadedTree {
            arena: built.arena,
            index: built.index,
            root: root_idx,
        });
        Ok(())
    }

    fn loaded(&self) -> DomainResult<&LoadedTree> {
        self.tree.as_ref().ok_or(DomainError::NotLoaded)
    }

    /// Look a member up by id; `Ok(None)` when no such member exists.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: &str) -> DomainResult<Option<MemberNode>> {
        let tree = self.loaded()?;
        let found = tree
            .index
            .get(id)
            .and_then(|&idx| tree.arena.to_member_node(idx, 0));
        if found.is_none() {
            debug!("member '{}' not found", id);
        }
        Ok(found)
    }

    /// The true root with absolute depths, unaffected by navigation.
    pub fn root(&self) -> DomainResult<MemberNode> {
        let tree = self.loaded()?;
        tree.arena
            .to_member_node(tree.root, 0)
            .ok_or(DomainError::NotLoaded)
    }

    pub fn root_id(&self) -> DomainResult<MemberId> {
        let tree = self.loaded()?;
        tree.arena
            .get_node(tree.root)
            .map(|n| n.data.id.clone())
            .ok_or(DomainError::NotLoaded)
    }

    /// Subtree at `id`; with `rebase` the subtree root reports depth 0.
    pub fn subtree(&self, id: &str, rebase: bool) -> DomainResult<Option<MemberNode>> {
        let tree = self.loaded()?;
        Ok(tree.index.get(id).and_then(|&idx| {
            let offset = if rebase {
                tree.arena.get_node(idx).map(|n| n.data.depth).unwrap_or(0)
            } else {
                0
            };
            tree.arena.to_member_node(idx, offset)
        }))
    }

    /// Ids from the true root down to `id`, inclusive; empty if unknown.
    pub fn ancestors(&self, id: &str) -> DomainResult<Vec<MemberId>> {
        let tree = self.loaded()?;
        Ok(tree
            .index
            .get(id)
            .map(|&idx| {
                tree.arena
                    .path_to(idx)
                    .into_iter()
                    .filter_map(|i| tree.arena.get_node(i).map(|n| n.data.id.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Number of positions in the tree, empty slots included.
    pub fn node_count(&self) -> DomainResult<usize> {
        Ok(self.loaded()?.arena.len())
    }

    /// Number of levels (1 for a lone root).
    pub fn height(&self) -> DomainResult<usize> {
        Ok(self.loaded()?.arena.height())
    }

    /// Arena access for traversals inside the domain layer.
    pub(crate) fn arena(&self) -> DomainResult<(&TreeArena, Index)> {
        let tree = self.loaded()?;
        Ok((&tree.arena, tree.root))
    }

    pub(crate) fn node(&self, id: &str) -> DomainResult<Option<(Index, &TreeNode)>> {
        let tree = self.loaded()?;
        Ok(tree
            .index
            .get(id)
            .and_then(|&idx| tree.arena.get_node(idx).map(|n| (idx, n))))
    }
}
