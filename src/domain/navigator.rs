//! Navigator: zoom into subtrees and step back, without touching the tree.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::entities::{FlatNode, MemberId, MemberNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::store::TreeStore;

/// Snapshot of a navigator's re-centering state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_root_id: MemberId,
    /// Previously visited roots, most recent last
    pub breadcrumb: Vec<MemberId>,
}

/// Per-view navigation session over a shared, loaded store.
#[derive(Debug)]
pub struct Navigator {
    store: Arc<TreeStore>,
    root_id: MemberId,
    state: NavigationState,
}

impl Navigator {
    /// Start a session at the store's true root.
    pub fn new(store: Arc<TreeStore>) -> DomainResult<Self> {
        let root_id = store.root_id()?;
        Ok(Self {
            store,
            state: NavigationState {
                current_root_id: root_id.clone(),
                breadcrumb: Vec::new(),
            },
            root_id,
        })
    }

    pub fn store(&self) -> &Arc<TreeStore> {
        &self.store
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current_root_id(&self) -> &MemberId {
        &self.state.current_root_id
    }

    pub fn breadcrumb(&self) -> &[MemberId] {
        &self.state.breadcrumb
    }

    pub fn is_at_root(&self) -> bool {
        self.state.current_root_id == self.root_id
    }

    pub fn is_current_root(&self, id: &str) -> bool {
        self.state.current_root_id.as_str() == id
    }

    /// Re-center on `id`.
    ///
    /// Empty slots, the current root and unknown ids leave the state untouched.
    /// Returns whether the view moved.
    pub fn navigate_to(&mut self, id: &str) -> bool {
        if self.is_current_root(id) {
            return false;
        }
        let target = match self.store.node(id) {
            Ok(Some((_, node))) if !node.data.status.is_empty() => node.data.id.clone(),
            _ => return false,
        };
        let previous = std::mem::replace(&mut self.state.current_root_id, target);
        self.state.breadcrumb.push(previous);
        debug!(
            "navigated to '{}' (breadcrumb depth {})",
            self.state.current_root_id,
            self.state.breadcrumb.len()
        );
        true
    }

    /// Return to the previous root, or to the true root when there is no history.
    pub fn navigate_back(&mut self) {
        match self.state.breadcrumb.pop() {
            Some(previous) => self.state.current_root_id = previous,
            None => self.state.current_root_id = self.root_id.clone(),
        }
    }

    /// Clear history and return to the true root.
    pub fn navigate_to_top(&mut self) {
        self.state.breadcrumb.clear();
        self.state.current_root_id = self.root_id.clone();
    }

    /// Subtree at the current root, with depths rebased so the current root is 0.
    #[instrument(level = "trace", skip(self), fields(root = %self.state.current_root_id))]
    pub fn current_view(&self) -> DomainResult<MemberNode> {
        self.store
            .subtree(self.state.current_root_id.as_str(), true)?
            .ok_or(DomainError::NotLoaded)
    }

    /// Pre-order flat projection of the current view.
    #[instrument(level = "trace", skip(self), fields(root = %self.state.current_root_id))]
    pub fn flatten(&self) -> DomainResult<Vec<FlatNode>> {
        let (start, base_depth) = match self.store.node(self.state.current_root_id.as_str())? {
            Some((idx, node)) => (idx, node.data.depth),
            None => return Err(DomainError::NotLoaded),
        };
        let (arena, _) = self.store.arena()?;

        Ok(arena
            .iter_from(start)
            .map(|(idx, node)| FlatNode {
                id: node.data.id.clone(),
                display_name: node.data.display_name.clone(),
                package_tier: node.data.package_tier,
                depth: node.data.depth - base_depth,
                status: node.data.status,
                slot: (idx != start).then_some(node.slot),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{MemberStatus, PackageTier};

    fn store() -> Arc<TreeStore> {
        let root = MemberNode::member("r", "You", PackageTier::Vip, MemberStatus::Active, 0)
            .with_children(vec![
                MemberNode::member("a", "A", PackageTier::Basic, MemberStatus::Active, 1)
                    .with_children(vec![MemberNode::member(
                        "a1",
                        "A1",
                        PackageTier::Basic,
                        MemberStatus::Inactive,
                        2,
                    )]),
                MemberNode::empty_slot("e", 1),
            ]);
        Arc::new(TreeStore::with_tree(3, &root).unwrap())
    }

    #[test]
    fn given_unloaded_store_when_creating_navigator_then_fails() {
        let store = Arc::new(TreeStore::new(3).unwrap());
        assert_eq!(Navigator::new(store).unwrap_err(), DomainError::NotLoaded);
    }

    #[test]
    fn given_new_navigator_when_inspecting_then_is_at_root() {
        let nav = Navigator::new(store()).unwrap();
        assert!(nav.is_at_root());
        assert!(nav.breadcrumb().is_empty());
        assert_eq!(nav.current_root_id().as_str(), "r");
    }

    #[test]
    fn given_unknown_id_when_navigating_then_no_change() {
        let mut nav = Navigator::new(store()).unwrap();
        assert!(!nav.navigate_to("ghost"));
        assert!(nav.is_at_root());
    }

    #[test]
    fn given_zoomed_view_when_flattening_then_slots_and_depths_are_local() {
        let mut nav = Navigator::new(store()).unwrap();
        assert!(nav.navigate_to("a"));

        let flat = nav.flatten().unwrap();

        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].id.as_str(), "a");
        assert_eq!(flat[0].depth, 0);
        assert_eq!(flat[0].slot, None);
        assert_eq!(flat[1].depth, 1);
        assert_eq!(flat[1].slot, Some(0));
    }

    #[test]
    fn given_nested_zoom_when_navigating_back_twice_then_returns_to_root() {
        let mut nav = Navigator::new(store()).unwrap();
        nav.navigate_to("a");
        nav.navigate_to("a1");
        assert_eq!(nav.breadcrumb().len(), 2);

        nav.navigate_back();
        assert_eq!(nav.current_root_id().as_str(), "a");
        nav.navigate_back();
        assert!(nav.is_at_root());
        nav.navigate_back();
        assert!(nav.is_at_root());
    }
}
