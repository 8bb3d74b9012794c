//! Terminal rendering of member trees via `termtree`.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{MemberNode, Position};

/// Render with slot labels for a matrix of the given arity.
#[instrument(level = "trace", skip(root), fields(root = %root.id))]
pub fn render_tree(root: &MemberNode, arity: usize) -> Tree<String> {
    build_tree(root, None, arity)
}

fn build_tree(node: &MemberNode, position: Option<Position>, arity: usize) -> Tree<String> {
    let leaves: Vec<_> = node
        .children
        .iter()
        .enumerate()
        .map(|(slot, child)| build_tree(child, Position::from_slot(slot, arity), arity))
        .collect();

    Tree::new(node_label(node, position)).with_leaves(leaves)
}

/// One line per member: slot, tier badge, name, id and status.
pub fn node_label(node: &MemberNode, position: Option<Position>) -> String {
    let slot = position.map(|p| format!("{p}: ")).unwrap_or_default();
    if node.is_empty_slot() {
        return format!("{slot}(empty) {}", node.id);
    }
    format!(
        "{slot}[{}] {} ({}) {}",
        node.package_tier.initial(),
        node.display_name,
        node.id,
        node.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberStatus, PackageTier};

    #[test]
    fn given_member_tree_when_rendering_then_labels_slots_and_badges() {
        let tree = MemberNode::member("root", "You", PackageTier::Vip, MemberStatus::Active, 0)
            .with_children(vec![
                MemberNode::member("l1", "Sarah_J", PackageTier::Premium, MemberStatus::Active, 1),
                MemberNode::empty_slot("c1", 1),
                MemberNode::member("r1", "Mike_T", PackageTier::Basic, MemberStatus::Inactive, 1),
            ]);

        let rendered = render_tree(&tree, 3).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("[G] You (root) Active"));
        assert!(lines[1].contains("Left: [P] Sarah_J (l1) Active"));
        assert!(lines[2].contains("Center: (empty) c1"));
        assert!(lines[3].contains("Right: [S] Mike_T (r1) Inactive"));
    }

    #[test]
    fn given_partial_ternary_node_when_rendering_with_arity_then_keeps_slot_names() {
        let tree = MemberNode::member("root", "You", PackageTier::Vip, MemberStatus::Active, 0)
            .with_children(vec![
                MemberNode::member("a", "Anna_K", PackageTier::Premium, MemberStatus::Active, 1),
                MemberNode::empty_slot("b", 1),
            ]);

        let rendered = render_tree(&tree, 3).to_string();

        assert!(rendered.contains("Left: [P] Anna_K (a) Active"));
        assert!(rendered.contains("Center: (empty) b"));
        assert!(!rendered.contains("Right"));
    }
}
