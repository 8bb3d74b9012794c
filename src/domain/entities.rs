//! Domain entities: core data structures

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque member identifier, unique within one tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Package a member enrolled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageTier {
    /// No package; only valid on empty slots
    #[default]
    None,
    Basic,
    Premium,
    Vip,
}

impl PackageTier {
    /// Label shown to members (the portal brands tiers as metals).
    pub fn label(&self) -> &'static str {
        match self {
            PackageTier::None => "—",
            PackageTier::Basic => "Silver",
            PackageTier::Premium => "Premium",
            PackageTier::Vip => "Gold",
        }
    }

    /// Single-letter badge, empty for `None`.
    pub fn initial(&self) -> &'static str {
        match self {
            PackageTier::None => "",
            PackageTier::Basic => "S",
            PackageTier::Premium => "P",
            PackageTier::Vip => "G",
        }
    }
}

impl fmt::Display for PackageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Activation status of a tree position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    /// Unfilled slot reserved for future placement
    Empty,
}

impl MemberStatus {
    pub fn is_empty(&self) -> bool {
        matches!(self, MemberStatus::Empty)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberStatus::Active => "Active",
            MemberStatus::Inactive => "Inactive",
            MemberStatus::Empty => "Empty",
        };
        f.pad(s)
    }
}

/// Positional label of a child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Center,
    Right,
}

impl Position {
    /// Label for `slot` in a tree of the given arity.
    ///
    /// Only binary and ternary matrices have named positions.
    pub fn from_slot(slot: usize, arity: usize) -> Option<Self> {
        match (arity, slot) {
            (2, 0) | (3, 0) => Some(Position::Left),
            (3, 1) => Some(Position::Center),
            (2, 1) | (3, 2) => Some(Position::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::Left => "Left",
            Position::Center => "Center",
            Position::Right => "Right",
        };
        f.pad(s)
    }
}

/// A member and its owned downline, as supplied to and returned from the store.
///
/// The wire form uses camelCase keys and also accepts the portal's legacy
/// names (`username`, `package`, `level`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberNode {
    pub id: MemberId,
    #[serde(alias = "username")]
    pub display_name: String,
    #[serde(alias = "package", default, deserialize_with = "deserialize_tier")]
    pub package_tier: PackageTier,
    #[serde(alias = "level")]
    pub depth: usize,
    pub status: MemberStatus,
    #[serde(default)]
    pub point_value: u64,
    #[serde(default)]
    pub children: Vec<MemberNode>,
}

/// `null` and a missing key both mean "no package".
fn deserialize_tier<'de, D>(deserializer: D) -> Result<PackageTier, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PackageTier>::deserialize(deserializer)?.unwrap_or_default())
}

impl MemberNode {
    /// Occupied member without children.
    pub fn member(
        id: impl Into<MemberId>,
        display_name: impl Into<String>,
        package_tier: PackageTier,
        status: MemberStatus,
        depth: usize,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            package_tier,
            depth,
            status,
            point_value: 0,
            children: Vec::new(),
        }
    }

    /// Unfilled slot.
    pub fn empty_slot(id: impl Into<MemberId>, depth: usize) -> Self {
        Self {
            id: id.into(),
            display_name: "Empty Slot".to_string(),
            package_tier: PackageTier::None,
            depth,
            status: MemberStatus::Empty,
            point_value: 0,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<MemberNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_point_value(mut self, point_value: u64) -> Self {
        self.point_value = point_value;
        self
    }

    pub fn is_empty_slot(&self) -> bool {
        self.status.is_empty()
    }

    /// Occupied positions below this node; empty slots are not counted.
    pub fn team_size(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&MemberNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            count += usize::from(!node.is_empty_slot());
            stack.extend(node.children.iter());
        }
        count
    }

    /// One-line description for tooltips and listings.
    pub fn describe(&self) -> String {
        describe(
            &self.display_name,
            self.package_tier,
            self.depth,
            self.status,
        )
    }
}

/// Flat projection of a node, used by linear (list) presentations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    pub id: MemberId,
    pub display_name: String,
    pub package_tier: PackageTier,
    /// Depth relative to the current view root
    pub depth: usize,
    pub status: MemberStatus,
    /// Index among the parent's children, None for the view root
    pub slot: Option<usize>,
}

impl FlatNode {
    pub fn describe(&self) -> String {
        describe(
            &self.display_name,
            self.package_tier,
            self.depth,
            self.status,
        )
    }
}

fn describe(name: &str, tier: PackageTier, depth: usize, status: MemberStatus) -> String {
    if status.is_empty() {
        return "Empty slot available for placement".to_string();
    }
    format!("{} | {} | Level {} | {}", name, tier.label(), depth, status)
}
