//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregator;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod navigator;
pub mod store;

pub use aggregator::{Aggregator, CpvSummary, DownlineEntry, NetworkSummary, RankTier};
pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::{BuiltTree, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult, TreeViolation};
pub use navigator::{NavigationState, Navigator};
pub use store::{TreeStore, DEFAULT_MAX_ARITY};
