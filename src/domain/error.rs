//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{MemberId, PackageTier};

/// Which structural invariant a tree violates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeViolation {
    #[error("{children} children exceed max arity {max}")]
    ArityExceeded { children: usize, max: usize },

    #[error("duplicate id")]
    DuplicateId,

    #[error("blank id")]
    BlankId,

    #[error("depth {found} does not match expected depth {expected}")]
    DepthMismatch { expected: usize, found: usize },

    #[error("empty slot carries package {0:?}")]
    PackageOnEmptySlot(PackageTier),

    #[error("occupied slot has no package")]
    MissingPackage,
}

/// Domain errors represent structural violations and misuse of the tree core.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid tree at node '{id}': {violation}")]
    InvalidTree {
        id: MemberId,
        violation: TreeViolation,
    },

    #[error("invalid max arity: {0} (must be at least 1)")]
    InvalidArity(usize),

    #[error("tree not loaded")]
    NotLoaded,
}

impl DomainError {
    pub(crate) fn invalid(id: &MemberId, violation: TreeViolation) -> Self {
        Self::InvalidTree {
            id: id.clone(),
            violation,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
