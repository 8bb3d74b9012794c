//! Aggregator: whole-network counts derived from the true root.
//!
//! All queries ignore navigation state; they describe the network, not a view.

use std::collections::HashMap;
use std::sync::Arc;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::{TreeArena, TreeNode};
use crate::domain::entities::{MemberId, MemberStatus, PackageTier};
use crate::domain::error::DomainResult;
use crate::domain::store::TreeStore;

/// One rung of the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier {
    pub name: String,
    /// Team size needed to hold this rank
    pub min_team_size: usize,
}

impl RankTier {
    pub fn new(name: impl Into<String>, min_team_size: usize) -> Self {
        Self {
            name: name.into(),
            min_team_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub team_size: usize,
    pub direct_referrals: usize,
    pub active_legs: usize,
    pub rank: Option<String>,
    pub next_rank: Option<String>,
    /// Percent of the way from the current rank to the next (0..=100)
    pub rank_progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpvSummary {
    pub personal_cpv: u64,
    pub team_cpv: u64,
    pub required_cpv: u64,
    pub cycle: String,
    /// Team CPV as a percentage of the requirement, capped at 100
    pub percentage: u8,
}

/// A downline member with its own counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownlineEntry {
    pub id: MemberId,
    pub display_name: String,
    pub package_tier: PackageTier,
    pub status: MemberStatus,
    /// Absolute depth (level below the true root)
    pub depth: usize,
    pub direct_count: usize,
    pub team_size: usize,
}

pub struct Aggregator {
    store: Arc<TreeStore>,
}

impl Aggregator {
    pub fn new(store: Arc<TreeStore>) -> Self {
        Self { store }
    }

    /// Occupied positions below the true root.
    #[instrument(level = "trace", skip(self))]
    pub fn team_size(&self) -> DomainResult<usize> {
        let (arena, root) = self.store.arena()?;
        Ok(occupied_below(arena, root))
    }

    /// Occupied immediate children of the true root.
    pub fn direct_count(&self) -> DomainResult<usize> {
        let (arena, root) = self.store.arena()?;
        Ok(occupied_children(arena, root))
    }

    /// Root legs containing at least one active member.
    #[instrument(level = "trace", skip(self))]
    pub fn active_leg_count(&self) -> DomainResult<usize> {
        let (arena, root) = self.store.arena()?;
        Ok(children(arena, root)
            .filter(|&(leg, _)| {
                arena
                    .iter_from(leg)
                    .any(|(_, n)| n.data.status == MemberStatus::Active)
            })
            .count())
    }

    pub fn personal_point_value(&self) -> DomainResult<u64> {
        let (arena, root) = self.store.arena()?;
        Ok(arena.get_node(root).map(|n| n.data.point_value).unwrap_or(0))
    }

    /// Point value summed over every occupied position below the root, saturating at `u64::MAX`.
    pub fn team_point_value(&self) -> DomainResult<u64> {
        let (arena, root) = self.store.arena()?;
        Ok(arena
            .iter_from(root)
            .skip(1)
            .filter(|(_, n)| !n.data.status.is_empty())
            .fold(0u64, |total, (_, n)| total.saturating_add(n.data.point_value)))
    }

    /// Occupied members below the root in pre-order, optionally filtered by a
    /// case-insensitive match on name or id.
    #[instrument(level = "debug", skip(self))]
    pub fn downline(&self, query: Option<&str>) -> DomainResult<Vec<DownlineEntry>> {
        let (arena, root) = self.store.arena()?;
        let team_sizes = team_sizes(arena);
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        Ok(arena
            .iter_from(root)
            .skip(1)
            .filter(|(_, n)| !n.data.status.is_empty())
            .filter(|(_, n)| match &needle {
                Some(q) => {
                    n.data.display_name.to_lowercase().contains(q)
                        || n.data.id.as_str().to_lowercase().contains(q)
                }
                None => true,
            })
            .map(|(idx, n)| DownlineEntry {
                id: n.data.id.clone(),
                display_name: n.data.display_name.clone(),
                package_tier: n.data.package_tier,
                status: n.data.status,
                depth: n.data.depth,
                direct_count: occupied_children(arena, idx),
                team_size: team_sizes.get(&idx).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Counts plus rank standing against `ranks` (any order).
    pub fn summary(&self, ranks: &[RankTier]) -> DomainResult<NetworkSummary> {
        let team_size = self.team_size()?;
        let standing = RankStanding::compute(team_size, ranks);
        Ok(NetworkSummary {
            team_size,
            direct_referrals: self.direct_count()?,
            active_legs: self.active_leg_count()?,
            rank: standing.rank,
            next_rank: standing.next_rank,
            rank_progress: standing.progress,
        })
    }

    pub fn cpv(&self, required_cpv: u64, cycle: &str) -> DomainResult<CpvSummary> {
        let team_cpv = self.team_point_value()?;
        Ok(CpvSummary {
            personal_cpv: self.personal_point_value()?,
            team_cpv,
            required_cpv,
            cycle: cycle.to_string(),
            percentage: percentage(team_cpv, required_cpv),
        })
    }
}

fn children(arena: &TreeArena, idx: Index) -> impl Iterator<Item = (Index, &TreeNode)> {
    arena
        .get_node(idx)
        .map(|n| n.children.as_slice())
        .unwrap_or(&[])
        .iter()
        .filter_map(move |&c| arena.get_node(c).map(|n| (c, n)))
}

fn occupied_children(arena: &TreeArena, idx: Index) -> usize {
    children(arena, idx)
        .filter(|(_, n)| !n.data.status.is_empty())
        .count()
}

fn occupied_below(arena: &TreeArena, idx: Index) -> usize {
    arena
        .iter_from(idx)
        .skip(1)
        .filter(|(_, n)| !n.data.status.is_empty())
        .count()
}

/// Occupied positions below every node, in one post-order pass.
fn team_sizes(arena: &TreeArena) -> HashMap<Index, usize> {
    let mut sizes = HashMap::with_capacity(arena.len());
    for (idx, _) in arena.iter_postorder() {
        let below: usize = children(arena, idx)
            .map(|(child, n)| {
                sizes.get(&child).copied().unwrap_or(0) + usize::from(!n.data.status.is_empty())
            })
            .sum();
        sizes.insert(idx, below);
    }
    sizes
}

/// Integer percentage of `value` against `target`, capped at 100; 0 for a zero target.
pub fn percentage(value: u64, target: u64) -> u8 {
    if target == 0 {
        return 0;
    }
    let pct = (u128::from(value) * 100 / u128::from(target)).min(100);
    pct as u8
}

struct RankStanding {
    rank: Option<String>,
    next_rank: Option<String>,
    progress: u8,
}

impl RankStanding {
    fn compute(team_size: usize, ranks: &[RankTier]) -> Self {
        let mut ladder: Vec<&RankTier> = ranks.iter().collect();
        ladder.sort_by_key(|r| r.min_team_size);

        let current = ladder
            .iter()
            .rev()
            .find(|r| r.min_team_size <= team_size)
            .copied();
        let next = ladder
            .iter()
            .find(|r| r.min_team_size > team_size)
            .copied();

        let progress = match next {
            None if ladder.is_empty() => 0,
            None => 100,
            Some(next) => {
                let floor = current.map(|r| r.min_team_size).unwrap_or(0);
                percentage(
                    (team_size - floor) as u64,
                    (next.min_team_size - floor) as u64,
                )
            }
        };

        Self {
            rank: current.map(|r| r.name.clone()),
            next_rank: next.map(|r| r.name.clone()),
            progress,
        }
    }
}
