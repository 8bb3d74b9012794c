//! Network tree service
//!
//! Loads matrix trees from JSON files and answers the portal's network queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    Aggregator, CpvSummary, DownlineEntry, MemberId, MemberNode, Navigator, NetworkSummary,
    TreeStore,
};
use crate::infrastructure::traits::FileSystem;

/// Network and CPV summaries, as shown on the overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReport {
    pub network: NetworkSummary,
    pub cpv: CpvSummary,
}

/// A member together with where it sits in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLookup {
    pub member: MemberNode,
    /// Ids from the true root down to the member
    pub path: Vec<MemberId>,
    /// Occupied positions below the member
    pub team_size: usize,
}

/// Service for loading and querying referral networks.
pub struct NetworkService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl NetworkService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Explicit path, or the configured `tree_file`.
    pub fn resolve_tree_file(&self, file: Option<&Path>) -> ApplicationResult<PathBuf> {
        file.map(Path::to_path_buf)
            .or_else(|| self.settings.tree_file.clone())
            .ok_or_else(|| ApplicationError::Config {
                message: "no tree file given and no tree_file configured".to_string(),
            })
    }

    /// Read and decode a tree file without validating it.
    #[instrument(level = "debug", skip(self))]
    pub fn read_tree(&self, path: &Path) -> ApplicationResult<MemberNode> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree file", path)?;
        serde_json::from_str(&content).map_err(|source| ApplicationError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decode, validate and publish a tree as a shared read-only store.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Arc<TreeStore>> {
        let root = self.read_tree(path)?;
        let store = TreeStore::with_tree(self.settings.max_arity, &root)?;
        info!("loaded {}", path.display());
        Ok(Arc::new(store))
    }

    /// Navigator positioned at `root`, or at the true root when `root` is None.
    pub fn view(&self, store: Arc<TreeStore>, root: Option<&str>) -> ApplicationResult<Navigator> {
        let mut navigator = Navigator::new(store)?;
        if let Some(id) = root {
            let member = navigator
                .store()
                .find_by_id(id)?
                .ok_or_else(|| ApplicationError::MemberNotFound(MemberId::from(id)))?;
            if member.is_empty_slot() {
                return Err(ApplicationError::EmptySlot(member.id));
            }
            navigator.navigate_to(id);
            debug!("view rooted at '{}'", navigator.current_root_id());
        }
        Ok(navigator)
    }

    pub fn find(&self, store: &TreeStore, id: &str) -> ApplicationResult<MemberLookup> {
        let member = store
            .find_by_id(id)?
            .ok_or_else(|| ApplicationError::MemberNotFound(MemberId::from(id)))?;
        let path = store.ancestors(id)?;
        let team_size = member.team_size();
        Ok(MemberLookup {
            member,
            path,
            team_size,
        })
    }

    /// Summaries using the configured rank ladder and CPV target.
    pub fn report(&self, store: Arc<TreeStore>) -> ApplicationResult<NetworkReport> {
        let aggregator = Aggregator::new(store);
        Ok(NetworkReport {
            network: aggregator.summary(&self.settings.ranks)?,
            cpv: aggregator.cpv(self.settings.required_cpv, &self.settings.cycle)?,
        })
    }

    pub fn downline(
        &self,
        store: Arc<TreeStore>,
        query: Option<&str>,
    ) -> ApplicationResult<Vec<DownlineEntry>> {
        Ok(Aggregator::new(store).downline(query)?)
    }
}
