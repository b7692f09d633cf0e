//! Parent-pointer index over the asset hierarchy.
//!
//! Built once per resolution from the rows the store returns; never persisted.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use regula_core::AssetId;

use crate::{AccessError, AccessResult, AssetKey, AssetSource};

/// Default cap on ancestor walks. The fixed hierarchy needs at most 2 hops.
pub const DEFAULT_MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioNode {
    pub id: AssetId,
    pub name: String,
}

/// A regulation group and the portfolio it belongs to (if linked).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLink {
    pub id: AssetId,
    pub portfolio_id: Option<AssetId>,
    pub name: String,
}

/// A regulation unit and the group it belongs to (if linked).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLink {
    pub id: AssetId,
    pub group_id: Option<AssetId>,
    pub name: String,
}

/// Hierarchy rows as supplied by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchySnapshot {
    pub portfolios: Vec<PortfolioNode>,
    pub groups: Vec<GroupLink>,
    pub units: Vec<UnitLink>,
}

/// Raw child → parent edge. Not validated against the fixed type hierarchy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHierarchyEdge {
    pub child: AssetKey,
    pub parent: AssetKey,
}

/// Child → parent lookup plus asset names for source tags.
#[derive(Debug, Clone)]
pub struct AssetHierarchy {
    parents: HashMap<AssetKey, AssetKey>,
    names: HashMap<AssetKey, String>,
    max_depth: usize,
}

impl Default for AssetHierarchy {
    fn default() -> Self {
        Self {
            parents: HashMap::new(),
            names: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Register group → portfolio and unit → group edges.
///
/// Groups or units without a parent id get no edge and act as roots.
pub fn build_hierarchy(groups: &[GroupLink], units: &[UnitLink]) -> AssetHierarchy {
    let mut hierarchy = AssetHierarchy::default();

    for group in groups {
        let key = AssetKey::group(group.id);
        hierarchy.names.insert(key, group.name.clone());
        if let Some(portfolio_id) = group.portfolio_id {
            hierarchy.parents.insert(key, AssetKey::portfolio(portfolio_id));
        }
    }

    for unit in units {
        let key = AssetKey::unit(unit.id);
        hierarchy.names.insert(key, unit.name.clone());
        if let Some(group_id) = unit.group_id {
            hierarchy.parents.insert(key, AssetKey::group(group_id));
        }
    }

    hierarchy
}

impl AssetHierarchy {
    /// Build from store rows, dropping edges whose parent is not in the snapshot.
    ///
    /// An asset pointing at a missing portfolio or group is treated as a root.
    pub fn from_snapshot(snapshot: &HierarchySnapshot) -> Self {
        let mut hierarchy = build_hierarchy(&snapshot.groups, &snapshot.units);
        for portfolio in &snapshot.portfolios {
            hierarchy
                .names
                .insert(AssetKey::portfolio(portfolio.id), portfolio.name.clone());
        }

        let known: HashSet<AssetKey> = snapshot
            .portfolios
            .iter()
            .map(|p| AssetKey::portfolio(p.id))
            .chain(snapshot.groups.iter().map(|g| AssetKey::group(g.id)))
            .collect();
        hierarchy.parents.retain(|_, parent| known.contains(parent));

        hierarchy
    }

    /// Build from raw edges. Later edges for the same child replace earlier ones.
    pub fn from_edges(edges: impl IntoIterator<Item = AssetHierarchyEdge>) -> Self {
        let mut hierarchy = Self::default();
        for edge in edges {
            hierarchy.parents.insert(edge.child, edge.parent);
        }
        hierarchy
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_name(mut self, key: AssetKey, name: impl Into<String>) -> Self {
        self.names.insert(key, name.into());
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn parent_of(&self, key: &AssetKey) -> Option<AssetKey> {
        self.parents.get(key).copied()
    }

    pub fn name_of(&self, key: &AssetKey) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// Source tag for a profile originating at `key`.
    pub fn source_for(&self, key: AssetKey) -> AssetSource {
        AssetSource {
            asset_type: key.asset_type,
            id: key.id,
            name: self.name_of(&key).map(str::to_owned),
        }
    }

    pub fn edge_count(&self) -> usize {
        self.parents.len()
    }

    /// Ancestors of `key`, nearest first.
    ///
    /// The walk stops at the first asset with no parent edge. Revisiting an
    /// asset fails with `HierarchyCycle`; walking more than `max_depth` hops
    /// fails with `HierarchyDepthExceeded`.
    pub fn ancestors(&self, key: AssetKey) -> AccessResult<Vec<AssetKey>> {
        let mut visited: HashSet<AssetKey> = HashSet::from([key]);
        let mut chain = Vec::new();
        let mut current = key;

        while let Some(parent) = self.parent_of(&current) {
            if !visited.insert(parent) {
                return Err(AccessError::HierarchyCycle { asset: parent });
            }
            if chain.len() == self.max_depth {
                return Err(AccessError::HierarchyDepthExceeded {
                    asset: key,
                    max_depth: self.max_depth,
                });
            }
            chain.push(parent);
            current = parent;
        }

        Ok(chain)
    }
}
