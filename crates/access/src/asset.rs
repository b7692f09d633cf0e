//! Asset identity: the three-level portfolio → group → unit hierarchy.

use serde::{Deserialize, Serialize};

use regula_core::{AssetId, Entity};

/// Kind of asset permissions are scoped against.
///
/// The hierarchy is strict: a unit's parent is always a group and a group's
/// parent is always a portfolio.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Portfolio,
    RegulationGroup,
    RegulationUnit,
}

impl AssetType {
    /// The type an asset of this type links to as its parent, if any.
    pub fn parent_type(self) -> Option<AssetType> {
        match self {
            AssetType::Portfolio => None,
            AssetType::RegulationGroup => Some(AssetType::Portfolio),
            AssetType::RegulationUnit => Some(AssetType::RegulationGroup),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Portfolio => "PORTFOLIO",
            AssetType::RegulationGroup => "REGULATION_GROUP",
            AssetType::RegulationUnit => "REGULATION_UNIT",
        }
    }
}

impl core::fmt::Display for AssetType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(asset_type, asset_id)` — the only unique identity of an asset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetKey {
    pub asset_type: AssetType,
    pub id: AssetId,
}

impl AssetKey {
    pub fn new(asset_type: AssetType, id: AssetId) -> Self {
        Self { asset_type, id }
    }

    pub fn portfolio(id: AssetId) -> Self {
        Self::new(AssetType::Portfolio, id)
    }

    pub fn group(id: AssetId) -> Self {
        Self::new(AssetType::RegulationGroup, id)
    }

    pub fn unit(id: AssetId) -> Self {
        Self::new(AssetType::RegulationUnit, id)
    }
}

impl core::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.asset_type, self.id)
    }
}

/// An asset with its descriptive name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub key: AssetKey,
    pub name: String,
}

impl AssetRef {
    pub fn new(key: AssetKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
        }
    }
}

impl Entity for AssetRef {
    type Id = AssetKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Origin of an inherited access profile: the ancestor asset it was granted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSource {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub id: AssetId,
    /// `None` when the store did not supply a name for the ancestor.
    pub name: Option<String>,
}

impl AssetSource {
    pub fn key(&self) -> AssetKey {
        AssetKey::new(self.asset_type, self.id)
    }
}
