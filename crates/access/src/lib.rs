//! `regula-access` — access resolution for the portfolio → group → unit hierarchy.
//!
//! The engine is pure: hierarchy index, profile resolution, module
//! aggregation and module-scoped filtering are plain functions over data.
//! [`AccessService`] performs the batched store reads and runs them in order.

pub mod aggregate;
pub mod asset;
pub mod authorize;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod module;
pub mod permission;
pub mod profile;
pub mod resolve;
pub mod roles;
pub mod service;
pub mod store;

pub use aggregate::{AssetAccess, FlatAsset, ProfileAccess, UserAccessData, aggregate, flatten};
pub use asset::{AssetKey, AssetRef, AssetSource, AssetType};
pub use authorize::{
    DenialKind, DenialReason, GrantContribution, ModuleAccessExplanation, explain_module_access,
    require_module_permission,
};
pub use config::AccessConfig;
pub use context::AccessContext;
pub use error::{AccessError, AccessResult};
pub use filter::assets_for_module;
pub use hierarchy::{
    AssetHierarchy, AssetHierarchyEdge, GroupLink, HierarchySnapshot, PortfolioNode, UnitLink,
    build_hierarchy,
};
pub use module::{Module, ModuleAccess, NavigationEntry, navigation};
pub use permission::PermissionType;
pub use profile::{
    AccessProfile, AccessProfileWithSource, ModulePermission, UserAccessProfileGrant,
    UserAssetAssignment,
};
pub use resolve::{ResolvedProfiles, resolve_access_profiles};
pub use roles::Role;
pub use service::{AccessService, ModuleAssets};
pub use store::{AccessStore, InMemoryAccessStore};
