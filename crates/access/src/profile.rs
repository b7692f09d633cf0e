//! Access profiles and the rows that attach them to users and assets.

use serde::{Deserialize, Serialize};

use regula_core::{AccessProfileId, Entity, ModuleId, UserId};

use crate::{AssetKey, AssetSource, PermissionType};

/// One `(module, permission)` grant inside a profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModulePermission {
    pub module_id: ModuleId,
    pub permission: PermissionType,
}

/// Named, reusable bundle of per-module grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessProfile {
    pub id: AccessProfileId,
    pub name: String,
    pub permissions: Vec<ModulePermission>,
}

impl AccessProfile {
    pub fn new(id: AccessProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    pub fn grant(mut self, module_id: ModuleId, permission: PermissionType) -> Self {
        self.permissions.push(ModulePermission {
            module_id,
            permission,
        });
        self
    }

    /// Permission this profile carries for `module_id`, if any.
    ///
    /// When a profile lists the same module twice the entries are merged.
    pub fn permission_for(&self, module_id: ModuleId) -> Option<PermissionType> {
        let mut slot = None;
        for p in self.permissions.iter().filter(|p| p.module_id == module_id) {
            PermissionType::merge_into(&mut slot, p.permission);
        }
        slot
    }
}

impl Entity for AccessProfile {
    type Id = AccessProfileId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// A user directly holds an asset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserAssetAssignment {
    pub user_id: UserId,
    pub asset: AssetKey,
}

/// A profile granted to a user, scoped to one asset.
///
/// The profile definition travels with the grant row so resolution needs no
/// second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccessProfileGrant {
    pub user_id: UserId,
    pub asset: AssetKey,
    pub access_profile: AccessProfile,
}

impl UserAccessProfileGrant {
    pub fn access_profile_id(&self) -> AccessProfileId {
        self.access_profile.id
    }
}

/// A profile applicable at an asset. `source` is `None` for direct grants and
/// names the originating ancestor for inherited ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessProfileWithSource {
    pub profile: AccessProfile,
    pub source: Option<AssetSource>,
}

impl AccessProfileWithSource {
    pub fn direct(profile: AccessProfile) -> Self {
        Self {
            profile,
            source: None,
        }
    }

    pub fn inherited(profile: AccessProfile, source: AssetSource) -> Self {
        Self {
            profile,
            source: Some(source),
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.source.is_some()
    }
}
