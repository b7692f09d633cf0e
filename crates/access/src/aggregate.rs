//! User-global module permissions plus per-asset profile detail.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use regula_core::{AccessProfileId, ModuleId, UserId};

use crate::{
    AccessProfileWithSource, AssetKey, AssetRef, AssetSource, Module, ModuleAccess,
    ModulePermission, PermissionType, ResolvedProfiles, Role,
};

/// A held asset together with every profile (direct + inherited) that applies to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatAsset {
    pub asset: AssetRef,
    pub access_profiles: Vec<AccessProfileWithSource>,
}

/// One profile as it applies at one asset, with its original grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAccess {
    pub profile_id: AccessProfileId,
    pub name: String,
    pub source: Option<AssetSource>,
    pub permissions: Vec<ModulePermission>,
}

impl ProfileAccess {
    pub fn grants_module(&self, module_id: ModuleId) -> bool {
        self.permissions.iter().any(|p| p.module_id == module_id)
    }
}

impl From<&AccessProfileWithSource> for ProfileAccess {
    fn from(value: &AccessProfileWithSource) -> Self {
        Self {
            profile_id: value.profile.id,
            name: value.profile.name.clone(),
            source: value.source.clone(),
            permissions: value.profile.permissions.clone(),
        }
    }
}

/// Everything a user may do at one asset. Not merged across profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAccess {
    pub asset: AssetRef,
    pub access_profiles: Vec<ProfileAccess>,
}

impl AssetAccess {
    pub fn key(&self) -> AssetKey {
        self.asset.key
    }

    pub fn grants_module(&self, module_id: ModuleId) -> bool {
        self.access_profiles.iter().any(|p| p.grants_module(module_id))
    }

    /// Highest permission any profile at this asset carries for `module_id`.
    pub fn permission_for(&self, module_id: ModuleId) -> Option<PermissionType> {
        let mut slot = None;
        for grant in self
            .access_profiles
            .iter()
            .flat_map(|p| p.permissions.iter())
            .filter(|g| g.module_id == module_id)
        {
            PermissionType::merge_into(&mut slot, grant.permission);
        }
        slot
    }
}

/// Result of aggregation for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccessData {
    pub user_id: UserId,
    pub is_super_admin: bool,
    /// One entry per known module, in catalog order.
    pub module_access: Vec<ModuleAccess>,
    /// One entry per held asset, in holding order.
    pub asset_access: Vec<AssetAccess>,
}

impl UserAccessData {
    pub fn module(&self, slug: &str) -> Option<&ModuleAccess> {
        self.module_access.iter().find(|m| m.slug == slug)
    }

    pub fn asset(&self, key: &AssetKey) -> Option<&AssetAccess> {
        self.asset_access.iter().find(|a| a.key() == *key)
    }

    pub fn accessible_modules(&self) -> impl Iterator<Item = &ModuleAccess> {
        self.module_access.iter().filter(|m| m.has_access)
    }
}

/// Pair held assets with their resolved profiles, keeping holding order.
///
/// Assets held more than once appear once; assets missing from `resolved`
/// get an empty profile list.
pub fn flatten(held: &[AssetRef], resolved: &ResolvedProfiles) -> Vec<FlatAsset> {
    let mut seen = HashSet::new();
    held.iter()
        .filter(|a| seen.insert(a.key))
        .map(|a| FlatAsset {
            asset: a.clone(),
            access_profiles: resolved.get(&a.key).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Merge every grant reachable from `user_assets` into one decision per module.
///
/// Permissions are merged across all assets (highest wins, see
/// [`PermissionType::merge`]). Grants naming a module missing from `modules`
/// are dropped. A super-admin role reports `Manage` on every module.
pub fn aggregate(
    user_id: UserId,
    user_assets: &[FlatAsset],
    modules: &[Module],
    role: Option<&Role>,
) -> UserAccessData {
    let mut module_permissions: HashMap<ModuleId, PermissionType> = HashMap::new();
    let mut asset_access: Vec<AssetAccess> = Vec::new();
    let mut asset_index: HashMap<AssetKey, usize> = HashMap::new();

    for flat in user_assets {
        let idx = *asset_index.entry(flat.asset.key).or_insert_with(|| {
            asset_access.push(AssetAccess {
                asset: flat.asset.clone(),
                access_profiles: Vec::new(),
            });
            asset_access.len() - 1
        });

        for profile in &flat.access_profiles {
            for grant in &profile.profile.permissions {
                let mut slot = module_permissions.get(&grant.module_id).copied();
                PermissionType::merge_into(&mut slot, grant.permission);
                if let Some(merged) = slot {
                    module_permissions.insert(grant.module_id, merged);
                }
            }
            asset_access[idx].access_profiles.push(ProfileAccess::from(profile));
        }
    }

    let is_super_admin = role.is_some_and(Role::is_super_admin);

    let module_access = modules
        .iter()
        .map(|m| {
            let permission = if is_super_admin {
                Some(PermissionType::Manage)
            } else {
                module_permissions.get(&m.id).copied()
            };
            ModuleAccess::from_module(m, permission)
        })
        .collect();

    UserAccessData {
        user_id,
        is_super_admin,
        module_access,
        asset_access,
    }
}
