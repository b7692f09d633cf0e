//! Narrow a user's assets to the ones that matter for one module.

use crate::{AssetAccess, ProfileAccess, UserAccessData};

/// Assets the user may act on for the module with `module_slug`.
///
/// Returns `None` when the module is unknown or the user has no access to it
/// ("not permitted"), and `Some(vec![])` when access exists but no held asset
/// carries a grant for the module ("nothing to show").
///
/// Returned entries only keep the profiles that grant the module, and those
/// profiles only keep their grant for it.
///
/// Super-admins are expected to list the full asset catalog instead; this
/// function only looks at `asset_access`.
pub fn assets_for_module(access: &UserAccessData, module_slug: &str) -> Option<Vec<AssetAccess>> {
    let module = access.module(module_slug).filter(|m| m.has_access)?;
    let module_id = module.id;

    let assets = access
        .asset_access
        .iter()
        .filter(|a| a.grants_module(module_id))
        .map(|a| AssetAccess {
            asset: a.asset.clone(),
            access_profiles: a
                .access_profiles
                .iter()
                .filter(|p| p.grants_module(module_id))
                .map(|p| ProfileAccess {
                    permissions: p
                        .permissions
                        .iter()
                        .filter(|g| g.module_id == module_id)
                        .copied()
                        .collect(),
                    ..p.clone()
                })
                .collect(),
        })
        .collect();

    Some(assets)
}
