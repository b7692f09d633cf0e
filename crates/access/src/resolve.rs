//! Direct + inherited access profile resolution per held asset.

use std::collections::{BTreeMap, HashMap};

use regula_core::UserId;

use crate::{
    AccessProfile, AccessProfileWithSource, AccessResult, AssetHierarchy, AssetKey,
    UserAccessProfileGrant,
};

/// Profiles applicable at each held asset: direct grants first, then grants
/// inherited from the parent, grandparent, ... in root-ward order.
pub type ResolvedProfiles = BTreeMap<AssetKey, Vec<AccessProfileWithSource>>;

/// Resolve the profiles that apply to every asset `user_id` holds.
///
/// Grants belonging to other users are ignored, so callers may pass a shared
/// batch. Inherited profiles are tagged with the ancestor they were granted on;
/// intermediate levels the user does not hold are walked through all the same.
/// Repeated profiles are kept, merging happens during aggregation.
pub fn resolve_access_profiles(
    user_id: UserId,
    held: &[AssetKey],
    grants: &[UserAccessProfileGrant],
    hierarchy: &AssetHierarchy,
) -> AccessResult<ResolvedProfiles> {
    let mut grants_by_asset: HashMap<AssetKey, Vec<&AccessProfile>> = HashMap::new();
    for grant in grants.iter().filter(|g| g.user_id == user_id) {
        grants_by_asset
            .entry(grant.asset)
            .or_default()
            .push(&grant.access_profile);
    }

    let mut resolved = ResolvedProfiles::new();

    for key in held {
        if resolved.contains_key(key) {
            continue;
        }

        let mut profiles: Vec<AccessProfileWithSource> = grants_by_asset
            .get(key)
            .into_iter()
            .flatten()
            .map(|p| AccessProfileWithSource::direct((*p).clone()))
            .collect();

        for ancestor in hierarchy.ancestors(*key)? {
            let Some(inherited) = grants_by_asset.get(&ancestor) else {
                continue;
            };
            let source = hierarchy.source_for(ancestor);
            profiles.extend(
                inherited
                    .iter()
                    .map(|p| AccessProfileWithSource::inherited((*p).clone(), source.clone())),
            );
        }

        resolved.insert(*key, profiles);
    }

    Ok(resolved)
}
