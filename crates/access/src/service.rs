//! Batched fetch + pure resolution pipeline behind one entry point.
//!
//! Every call takes the user explicitly (via [`AccessContext`] or a `UserId`);
//! the same code path serves "current user" pages and admin views of another
//! user.

use std::collections::BTreeSet;

use regula_core::{AssetId, UserId};

use crate::{
    AccessConfig, AccessContext, AccessError, AccessResult, AccessStore, AssetAccess,
    AssetHierarchy, AssetKey, AssetRef, AssetType, ModuleAccessExplanation, PermissionType,
    ResolvedProfiles, UserAccessData, aggregate, assets_for_module, explain_module_access,
    flatten, require_module_permission, resolve_access_profiles,
};

/// Assets visible for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleAssets {
    /// Super-admin: the whole asset catalog, unfiltered.
    Catalog(Vec<AssetRef>),
    /// Regular user: held assets whose profiles grant the module.
    Scoped(Vec<AssetAccess>),
}

impl ModuleAssets {
    pub fn len(&self) -> usize {
        match self {
            ModuleAssets::Catalog(assets) => assets.len(),
            ModuleAssets::Scoped(assets) => assets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct AccessService<S> {
    store: S,
    config: AccessConfig,
}

impl<S: AccessStore> AccessService<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, AccessConfig::default())
    }

    pub fn with_config(store: S, config: AccessConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct + inherited profiles for every asset `user_id` holds.
    pub fn resolved_profiles(&self, user_id: UserId) -> AccessResult<ResolvedProfiles> {
        self.load(user_id).map(|(_, resolved)| resolved)
    }

    /// Full module/asset access picture for the session's user.
    pub fn resolve(&self, ctx: &AccessContext) -> AccessResult<UserAccessData> {
        let user_id = ctx.user_id();
        let (held, resolved) = self.load(user_id)?;
        let modules = self.store.all_modules()?;

        if ctx.is_super_admin() {
            tracing::info!(user_id = %user_id, "super-admin bypass: all modules granted");
        }

        let access = aggregate(user_id, &flatten(&held, &resolved), &modules, ctx.role());
        tracing::debug!(
            user_id = %user_id,
            modules = modules.len(),
            accessible = access.accessible_modules().count(),
            "resolved module access"
        );
        Ok(access)
    }

    /// Assets the session's user may act on for `module_slug`.
    ///
    /// `Ok(None)` means "not permitted" (or unknown module); an empty
    /// `Scoped` list means permitted with nothing to show.
    pub fn assets_for_module(
        &self,
        ctx: &AccessContext,
        module_slug: &str,
    ) -> AccessResult<Option<ModuleAssets>> {
        if ctx.is_super_admin() {
            let known = self
                .store
                .all_modules()?
                .iter()
                .any(|m| m.slug == module_slug);
            if !known {
                return Ok(None);
            }
            return Ok(Some(ModuleAssets::Catalog(self.store.asset_catalog()?)));
        }

        let access = self.resolve(ctx)?;
        let assets = assets_for_module(&access, module_slug).map(ModuleAssets::Scoped);
        if assets.is_none() {
            tracing::debug!(user_id = %ctx.user_id(), module = %module_slug, "module not permitted");
        }
        Ok(assets)
    }

    /// Fail with `Forbidden` unless the user holds at least `required` on the module.
    pub fn require(
        &self,
        ctx: &AccessContext,
        module_slug: &str,
        required: PermissionType,
    ) -> AccessResult<PermissionType> {
        let access = self.resolve(ctx)?;
        require_module_permission(&access, module_slug, required).inspect_err(|e| {
            tracing::warn!(
                user_id = %ctx.user_id(),
                module = %module_slug,
                required = %required,
                error = %e,
                "permission denied"
            );
        })
    }

    pub fn explain(
        &self,
        ctx: &AccessContext,
        module_slug: &str,
    ) -> AccessResult<ModuleAccessExplanation> {
        let access = self.resolve(ctx)?;
        Ok(explain_module_access(&access, module_slug))
    }

    /// One batched round of store reads, then pure resolution.
    fn load(&self, user_id: UserId) -> AccessResult<(Vec<AssetRef>, ResolvedProfiles)> {
        let held = self.store.user_held_assets(user_id)?;

        let ids_of = |asset_type: AssetType| -> Vec<AssetId> {
            held.iter()
                .filter(|a| a.key.asset_type == asset_type)
                .map(|a| a.key.id)
                .collect()
        };
        let snapshot = self.store.hierarchy_edges(
            &ids_of(AssetType::RegulationGroup),
            &ids_of(AssetType::RegulationUnit),
        )?;

        let mut hierarchy = AssetHierarchy::from_snapshot(&snapshot)
            .with_max_depth(self.config.max_inheritance_depth);
        for asset in &held {
            if hierarchy.name_of(&asset.key).is_none() {
                hierarchy = hierarchy.with_name(asset.key, asset.name.clone());
            }
        }

        // Grants on ancestors count even when the ancestor itself is not held.
        let held_keys: Vec<AssetKey> = held.iter().map(|a| a.key).collect();
        let mut grant_scope: BTreeSet<AssetKey> = held_keys.iter().copied().collect();
        for key in &held_keys {
            let ancestors = hierarchy.ancestors(*key).inspect_err(|e| log_hierarchy_defect(user_id, e))?;
            grant_scope.extend(ancestors);
        }
        let grant_scope: Vec<AssetKey> = grant_scope.into_iter().collect();

        let grants = self
            .store
            .direct_access_profile_grants(user_id, &grant_scope)?;

        tracing::debug!(
            user_id = %user_id,
            held = held.len(),
            hierarchy_edges = hierarchy.edge_count(),
            grants = grants.len(),
            "loaded access data"
        );

        let resolved = resolve_access_profiles(user_id, &held_keys, &grants, &hierarchy)
            .inspect_err(|e| log_hierarchy_defect(user_id, e))?;

        Ok((held, resolved))
    }
}

fn log_hierarchy_defect(user_id: UserId, error: &AccessError) {
    tracing::warn!(user_id = %user_id, error = %error, "asset hierarchy defect");
}
