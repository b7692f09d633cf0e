//! Store port consumed by the access service, plus an in-memory implementation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regula_core::{
    AccessProfileId, AssetId, DomainError, DomainResult, Entity, ModuleId, UserId,
};

use crate::{
    AccessProfile, AssetKey, AssetRef, AssetType, GroupLink, HierarchySnapshot, Module,
    PortfolioNode, UnitLink, UserAccessProfileGrant, UserAssetAssignment,
};

/// Read side of the persistence collaborator.
///
/// Each call is one blocking fetch; the service batches them before running
/// the resolution pipeline.
pub trait AccessStore: Send + Sync {
    /// Assets the user directly holds.
    fn user_held_assets(&self, user_id: UserId) -> DomainResult<Vec<AssetRef>>;

    /// Profile grants for `user_id` scoped to any of `assets`.
    fn direct_access_profile_grants(
        &self,
        user_id: UserId,
        assets: &[AssetKey],
    ) -> DomainResult<Vec<UserAccessProfileGrant>>;

    /// Hierarchy rows for the given groups and units.
    ///
    /// Implementations return the requested rows, the groups that parent the
    /// requested units, and the portfolios those groups link to.
    fn hierarchy_edges(
        &self,
        group_ids: &[AssetId],
        unit_ids: &[AssetId],
    ) -> DomainResult<HierarchySnapshot>;

    fn all_modules(&self) -> DomainResult<Vec<Module>>;

    /// Every asset, for the super-admin catalog view.
    fn asset_catalog(&self) -> DomainResult<Vec<AssetRef>>;
}

impl<S> AccessStore for Arc<S>
where
    S: AccessStore + ?Sized,
{
    fn user_held_assets(&self, user_id: UserId) -> DomainResult<Vec<AssetRef>> {
        (**self).user_held_assets(user_id)
    }

    fn direct_access_profile_grants(
        &self,
        user_id: UserId,
        assets: &[AssetKey],
    ) -> DomainResult<Vec<UserAccessProfileGrant>> {
        (**self).direct_access_profile_grants(user_id, assets)
    }

    fn hierarchy_edges(
        &self,
        group_ids: &[AssetId],
        unit_ids: &[AssetId],
    ) -> DomainResult<HierarchySnapshot> {
        (**self).hierarchy_edges(group_ids, unit_ids)
    }

    fn all_modules(&self) -> DomainResult<Vec<Module>> {
        (**self).all_modules()
    }

    fn asset_catalog(&self) -> DomainResult<Vec<AssetRef>> {
        (**self).asset_catalog()
    }
}

#[derive(Debug, Default)]
struct State {
    portfolios: BTreeMap<AssetId, PortfolioNode>,
    groups: BTreeMap<AssetId, GroupLink>,
    units: BTreeMap<AssetId, UnitLink>,
    modules: Vec<Module>,
    profiles: HashMap<AccessProfileId, AccessProfile>,
    holdings: Vec<UserAssetAssignment>,
    grants: Vec<(UserId, AssetKey, AccessProfileId)>,
}

impl State {
    fn asset_name(&self, key: &AssetKey) -> Option<&str> {
        match key.asset_type {
            AssetType::Portfolio => self.portfolios.get(&key.id).map(|p| p.name.as_str()),
            AssetType::RegulationGroup => self.groups.get(&key.id).map(|g| g.name.as_str()),
            AssetType::RegulationUnit => self.units.get(&key.id).map(|u| u.name.as_str()),
        }
    }

    fn ensure_asset(&self, key: &AssetKey) -> DomainResult<()> {
        self.asset_name(key)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("asset {key}")))
    }
}

fn ensure_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn ensure_label<E: Entity>(entity: &E) -> DomainResult<()> {
    ensure_name(entity.label())
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    inner: RwLock<State>,
}

impl InMemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| DomainError::unavailable("access store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| DomainError::unavailable("access store lock poisoned"))
    }

    pub fn add_portfolio(&self, id: AssetId, name: impl Into<String>) -> DomainResult<AssetKey> {
        let name = name.into();
        ensure_name(&name)?;
        let mut state = self.write()?;
        state.portfolios.insert(id, PortfolioNode { id, name });
        Ok(AssetKey::portfolio(id))
    }

    pub fn add_group(
        &self,
        id: AssetId,
        portfolio_id: Option<AssetId>,
        name: impl Into<String>,
    ) -> DomainResult<AssetKey> {
        let name = name.into();
        ensure_name(&name)?;
        let mut state = self.write()?;
        if let Some(p) = portfolio_id {
            state.ensure_asset(&AssetKey::portfolio(p))?;
        }
        state.groups.insert(
            id,
            GroupLink {
                id,
                portfolio_id,
                name,
            },
        );
        Ok(AssetKey::group(id))
    }

    pub fn add_unit(
        &self,
        id: AssetId,
        group_id: Option<AssetId>,
        name: impl Into<String>,
    ) -> DomainResult<AssetKey> {
        let name = name.into();
        ensure_name(&name)?;
        let mut state = self.write()?;
        if let Some(g) = group_id {
            state.ensure_asset(&AssetKey::group(g))?;
        }
        state.units.insert(id, UnitLink { id, group_id, name });
        Ok(AssetKey::unit(id))
    }

    /// Register a module. Slugs are unique and nesting is one level deep.
    pub fn add_module(&self, module: Module) -> DomainResult<ModuleId> {
        ensure_label(&module)?;
        if module.slug.trim().is_empty() {
            return Err(DomainError::validation("module slug cannot be empty"));
        }
        let mut state = self.write()?;
        if state.modules.iter().any(|m| m.slug == module.slug) {
            return Err(DomainError::invariant(format!(
                "module slug '{}' already exists",
                module.slug
            )));
        }
        if let Some(parent_id) = module.parent_id {
            let parent = state
                .modules
                .iter()
                .find(|m| m.id == parent_id)
                .ok_or_else(|| DomainError::not_found(format!("parent module {parent_id}")))?;
            if parent.parent_id.is_some() {
                return Err(DomainError::invariant(
                    "modules can only be nested one level deep",
                ));
            }
        }
        let id = module.id;
        state.modules.push(module);
        Ok(id)
    }

    /// Insert or replace a profile definition. Existing grants see the new definition.
    pub fn put_profile(&self, profile: AccessProfile) -> DomainResult<AccessProfileId> {
        ensure_label(&profile)?;
        let mut state = self.write()?;
        let id = profile.id;
        state.profiles.insert(id, profile);
        Ok(id)
    }

    pub fn assign_asset(&self, user_id: UserId, asset: AssetKey) -> DomainResult<()> {
        let mut state = self.write()?;
        state.ensure_asset(&asset)?;
        let assignment = UserAssetAssignment { user_id, asset };
        if !state.holdings.contains(&assignment) {
            state.holdings.push(assignment);
        }
        Ok(())
    }

    pub fn unassign_asset(&self, user_id: UserId, asset: AssetKey) -> DomainResult<()> {
        let mut state = self.write()?;
        state.holdings.retain(|h| !(h.user_id == user_id && h.asset == asset));
        Ok(())
    }

    pub fn grant_profile(
        &self,
        user_id: UserId,
        profile_id: AccessProfileId,
        asset: AssetKey,
    ) -> DomainResult<()> {
        let mut state = self.write()?;
        state.ensure_asset(&asset)?;
        if !state.profiles.contains_key(&profile_id) {
            return Err(DomainError::not_found(format!("access profile {profile_id}")));
        }
        let row = (user_id, asset, profile_id);
        if !state.grants.contains(&row) {
            state.grants.push(row);
        }
        Ok(())
    }

    pub fn revoke_profile(
        &self,
        user_id: UserId,
        profile_id: AccessProfileId,
        asset: AssetKey,
    ) -> DomainResult<()> {
        let mut state = self.write()?;
        state.grants.retain(|g| *g != (user_id, asset, profile_id));
        Ok(())
    }
}

impl AccessStore for InMemoryAccessStore {
    fn user_held_assets(&self, user_id: UserId) -> DomainResult<Vec<AssetRef>> {
        let state = self.read()?;
        Ok(state
            .holdings
            .iter()
            .filter(|h| h.user_id == user_id)
            .filter_map(|h| state.asset_name(&h.asset).map(|name| AssetRef::new(h.asset, name)))
            .collect())
    }

    fn direct_access_profile_grants(
        &self,
        user_id: UserId,
        assets: &[AssetKey],
    ) -> DomainResult<Vec<UserAccessProfileGrant>> {
        let state = self.read()?;
        let wanted: BTreeSet<&AssetKey> = assets.iter().collect();
        Ok(state
            .grants
            .iter()
            .filter(|(u, asset, _)| *u == user_id && wanted.contains(asset))
            .filter_map(|(u, asset, profile_id)| {
                state.profiles.get(profile_id).map(|profile| UserAccessProfileGrant {
                    user_id: *u,
                    asset: *asset,
                    access_profile: profile.clone(),
                })
            })
            .collect())
    }

    fn hierarchy_edges(
        &self,
        group_ids: &[AssetId],
        unit_ids: &[AssetId],
    ) -> DomainResult<HierarchySnapshot> {
        let state = self.read()?;

        let units: Vec<UnitLink> = unit_ids
            .iter()
            .filter_map(|id| state.units.get(id).cloned())
            .collect();

        let mut group_set: BTreeSet<AssetId> = group_ids.iter().copied().collect();
        group_set.extend(units.iter().filter_map(|u| u.group_id));
        let groups: Vec<GroupLink> = group_set
            .iter()
            .filter_map(|id| state.groups.get(id).cloned())
            .collect();

        let portfolio_set: BTreeSet<AssetId> = groups.iter().filter_map(|g| g.portfolio_id).collect();
        let portfolios = portfolio_set
            .iter()
            .filter_map(|id| state.portfolios.get(id).cloned())
            .collect();

        Ok(HierarchySnapshot {
            portfolios,
            groups,
            units,
        })
    }

    fn all_modules(&self) -> DomainResult<Vec<Module>> {
        Ok(self.read()?.modules.clone())
    }

    fn asset_catalog(&self) -> DomainResult<Vec<AssetRef>> {
        let state = self.read()?;
        let portfolios = state
            .portfolios
            .values()
            .map(|p| AssetRef::new(AssetKey::portfolio(p.id), p.name.clone()));
        let groups = state
            .groups
            .values()
            .map(|g| AssetRef::new(AssetKey::group(g.id), g.name.clone()));
        let units = state
            .units
            .values()
            .map(|u| AssetRef::new(AssetKey::unit(u.id), u.name.clone()));
        Ok(portfolios.chain(groups).chain(units).collect())
    }
}
