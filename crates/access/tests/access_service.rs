use std::sync::Arc;

use regula_access::{
    AccessConfig, AccessContext, AccessError, AccessProfile, AccessService, AccessStore, AssetKey,
    AssetRef, AssetType, HierarchySnapshot, InMemoryAccessStore, Module, ModuleAssets,
    PermissionType, Role, UserAccessProfileGrant, navigation,
};
use regula_core::{AccessProfileId, AssetId, DomainError, DomainResult, ModuleId, UserId};

/// Portfolio P1 → Group G1 → Unit U1, plus a sibling unit U2 under G1.
struct World {
    store: Arc<InMemoryAccessStore>,
    p1: AssetKey,
    g1: AssetKey,
    u1: AssetKey,
    u2: AssetKey,
    m1: Module,
    m2: Module,
}

fn world() -> World {
    regula_observability::init();

    let store = Arc::new(InMemoryAccessStore::new());
    let (p, g, u1, u2) = (AssetId::new(), AssetId::new(), AssetId::new(), AssetId::new());
    let p1 = store.add_portfolio(p, "Retail Banking").unwrap();
    let g1 = store.add_group(g, Some(p), "Consumer Credit").unwrap();
    let u1 = store.add_unit(u1, Some(g), "Mortgages").unwrap();
    let u2 = store.add_unit(u2, Some(g), "Cards").unwrap();

    let m1 = Module::new(ModuleId::new(), "Obligations", "obligations");
    let m2 = Module::new(ModuleId::new(), "Controls", "controls");
    store.add_module(m1.clone()).unwrap();
    store.add_module(m2.clone()).unwrap();

    World {
        store,
        p1,
        g1,
        u1,
        u2,
        m1,
        m2,
    }
}

fn profile(store: &InMemoryAccessStore, name: &str, grants: &[(ModuleId, PermissionType)]) -> AccessProfileId {
    let mut profile = AccessProfile::new(AccessProfileId::new(), name);
    for (module, permission) in grants {
        profile = profile.grant(*module, *permission);
    }
    store.put_profile(profile).unwrap()
}

#[test]
fn portfolio_grant_is_inherited_by_unit_through_unheld_group() {
    let w = world();
    let user = UserId::new();
    w.store.assign_asset(user, w.p1).unwrap();
    w.store.assign_asset(user, w.u1).unwrap();
    let viewer = profile(&w.store, "Viewer", &[(w.m1.id, PermissionType::View)]);
    w.store.grant_profile(user, viewer, w.p1).unwrap();

    let service = AccessService::new(w.store.clone());
    let resolved = service.resolved_profiles(user).unwrap();

    let at_unit = &resolved[&w.u1];
    assert_eq!(at_unit.len(), 1);
    assert_eq!(at_unit[0].profile.name, "Viewer");
    let source = at_unit[0].source.as_ref().unwrap();
    assert_eq!(source.asset_type, AssetType::Portfolio);
    assert_eq!(source.key(), w.p1);
    assert_eq!(source.name.as_deref(), Some("Retail Banking"));
    assert!(!resolved.contains_key(&w.g1));

    let access = service.resolve(&AccessContext::new(user)).unwrap();
    let m1 = access.module("obligations").unwrap();
    assert!(m1.has_access);
    assert_eq!(m1.permission, PermissionType::View);
    assert!(!access.module("controls").unwrap().has_access);
}

#[test]
fn grant_on_unheld_ancestor_still_flows_down() {
    let w = world();
    let user = UserId::new();
    w.store.assign_asset(user, w.u1).unwrap();
    let editor = profile(&w.store, "Editor", &[(w.m2.id, PermissionType::Manage)]);
    w.store.grant_profile(user, editor, w.g1).unwrap();

    let service = AccessService::new(w.store.clone());
    let resolved = service.resolved_profiles(user).unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[&w.u1][0].source.as_ref().map(|s| s.key()), Some(w.g1));
}

#[test]
fn unit_grant_does_not_reach_parent_or_sibling() {
    let w = world();
    let user = UserId::new();
    for key in [w.p1, w.g1, w.u1, w.u2] {
        w.store.assign_asset(user, key).unwrap();
    }
    let local = profile(&w.store, "Local", &[(w.m1.id, PermissionType::Manage)]);
    w.store.grant_profile(user, local, w.u1).unwrap();

    let service = AccessService::new(w.store.clone());
    let resolved = service.resolved_profiles(user).unwrap();

    assert_eq!(resolved[&w.u1].len(), 1);
    assert!(resolved[&w.u2].is_empty());
    assert!(resolved[&w.g1].is_empty());
    assert!(resolved[&w.p1].is_empty());
}

#[test]
fn module_scoped_assets_distinguish_forbidden_from_empty() {
    let w = world();
    let user = UserId::new();
    w.store.assign_asset(user, w.u1).unwrap();
    w.store.assign_asset(user, w.u2).unwrap();
    let viewer = profile(&w.store, "Viewer", &[(w.m1.id, PermissionType::View)]);
    w.store.grant_profile(user, viewer, w.u1).unwrap();

    let service = AccessService::new(w.store.clone());
    let ctx = AccessContext::new(user);

    let visible = service.assets_for_module(&ctx, "obligations").unwrap().unwrap();
    assert_eq!(visible.len(), 1);
    match visible {
        ModuleAssets::Scoped(assets) => {
            assert_eq!(assets.len(), 1);
            assert_eq!(assets[0].key(), w.u1);
            assert_eq!(assets[0].asset.name, "Mortgages");
        }
        other => panic!("expected scoped assets, got {other:?}"),
    }
    assert_eq!(service.assets_for_module(&ctx, "controls").unwrap(), None);
}

#[test]
fn super_admin_sees_everything_without_grants() {
    let w = world();
    let admin = AccessContext::new(UserId::new()).with_role(Role::super_admin());
    let service = AccessService::new(w.store.clone());

    let access = service.resolve(&admin).unwrap();
    assert!(access
        .module_access
        .iter()
        .all(|m| m.has_access && m.permission == PermissionType::Manage));

    let visible = service.assets_for_module(&admin, "controls").unwrap().unwrap();
    assert_eq!(visible.len(), 4);
    assert!(!visible.is_empty());
    match visible {
        ModuleAssets::Catalog(assets) => assert!(assets.iter().any(|a| a.key == w.u2)),
        other => panic!("expected full catalog, got {other:?}"),
    }
    assert_eq!(service.assets_for_module(&admin, "unknown").unwrap(), None);
}

#[test]
fn strongest_grant_across_assets_wins() {
    let w = world();
    let user = UserId::new();
    w.store.assign_asset(user, w.u1).unwrap();
    w.store.assign_asset(user, w.u2).unwrap();
    let viewer = profile(&w.store, "Viewer", &[(w.m1.id, PermissionType::View)]);
    let custom = profile(&w.store, "Custom", &[(w.m1.id, PermissionType::Custom)]);
    let manager = profile(&w.store, "Manager", &[(w.m1.id, PermissionType::Manage)]);
    w.store.grant_profile(user, viewer, w.u1).unwrap();
    w.store.grant_profile(user, custom, w.u2).unwrap();

    let service = AccessService::new(w.store.clone());
    let ctx = AccessContext::new(user);
    assert_eq!(
        service.require(&ctx, "obligations", PermissionType::View).unwrap(),
        PermissionType::Custom
    );
    assert!(matches!(
        service.require(&ctx, "obligations", PermissionType::Manage),
        Err(AccessError::Forbidden { .. })
    ));

    w.store.grant_profile(user, manager, w.p1).unwrap();
    // P1 is not held, but U1 inherits from it.
    assert_eq!(
        service.require(&ctx, "obligations", PermissionType::Manage).unwrap(),
        PermissionType::Manage
    );
}

#[test]
fn same_service_serves_any_user() {
    let w = world();
    let (alice, bob) = (UserId::new(), UserId::new());
    w.store.assign_asset(alice, w.u1).unwrap();
    w.store.assign_asset(bob, w.u1).unwrap();
    let viewer = profile(&w.store, "Viewer", &[(w.m1.id, PermissionType::View)]);
    w.store.grant_profile(alice, viewer, w.g1).unwrap();

    let service = AccessService::new(w.store.clone());
    let alice_access = service.resolve(&AccessContext::new(alice)).unwrap();
    let bob_access = service.resolve(&AccessContext::new(bob)).unwrap();

    assert!(alice_access.module("obligations").unwrap().has_access);
    assert!(!bob_access.module("obligations").unwrap().has_access);
}

#[test]
fn explanation_and_navigation_reflect_resolution() {
    let w = world();
    let user = UserId::new();
    let child = Module::new(ModuleId::new(), "Evidence", "evidence").with_parent(w.m2.id);
    w.store.add_module(child.clone()).unwrap();
    w.store.assign_asset(user, w.u1).unwrap();
    let collector = profile(&w.store, "Collector", &[(child.id, PermissionType::Manage)]);
    w.store.grant_profile(user, collector, w.p1).unwrap();

    let service = AccessService::new(w.store.clone());
    let ctx = AccessContext::new(user);

    let explanation = service.explain(&ctx, "evidence").unwrap();
    assert!(explanation.granted);
    assert_eq!(explanation.contributions.len(), 1);
    assert_eq!(
        explanation.contributions[0].inherited_from.as_ref().map(|s| s.key()),
        Some(w.p1)
    );

    let access = service.resolve(&ctx).unwrap();
    let nav = navigation(&access.module_access);
    assert_eq!(nav.len(), 1);
    assert_eq!(nav[0].module.slug, "controls");
    assert_eq!(nav[0].children[0].slug, "evidence");
}

#[test]
fn store_sees_profile_edits_on_next_resolution() {
    let w = world();
    let user = UserId::new();
    w.store.assign_asset(user, w.u1).unwrap();
    let id = profile(&w.store, "Viewer", &[(w.m1.id, PermissionType::View)]);
    w.store.grant_profile(user, id, w.u1).unwrap();

    let service = AccessService::new(w.store.clone());
    let ctx = AccessContext::new(user);
    assert!(!service.resolve(&ctx).unwrap().module("controls").unwrap().has_access);

    let edited = AccessProfile::new(id, "Viewer")
        .grant(w.m1.id, PermissionType::View)
        .grant(w.m2.id, PermissionType::View);
    w.store.put_profile(edited).unwrap();

    assert!(service.resolve(&ctx).unwrap().module("controls").unwrap().has_access);
    assert_eq!(w.store.all_modules().unwrap().len(), 2);
}

#[test]
fn hierarchy_deeper_than_configured_cap_is_rejected() {
    let w = world();
    let user = UserId::new();
    w.store.assign_asset(user, w.u1).unwrap();
    w.store.assign_asset(user, w.g1).unwrap();

    let shallow = AccessService::with_config(
        w.store.clone(),
        AccessConfig {
            max_inheritance_depth: 1,
        },
    );

    // U1 -> G1 -> P1 needs two hops.
    match shallow.resolve(&AccessContext::new(user)) {
        Err(AccessError::HierarchyDepthExceeded { asset, max_depth }) => {
            assert_eq!(asset, w.u1);
            assert_eq!(max_depth, 1);
        }
        other => panic!("expected depth error, got {other:?}"),
    }
    assert!(matches!(
        shallow.resolved_profiles(user),
        Err(AccessError::HierarchyDepthExceeded { .. })
    ));

    // A group alone stays within the cap.
    w.store.unassign_asset(user, w.u1).unwrap();
    assert!(shallow.resolve(&AccessContext::new(user)).is_ok());
}

/// Store whose hierarchy lookup is unavailable.
struct BrokenHierarchyStore {
    held: AssetRef,
}

impl AccessStore for BrokenHierarchyStore {
    fn user_held_assets(&self, _user_id: UserId) -> DomainResult<Vec<AssetRef>> {
        Ok(vec![self.held.clone()])
    }

    fn direct_access_profile_grants(
        &self,
        _user_id: UserId,
        _assets: &[AssetKey],
    ) -> DomainResult<Vec<UserAccessProfileGrant>> {
        Ok(Vec::new())
    }

    fn hierarchy_edges(
        &self,
        _group_ids: &[AssetId],
        _unit_ids: &[AssetId],
    ) -> DomainResult<HierarchySnapshot> {
        Err(DomainError::unavailable("hierarchy table offline"))
    }

    fn all_modules(&self) -> DomainResult<Vec<Module>> {
        Ok(Vec::new())
    }

    fn asset_catalog(&self) -> DomainResult<Vec<AssetRef>> {
        Ok(vec![self.held.clone()])
    }
}

#[test]
fn store_failure_propagates_as_store_error() {
    let service = AccessService::new(BrokenHierarchyStore {
        held: AssetRef::new(AssetKey::unit(AssetId::new()), "Mortgages"),
    });

    let err = service.resolve(&AccessContext::new(UserId::new())).unwrap_err();
    assert_eq!(
        err,
        AccessError::Store(DomainError::unavailable("hierarchy table offline"))
    );
}
