use serde::Serialize;

use regula_core::UserId;

use crate::{AccessError, AssetKey, AssetSource, PermissionType, UserAccessData};

/// Check that the user holds at least `required` on the module with `module_slug`.
///
/// - No IO
/// - No panics
///
/// Returns the effective permission on success.
pub fn require_module_permission(
    access: &UserAccessData,
    module_slug: &str,
    required: PermissionType,
) -> Result<PermissionType, AccessError> {
    let module = access
        .module(module_slug)
        .ok_or_else(|| AccessError::UnknownModule(module_slug.to_string()))?;

    if module.has_access && module.permission.satisfies(required) {
        Ok(module.permission)
    } else {
        Err(AccessError::Forbidden {
            module: module_slug.to_string(),
            required,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a user does or does not have access to a module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleAccessExplanation {
    pub user_id: UserId,
    pub module_slug: String,
    pub granted: bool,
    pub permission: Option<PermissionType>,
    /// Human-readable reason for the decision.
    pub reason: String,
    /// Every grant that contributed to the decision, in asset/profile order.
    pub contributions: Vec<GrantContribution>,
    pub denial_reason: Option<DenialReason>,
}

/// One `(asset, profile)` pair that grants the module.
#[derive(Debug, Clone, Serialize)]
pub struct GrantContribution {
    pub asset: AssetKey,
    pub asset_name: String,
    pub profile_name: String,
    /// Ancestor the profile was inherited from; `None` for direct grants.
    pub inherited_from: Option<AssetSource>,
    pub permission: PermissionType,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    UnknownModule,
    NoGrant,
}

/// Explain the access decision for `module_slug`.
///
/// Answers "which asset and which profile gave this user access?", including
/// inherited grants and their originating ancestor.
pub fn explain_module_access(access: &UserAccessData, module_slug: &str) -> ModuleAccessExplanation {
    let Some(module) = access.module(module_slug) else {
        return ModuleAccessExplanation {
            user_id: access.user_id,
            module_slug: module_slug.to_string(),
            granted: false,
            permission: None,
            reason: format!("Module '{}' is not in the module catalog", module_slug),
            contributions: Vec::new(),
            denial_reason: Some(DenialReason {
                kind: DenialKind::UnknownModule,
                message: format!("Unknown module: '{}'", module_slug),
                suggestions: vec!["Check the module slug against the module catalog".to_string()],
            }),
        };
    };

    let module_id = module.id;
    let contributions: Vec<GrantContribution> = access
        .asset_access
        .iter()
        .flat_map(|asset| {
            asset.access_profiles.iter().flat_map(move |profile| {
                profile
                    .permissions
                    .iter()
                    .filter(move |g| g.module_id == module_id)
                    .map(move |g| GrantContribution {
                        asset: asset.key(),
                        asset_name: asset.asset.name.clone(),
                        profile_name: profile.name.clone(),
                        inherited_from: profile.source.clone(),
                        permission: g.permission,
                    })
            })
        })
        .collect();

    if access.is_super_admin {
        return ModuleAccessExplanation {
            user_id: access.user_id,
            module_slug: module_slug.to_string(),
            granted: true,
            permission: Some(PermissionType::Manage),
            reason: "User has the SUPER_ADMIN role (all modules granted with MANAGE)".to_string(),
            contributions,
            denial_reason: None,
        };
    }

    if module.has_access {
        let reason = format!(
            "{} grant(s) on {} asset(s) give '{}'; highest permission {}",
            contributions.len(),
            distinct_assets(&contributions),
            module_slug,
            module.permission
        );
        ModuleAccessExplanation {
            user_id: access.user_id,
            module_slug: module_slug.to_string(),
            granted: true,
            permission: Some(module.permission),
            reason,
            contributions,
            denial_reason: None,
        }
    } else {
        ModuleAccessExplanation {
            user_id: access.user_id,
            module_slug: module_slug.to_string(),
            granted: false,
            permission: None,
            reason: format!(
                "No access profile on the user's {} asset(s) grants '{}'",
                access.asset_access.len(),
                module_slug
            ),
            contributions,
            denial_reason: Some(DenialReason {
                kind: DenialKind::NoGrant,
                message: format!("Missing grant for module: '{}'", module_slug),
                suggestions: vec![
                    format!("Grant a profile that includes '{}' on an asset the user holds", module_slug),
                    "Grant the profile on an ancestor portfolio or group to cover all descendants"
                        .to_string(),
                ],
            }),
        }
    }
}

fn distinct_assets(contributions: &[GrantContribution]) -> usize {
    let mut keys: Vec<AssetKey> = contributions.iter().map(|c| c.asset).collect();
    keys.sort();
    keys.dedup();
    keys.len()
}
