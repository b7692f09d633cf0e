//! Permission-gated modules and their navigation layout.

use serde::{Deserialize, Serialize};

use regula_core::{Entity, ModuleId};

use crate::PermissionType;

/// A navigable feature area.
///
/// Modules nest at most one level: a module with a `parent_id` is a child of a
/// top-level module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<ModuleId>,
}

impl Module {
    pub fn new(id: ModuleId, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: ModuleId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

impl Entity for Module {
    type Id = ModuleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// User-global access decision for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccess {
    pub id: ModuleId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<ModuleId>,
    pub has_access: bool,
    /// Effective permission. `View` when `has_access` is false.
    pub permission: PermissionType,
}

impl ModuleAccess {
    pub(crate) fn from_module(module: &Module, permission: Option<PermissionType>) -> Self {
        Self {
            id: module.id,
            name: module.name.clone(),
            slug: module.slug.clone(),
            parent_id: module.parent_id,
            has_access: permission.is_some(),
            permission: permission.unwrap_or(PermissionType::View),
        }
    }
}

/// One top-level entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    pub module: ModuleAccess,
    pub children: Vec<ModuleAccess>,
}

/// Group module decisions into a one-level navigation tree.
///
/// A top-level module is listed when it, or at least one of its children, is
/// accessible; only accessible children are listed. Children whose parent is
/// not among `modules` are dropped. Input order is preserved.
pub fn navigation(modules: &[ModuleAccess]) -> Vec<NavigationEntry> {
    modules
        .iter()
        .filter(|m| m.parent_id.is_none())
        .filter_map(|top| {
            let children: Vec<ModuleAccess> = modules
                .iter()
                .filter(|c| c.parent_id == Some(top.id) && c.has_access)
                .cloned()
                .collect();

            if top.has_access || !children.is_empty() {
                Some(NavigationEntry {
                    module: top.clone(),
                    children,
                })
            } else {
                None
            }
        })
        .collect()
}
