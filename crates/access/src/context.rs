use serde::{Deserialize, Serialize};

use regula_core::UserId;

use crate::Role;

/// Who access is being resolved for.
///
/// Built per request by the caller and passed into every resolution call;
/// there is no process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessContext {
    user_id: UserId,
    role: Option<Role>,
}

impl AccessContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_super_admin)
    }
}
