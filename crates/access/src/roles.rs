use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name attached to a user's session.
///
/// Roles are opaque strings at this layer. The only role the engine interprets
/// is [`Role::SUPER_ADMIN`], which bypasses per-module grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const SUPER_ADMIN: &'static str = "SUPER_ADMIN";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn super_admin() -> Self {
        Self(Cow::Borrowed(Self::SUPER_ADMIN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_super_admin(&self) -> bool {
        self.as_str() == Self::SUPER_ADMIN
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
