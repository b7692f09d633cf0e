use thiserror::Error;

use regula_core::DomainError;

use crate::{AssetKey, PermissionType};

/// Failure of access resolution or of an access check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The hierarchy walk revisited an asset. Source data is corrupt.
    #[error("asset hierarchy contains a cycle through {asset}")]
    HierarchyCycle { asset: AssetKey },

    /// The hierarchy walk exceeded the configured depth cap.
    #[error("asset hierarchy above {asset} is deeper than {max_depth} levels")]
    HierarchyDepthExceeded { asset: AssetKey, max_depth: usize },

    #[error("unknown module '{0}'")]
    UnknownModule(String),

    #[error("forbidden: module '{module}' requires {required}")]
    Forbidden {
        module: String,
        required: PermissionType,
    },

    #[error(transparent)]
    Store(#[from] DomainError),
}

pub type AccessResult<T> = Result<T, AccessError>;
