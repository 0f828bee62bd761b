//! Author trust policy

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// GitHub collaborator permission on a repository, ordered by privilege.
///
/// `None` stands for "not a collaborator".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    None,
    Read,
    Triage,
    Write,
    Maintain,
    Admin,
}

impl PermissionLevel {
    /// Parse GitHub's `RepositoryPermission` value.
    ///
    /// Unknown values map to `None` so that a new permission name can never
    /// widen trust by accident.
    pub fn from_github(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "READ" => PermissionLevel::Read,
            "TRIAGE" => PermissionLevel::Triage,
            "WRITE" => PermissionLevel::Write,
            "MAINTAIN" => PermissionLevel::Maintain,
            "ADMIN" => PermissionLevel::Admin,
            "" | "NONE" => PermissionLevel::None,
            other => {
                warn!(permission = other, "Unknown collaborator permission");
                PermissionLevel::None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::None => "NONE",
            PermissionLevel::Read => "READ",
            PermissionLevel::Triage => "TRIAGE",
            PermissionLevel::Write => "WRITE",
            PermissionLevel::Maintain => "MAINTAIN",
            PermissionLevel::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether content authored by a user with `permission` may be shown verbatim.
///
/// Private repositories only admit vetted collaborators, so everything there
/// is trusted. On public repositories the author needs push access.
pub fn is_safe(is_private: bool, permission: PermissionLevel) -> bool {
    is_private || permission >= PermissionLevel::Write
}
