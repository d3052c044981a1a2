//! Wire-stable role and group-type vocabulary.
//!
//! These strings are stored on graph nodes and membership edges, so the
//! snake_case spellings here must never change.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Platform-wide role carried by an authenticated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Moderator => write!(f, "moderator"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(UserRole::User),
            "moderator" => Ok(UserRole::Moderator),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Role carried by a membership edge between a user and a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Pending,
    Usual,
    Admin,
    Owner,
}

impl GroupRole {
    /// The property value written to the membership edge.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Pending => "pending",
            GroupRole::Usual => "usual",
            GroupRole::Admin => "admin",
            GroupRole::Owner => "owner",
        }
    }

    /// Roles that grant access to member-only group content.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, GroupRole::Pending)
    }
}

impl std::fmt::Display for GroupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GroupRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(GroupRole::Pending),
            "usual" => Ok(GroupRole::Usual),
            "admin" => Ok(GroupRole::Admin),
            "owner" => Ok(GroupRole::Owner),
            _ => Err(anyhow::anyhow!("Invalid group role: {}", s)),
        }
    }
}

/// Visibility class of a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Public,
    Closed,
    Hidden,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Public => "public",
            GroupType::Closed => "closed",
            GroupType::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for GroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GroupType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(GroupType::Public),
            "closed" => Ok(GroupType::Closed),
            "hidden" => Ok(GroupType::Hidden),
            _ => Err(anyhow::anyhow!("Invalid group type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_role_round_trips() {
        for role in ["pending", "usual", "admin", "owner"] {
            let parsed: GroupRole = role.parse().unwrap();
            assert_eq!(parsed.to_string(), role);
        }
        assert!("superuser".parse::<GroupRole>().is_err());
    }

    #[test]
    fn group_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(GroupType::Hidden).unwrap(),
            serde_json::json!("hidden")
        );
    }

    #[test]
    fn pending_is_not_accepted() {
        assert!(!GroupRole::Pending.is_accepted());
        assert!(GroupRole::Usual.is_accepted());
        assert!(GroupRole::Owner.is_accepted());
    }
}
