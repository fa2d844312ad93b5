//! Access vocabulary shared by the permission engine and its callers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the current user with respect to one content instance.
///
/// Roles form a small lattice: `owner > admin > user > {external, email,
/// contact} > none`. The three guest roles are incomparable with each other
/// and share one rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    User,
    External,
    Email,
    Contact,
    #[default]
    None,
}

impl Role {
    /// Position in the role lattice; higher is stronger.
    pub fn rank(self) -> u8 {
        match self {
            Role::Owner => 4,
            Role::Admin => 3,
            Role::User => 2,
            Role::External | Role::Email | Role::Contact => 1,
            Role::None => 0,
        }
    }

    /// The stronger of two roles. Ties keep `self`.
    pub fn max(self, other: Role) -> Role {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::User => "user",
            Role::External => "external",
            Role::Email => "email",
            Role::Contact => "contact",
            Role::None => "none",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived permission on a content instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Edit,
    Access,
    AddChild,
    ShowResults,
    Support,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::Edit,
        Permission::Access,
        Permission::AddChild,
        Permission::ShowResults,
        Permission::Support,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Edit => "edit",
            Permission::Access => "access",
            Permission::AddChild => "add_child",
            Permission::ShowResults => "show_results",
            Permission::Support => "support",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a share grant was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    /// Anonymous public link
    Public,
    /// Named platform user
    User,
    /// Delegated administrator
    Admin,
    /// Member of a shared group
    Group,
    /// Registered guest who arrived through a public link
    External,
    /// Invited by e-mail address
    Email,
    /// Invited from the address book
    Contact,
}

impl ShareType {
    /// The undemoted role a share of this type grants.
    pub fn granted_role(self) -> Role {
        match self {
            ShareType::Public => Role::None,
            ShareType::User | ShareType::Group => Role::User,
            ShareType::Admin => Role::Admin,
            ShareType::External => Role::External,
            ShareType::Email => Role::Email,
            ShareType::Contact => Role::Contact,
        }
    }
}

/// Visibility of a content instance to logged-in users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Any logged-in user may access
    Open,
    /// Only owner and share holders
    #[default]
    Private,
}

/// When results are visible to non-editors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShowResults {
    #[default]
    Always,
    /// Only once the instance has expired
    Closed,
    Never,
}
