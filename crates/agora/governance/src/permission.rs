//! Permission engine
//!
//! Derives the current user's role on one inquiry or option and the
//! permissions that follow from it. All facts arrive explicitly through a
//! [`PermissionSubject`] and an [`AccessContext`]; nothing is looked up
//! ambiently and nothing is cached between calls.
//!
//! Two roles are tracked. The raw role keeps `admin` and drives edit
//! rights. The display role collapses `admin` into `user`, so delegated
//! moderators appear as ordinary participants.

use agora_types::{
    AccessMode, AgoraError, AgoraResult, GroupId, InstanceId, Permission, Role, ShareType,
    ShowResults, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// The inquiry or option being evaluated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PermissionSubject {
    pub instance_id: InstanceId,
    pub owner: UserId,
    /// Groups the subject belongs to; their admins are delegated admins.
    pub owner_groups: BTreeSet<GroupId>,
    pub access: AccessMode,
    pub deleted: bool,
    pub archived: bool,
    pub expire: Option<DateTime<Utc>>,
    pub show_results: ShowResults,
    /// Share tokens issued for this subject that are still valid.
    pub share_tokens: BTreeSet<String>,
}

impl PermissionSubject {
    pub fn new(instance_id: InstanceId, owner: UserId) -> Self {
        Self {
            instance_id,
            owner,
            owner_groups: BTreeSet::new(),
            access: AccessMode::default(),
            deleted: false,
            archived: false,
            expire: None,
            show_results: ShowResults::default(),
            share_tokens: BTreeSet::new(),
        }
    }

    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    pub fn with_owner_group(mut self, group: GroupId) -> Self {
        self.owner_groups.insert(group);
        self
    }

    pub fn with_share_token(mut self, token: impl Into<String>) -> Self {
        self.share_tokens.insert(token.into());
        self
    }

    pub fn with_show_results(mut self, show_results: ShowResults) -> Self {
        self.show_results = show_results;
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expire = Some(at);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }
}

/// A share presented by the current visitor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGrant {
    pub token: String,
    pub share_type: ShareType,
}

/// One of the current user's group memberships.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group: GroupId,
    pub is_admin: bool,
}

/// Who is asking, and when.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessContext {
    /// `None` for anonymous visitors
    pub user: Option<UserId>,
    pub share: Option<ShareGrant>,
    pub memberships: Vec<GroupMembership>,
    pub now: DateTime<Utc>,
}

impl AccessContext {
    pub fn anonymous(now: DateTime<Utc>) -> Self {
        Self {
            user: None,
            share: None,
            memberships: Vec::new(),
            now,
        }
    }

    pub fn logged_in(user: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user: Some(user),
            ..Self::anonymous(now)
        }
    }

    pub fn with_share(mut self, token: impl Into<String>, share_type: ShareType) -> Self {
        self.share = Some(ShareGrant {
            token: token.into(),
            share_type,
        });
        self
    }

    pub fn with_membership(mut self, group: GroupId, is_admin: bool) -> Self {
        self.memberships.push(GroupMembership { group, is_admin });
        self
    }
}

/// Derived, non-persisted view of a user's standing on a subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    pub role: Role,
    pub permissions: BTreeMap<Permission, bool>,
}

impl PermissionSnapshot {
    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.get(&permission).copied().unwrap_or(false)
    }
}

/// Evaluates permissions for one subject and one context.
pub struct PermissionEngine<'a> {
    subject: &'a PermissionSubject,
    context: &'a AccessContext,
}

impl<'a> PermissionEngine<'a> {
    pub fn new(subject: &'a PermissionSubject, context: &'a AccessContext) -> Self {
        Self { subject, context }
    }

    /// Identity match against the stored owner. Shares never confer ownership.
    pub fn is_owner(&self) -> bool {
        self.context.user.as_ref() == Some(&self.subject.owner)
    }

    /// The presented share, if its token is valid for this subject.
    pub fn matching_share(&self) -> Option<&'a ShareGrant> {
        self.context
            .share
            .as_ref()
            .filter(|share| self.subject.share_tokens.contains(&share.token))
    }

    pub fn share_type(&self) -> Option<ShareType> {
        self.matching_share().map(|share| share.share_type)
    }

    pub fn has_matching_share_token(&self) -> bool {
        self.matching_share().is_some()
    }

    pub fn is_open_and_logged_in(&self) -> bool {
        self.subject.access == AccessMode::Open && self.context.user.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.subject
            .expire
            .is_some_and(|expire| expire <= self.context.now)
    }

    fn is_public_share(&self) -> bool {
        self.share_type() == Some(ShareType::Public)
    }

    /// Strongest applicable role, before the admin collapse.
    pub fn raw_role(&self) -> Role {
        if self.is_owner() {
            return Role::Owner;
        }

        let mut role = self
            .share_type()
            .map(ShareType::granted_role)
            .unwrap_or_default();

        for membership in &self.context.memberships {
            if self.subject.owner_groups.contains(&membership.group) {
                let granted = if membership.is_admin {
                    Role::Admin
                } else {
                    Role::User
                };
                role = role.max(granted);
            }
        }

        if self.is_open_and_logged_in() {
            role = role.max(Role::User);
        }
        role
    }

    /// Role for display. Delegated admins show as `user`.
    pub fn role(&self) -> Role {
        match self.raw_role() {
            Role::Admin => Role::User,
            role => role,
        }
    }

    pub fn is_delegated_admin(&self) -> bool {
        self.raw_role() == Role::Admin
    }

    pub fn allow_edit(&self) -> bool {
        self.is_owner() || self.is_delegated_admin()
    }

    pub fn allow_access(&self) -> bool {
        self.allow_edit()
            || (!self.subject.deleted
                && !self.subject.archived
                && (self.is_open_and_logged_in() || self.has_matching_share_token()))
    }

    pub fn allow_add_child(&self) -> bool {
        self.allow_edit() || (self.allow_access() && !self.is_public_share())
    }

    pub fn allow_show_results(&self) -> bool {
        if self.allow_edit() {
            return true;
        }
        let visible = match self.subject.show_results {
            ShowResults::Always => true,
            ShowResults::Closed => self.is_expired(),
            ShowResults::Never => false,
        };
        self.allow_access() && visible
    }

    pub fn allow_support(&self) -> bool {
        self.allow_access() && !self.is_expired() && !self.is_public_share()
    }

    pub fn is_allowed(&self, permission: Permission) -> bool {
        match permission {
            Permission::Edit => self.allow_edit(),
            Permission::Access => self.allow_access(),
            Permission::AddChild => self.allow_add_child(),
            Permission::ShowResults => self.allow_show_results(),
            Permission::Support => self.allow_support(),
        }
    }

    /// Like [`is_allowed`](Self::is_allowed), but a denial is an error.
    pub fn require(&self, permission: Permission) -> AgoraResult<()> {
        if self.is_allowed(permission) {
            return Ok(());
        }
        let role = self.role();
        debug!(
            instance = %self.subject.instance_id,
            permission = %permission,
            role = %role,
            "Permission denied"
        );
        Err(AgoraError::Forbidden { permission, role })
    }

    pub fn snapshot(&self) -> PermissionSnapshot {
        PermissionSnapshot {
            role: self.role(),
            permissions: Permission::ALL
                .iter()
                .map(|&permission| (permission, self.is_allowed(permission)))
                .collect(),
        }
    }
}
