//! Agora Governance - decision rules over content instances
//!
//! Two independent engines, both pure functions of their explicit inputs:
//!
//! - [`QuorumEvaluator`] decides whether participation in a phase met a
//!   [`QuorumRule`].
//! - [`PermissionEngine`] derives a user's role on an inquiry or option and
//!   the permissions that follow.

#![deny(unsafe_code)]

pub mod permission;
pub mod quorum;

pub use permission::{
    AccessContext, GroupMembership, PermissionEngine, PermissionSnapshot, PermissionSubject,
    ShareGrant,
};
pub use quorum::{
    ParticipationCounts, QuorumBase, QuorumEvaluator, QuorumKind, QuorumPhase, QuorumRule,
    QuorumScope, QuorumUpdate,
};
