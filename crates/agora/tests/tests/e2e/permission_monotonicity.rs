//! E2E: edit rights dominate every lifecycle flag; everyone else is gated by them.

use agora_governance::{AccessContext, PermissionEngine, PermissionSubject};
use agora_types::{
    AccessMode, GroupId, InstanceId, Permission, Role, ShareType, ShowResults, UserId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 9, 30, 0).unwrap()
}

/// Every combination of lifecycle flags, access mode and result visibility.
fn all_subjects() -> Vec<PermissionSubject> {
    let mut subjects = Vec::new();
    for deleted in [false, true] {
        for archived in [false, true] {
            for expire in [None, Some(now() - Duration::days(2)), Some(now() + Duration::days(2))] {
                for access in [AccessMode::Open, AccessMode::Private] {
                    for show in [ShowResults::Always, ShowResults::Closed, ShowResults::Never] {
                        let mut subject = PermissionSubject::new(
                            InstanceId::new("inquiry-monotonic"),
                            UserId::new("owner"),
                        )
                        .with_owner_group(GroupId::new("moderators"))
                        .with_share_token("shared-link")
                        .with_access(access)
                        .with_show_results(show);
                        subject.deleted = deleted;
                        subject.archived = archived;
                        subject.expire = expire;
                        subjects.push(subject);
                    }
                }
            }
        }
    }
    subjects
}

fn editors() -> Vec<AccessContext> {
    vec![
        AccessContext::logged_in(UserId::new("owner"), now()),
        AccessContext::logged_in(UserId::new("moderator"), now())
            .with_membership(GroupId::new("moderators"), true),
        AccessContext::anonymous(now()).with_share("shared-link", ShareType::Admin),
    ]
}

fn non_editors() -> Vec<AccessContext> {
    vec![
        AccessContext::anonymous(now()),
        AccessContext::logged_in(UserId::new("visitor"), now()),
        AccessContext::logged_in(UserId::new("member"), now())
            .with_membership(GroupId::new("moderators"), false),
        AccessContext::anonymous(now()).with_share("shared-link", ShareType::Public),
        AccessContext::anonymous(now()).with_share("shared-link", ShareType::Email),
        AccessContext::logged_in(UserId::new("invitee"), now())
            .with_share("shared-link", ShareType::User),
    ]
}

#[test]
fn edit_implies_access_results_and_children() {
    crate::init_tracing();
    for subject in all_subjects() {
        for ctx in editors() {
            let engine = PermissionEngine::new(&subject, &ctx);
            assert!(engine.allow_edit(), "{:?} / {:?}", subject, ctx);
            assert!(engine.allow_access());
            assert!(engine.allow_show_results());
            assert!(engine.allow_add_child());
        }
    }
}

#[test]
fn deleted_or_archived_locks_out_non_editors() {
    for subject in all_subjects() {
        if !(subject.deleted || subject.archived) {
            continue;
        }
        for ctx in non_editors() {
            let engine = PermissionEngine::new(&subject, &ctx);
            assert!(!engine.allow_edit());
            for permission in Permission::ALL {
                assert!(!engine.is_allowed(permission), "{} for {:?}", permission, ctx);
                assert!(engine.require(permission).unwrap_err().is_forbidden());
            }
        }
    }
}

#[test]
fn support_closes_at_expiry_for_everyone() {
    for subject in all_subjects() {
        let expired = subject.expire.is_some_and(|at| at <= now());
        for ctx in editors().into_iter().chain(non_editors()) {
            let engine = PermissionEngine::new(&subject, &ctx);
            if expired {
                assert!(!engine.allow_support());
            }
        }
    }
}

#[test]
fn display_role_never_shows_admin() {
    for subject in all_subjects() {
        for ctx in editors().into_iter().chain(non_editors()) {
            let snapshot = PermissionEngine::new(&subject, &ctx).snapshot();
            assert_ne!(snapshot.role, Role::Admin);
            assert_eq!(snapshot.permissions.len(), Permission::ALL.len());
        }
    }
}
