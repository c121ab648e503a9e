use std::sync::Arc;

use serde_json::json;

use grantree_core::AppError;
use grantree_domain::{PermissionTree, RoleReference, UserId};

use crate::test_fakes::{FakeRoleRepository, FakeUserRepository, role, tree};
use crate::{EffectivePermissionService, SoftDeletedRolePolicy};

use super::{RegisterUserInput, UserService};

struct Fixture {
    service: UserService,
    users: Arc<FakeUserRepository>,
    roles: Arc<FakeRoleRepository>,
}

fn fixture() -> Fixture {
    let users = Arc::new(FakeUserRepository::default());
    let roles = Arc::new(FakeRoleRepository::default());
    let permissions = EffectivePermissionService::new(roles.clone(), SoftDeletedRolePolicy::Exclude);

    Fixture {
        service: UserService::new(users.clone(), permissions),
        users,
        roles,
    }
}

fn input(username: &str, email: &str) -> RegisterUserInput {
    RegisterUserInput {
        username: username.to_owned(),
        email: email.to_owned(),
        employee_id: "E-7".to_owned(),
        position: "Engineer".to_owned(),
        first_name: "Grace".to_owned(),
        middle_name: None,
        last_name: "Hopper".to_owned(),
        ..RegisterUserInput::default()
    }
}

#[tokio::test]
async fn register_user_normalizes_username_and_email() {
    let fixture = fixture();

    let user = fixture
        .service
        .register_user(input(" Grace ", "GRACE@Example.com"))
        .await;

    assert!(user.is_ok());
    let user = user.unwrap_or_else(|_| unreachable!());
    assert_eq!(user.username().as_str(), "grace");
    assert_eq!(user.email().as_str(), "grace@example.com");
    assert!(user.roles().is_empty());
    assert_eq!(fixture.users.users.lock().await.len(), 1);
}

#[tokio::test]
async fn register_user_rejects_duplicates() {
    let fixture = fixture();
    let first = fixture
        .service
        .register_user(input("grace", "grace@example.com"))
        .await;
    assert!(first.is_ok());

    let same_username = fixture
        .service
        .register_user(input("GRACE", "other@example.com"))
        .await;
    assert!(matches!(same_username, Err(AppError::Conflict(_))));

    let same_email = fixture
        .service
        .register_user(input("other", "grace@example.com"))
        .await;
    assert!(matches!(same_email, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn register_user_rejects_invalid_email() {
    let fixture = fixture();

    let result = fixture
        .service
        .register_user(input("grace", "not-an-email"))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn empty_override_patch_skips_persistence() {
    let fixture = fixture();
    let user = fixture
        .service
        .register_user(input("grace", "grace@example.com"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let outcome = fixture
        .service
        .update_permissions_override(user.id(), &PermissionTree::new())
        .await;

    assert!(outcome.is_ok());
    assert!(!outcome.unwrap_or_else(|_| unreachable!()).changed);
    assert_eq!(*fixture.users.saves.lock().await, 0);
}

#[tokio::test]
async fn override_patch_is_merged_and_persisted() {
    let fixture = fixture();
    let mut registration = input("grace", "grace@example.com");
    registration.permissions_override = tree(json!({"reports": {"view": 1}}));
    let user = fixture
        .service
        .register_user(registration)
        .await
        .unwrap_or_else(|_| unreachable!());

    let outcome = fixture
        .service
        .update_permissions_override(user.id(), &tree(json!({"reports": {"export": 1}})))
        .await;

    assert!(outcome.is_ok());
    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(outcome.changed);
    assert_eq!(
        outcome.user.permissions_override(),
        &tree(json!({"reports": {"view": 1, "export": 1}}))
    );
    assert_eq!(*fixture.users.saves.lock().await, 1);
}

#[tokio::test]
async fn effective_permissions_follow_assigned_roles() {
    let fixture = fixture();
    let first = role("docs-editor", tree(json!({"edit": {"docs": 1}})));
    let second = role(
        "billing-editor",
        tree(json!({"edit": {"docs": 0, "billing": 1}})),
    );
    let reference = RoleReference::Identifiers(vec![first.id(), second.id()]);
    fixture.roles.roles.lock().await.extend([first, second]);

    let user = fixture
        .service
        .register_user(input("grace", "grace@example.com"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let assigned = fixture.service.assign_roles(user.id(), reference).await;
    assert!(assigned.is_ok());
    let patched = fixture
        .service
        .update_permissions_override(user.id(), &tree(json!({"edit": {"billing": 0}})))
        .await;
    assert!(patched.is_ok());

    let effective = fixture.service.effective_permissions(user.id()).await;

    assert!(effective.is_ok());
    let effective = effective.unwrap_or_else(|_| unreachable!());
    assert_eq!(
        effective.roles,
        vec!["docs-editor".to_owned(), "billing-editor".to_owned()]
    );
    assert_eq!(
        effective.permissions,
        tree(json!({"edit": {"docs": 1, "billing": 1}}))
    );
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let fixture = fixture();

    let effective = fixture.service.effective_permissions(UserId::new()).await;
    assert!(matches!(effective, Err(AppError::NotFound(_))));

    let assigned = fixture
        .service
        .assign_roles(UserId::new(), RoleReference::default())
        .await;
    assert!(matches!(assigned, Err(AppError::NotFound(_))));
}
