//! Grantree inspection runtime.
//!
//! Seeds in-memory role and user stores from a JSON document and prints the
//! effective permissions of every seeded user.

#![forbid(unsafe_code)]

mod inspect_config;
mod seed;

use std::sync::Arc;

use grantree_application::{EffectivePermissionService, RoleService, UserService};
use grantree_core::{AppError, AppResult};
use grantree_domain::PermissionTree;
use grantree_infrastructure::{InMemoryRoleRepository, InMemoryUserRepository};
use serde::Serialize;
use tracing::info;

use crate::inspect_config::{InspectConfig, init_tracing};
use crate::seed::SeedDocument;

#[derive(Debug, Serialize)]
struct UserPermissionsReport {
    username: String,
    roles: Vec<String>,
    permissions: PermissionTree,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = InspectConfig::load()?;
    info!(
        seed_file = %config.seed_file.display(),
        soft_deleted_policy = ?config.soft_deleted_policy,
        "grantree-inspect started"
    );

    let role_repository = Arc::new(InMemoryRoleRepository::new());
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let permission_service =
        EffectivePermissionService::new(role_repository.clone(), config.soft_deleted_policy);
    let role_service = RoleService::new(role_repository, config.role_listing);
    let user_service = UserService::new(user_repository, permission_service);

    let users = SeedDocument::read(&config.seed_file)
        .await?
        .apply(&role_service, &user_service)
        .await?;

    let mut reports = Vec::with_capacity(users.len());
    for user in users.iter().filter(|user| {
        config
            .username_filter
            .as_deref()
            .is_none_or(|username| user.username().as_str() == username)
    }) {
        let effective = user_service.effective_permissions(user.id()).await?;
        reports.push(UserPermissionsReport {
            username: user.username().as_str().to_owned(),
            roles: effective.roles,
            permissions: effective.permissions,
        });
    }

    print_reports(&reports)
}

fn print_reports(reports: &[UserPermissionsReport]) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(reports)
        .map_err(|error| AppError::Internal(format!("failed to encode report: {error}")))?;
    println!("{rendered}");
    Ok(())
}
