use std::env;
use std::path::PathBuf;

use grantree_application::{RoleListingConfig, SoftDeletedRolePolicy};
use grantree_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub seed_file: PathBuf,
    pub username_filter: Option<String>,
    pub role_listing: RoleListingConfig,
    pub soft_deleted_policy: SoftDeletedRolePolicy,
}

impl InspectConfig {
    pub fn load() -> AppResult<Self> {
        let seed_file = PathBuf::from(required_non_empty_env("GRANTREE_SEED_FILE")?);
        let username_filter = env::args()
            .nth(1)
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        let defaults = RoleListingConfig::default();
        let role_listing = RoleListingConfig::new(
            parse_env_usize("ROLE_PAGE_DEFAULT_LIMIT", defaults.default_limit())?,
            parse_env_usize("ROLE_PAGE_MAX_LIMIT", defaults.max_limit())?,
        )?;

        let include_soft_deleted = env::var("GRANTREE_INCLUDE_SOFT_DELETED_ROLES")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            seed_file,
            username_filter,
            role_listing,
            soft_deleted_policy: SoftDeletedRolePolicy::from_include_flag(include_soft_deleted),
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn required_non_empty_env(name: &str) -> AppResult<String> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_usize(name: &str, default: usize) -> AppResult<usize> {
    match env::var(name) {
        Ok(value) => value.parse::<usize>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
