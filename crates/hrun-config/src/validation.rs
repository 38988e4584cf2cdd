//! Configuration validation

use crate::schema::{RawBuild, RawConfig};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Build '{version}': {message}")]
    BuildError { version: String, message: String },

    #[error("Duplicate build version: {0}")]
    DuplicateVersion(String),

    #[error("Invalid version '{value}': {message}")]
    InvalidVersion { value: String, message: String },

    #[error("Inventory config error: {0}")]
    InventoryError(String),

    #[error("Launch config error: {0}")]
    LaunchError(String),

    #[error("Invalid environment variable name '{0}'")]
    InvalidEnvName(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_versions = HashSet::new();
    for build in &config.builds {
        if !seen_versions.insert(&build.version) {
            errors.push(ValidationError::DuplicateVersion(build.version.clone()));
        }
        errors.extend(validate_build(build));
    }

    let inventory = &config.inventory;
    if let Some(default) = &inventory.default_version
        && let Err(message) = check_version(default)
    {
        errors.push(ValidationError::InvalidVersion {
            value: default.clone(),
            message,
        });
    }

    if let Some(prefix) = &inventory.dir_prefix
        && prefix.is_empty()
    {
        errors.push(ValidationError::InventoryError(
            "dir_prefix cannot be empty".into(),
        ));
    }

    if let Some(name) = &inventory.symlink_name
        && (name.is_empty() || name.contains('/'))
    {
        errors.push(ValidationError::InventoryError(format!(
            "symlink_name '{}' must be a plain file name",
            name
        )));
    }

    if let Some(program) = inventory.installer.first()
        && program.is_empty()
    {
        errors.push(ValidationError::InventoryError(
            "installer command cannot be empty".into(),
        ));
    }

    if let Some(root) = &inventory.builds_root
        && !root.is_absolute()
    {
        errors.push(ValidationError::InventoryError(format!(
            "builds_root must be absolute: {}",
            root.display()
        )));
    }

    if let Some(linker) = &config.launch.linker
        && !linker.is_absolute()
    {
        errors.push(ValidationError::LaunchError(format!(
            "linker must be absolute: {}",
            linker.display()
        )));
    }

    if let Some(var) = &config.launch.install_root_var
        && !is_env_name(var)
    {
        errors.push(ValidationError::InvalidEnvName(var.clone()));
    }

    for key in config.env.keys() {
        if !is_env_name(key) {
            errors.push(ValidationError::InvalidEnvName(key.clone()));
        }
    }

    errors
}

fn validate_build(build: &RawBuild) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(message) = check_version(&build.version) {
        errors.push(ValidationError::InvalidVersion {
            value: build.version.clone(),
            message,
        });
    }

    if !build.path.is_absolute() {
        errors.push(ValidationError::BuildError {
            version: build.version.clone(),
            message: format!("path must be absolute: {}", build.path.display()),
        });
    }

    errors
}

/// A version must start with a number, e.g. `18.0.532`
pub fn check_version(value: &str) -> Result<(), String> {
    match value.chars().next() {
        None => Err("version cannot be empty".into()),
        Some(c) if c.is_ascii_digit() => Ok(()),
        Some(_) => Err("version must start with a digit".into()),
    }
}

fn is_env_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
