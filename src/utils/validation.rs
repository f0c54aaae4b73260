//! Validation utilities

use crate::traits::*;
use crate::types::*;

/// Validate that a domain id is usable
pub fn validate_domain_id(domain_id: u32) -> SyncResult<()> {
    if domain_id < 1 {
        Err(SyncError::Validation(
            "Domain id must be at least 1".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a role machine name is valid
pub fn validate_role_id(role_id: &str) -> SyncResult<()> {
    if role_id.trim().is_empty() {
        return Err(SyncError::Validation(
            "Role id cannot be empty".to_string(),
        ));
    }

    if role_id.len() > 32 {
        return Err(SyncError::Validation(
            "Role id cannot exceed 32 characters".to_string(),
        ));
    }

    // Machine names: lowercase alphanumerics and underscores
    if !role_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(SyncError::Validation(format!(
            "Role id '{}' can only contain lowercase letters, digits, and underscores",
            role_id
        )));
    }

    if BUILTIN_ROLES.contains(&role_id) {
        return Err(SyncError::Validation(format!(
            "Role '{}' is implicit and cannot be assigned",
            role_id
        )));
    }

    Ok(())
}

/// Validate CRM group or tag ids
pub fn validate_crm_ids<'a>(
    kind: &str,
    ids: impl IntoIterator<Item = &'a u64>,
) -> SyncResult<()> {
    if ids.into_iter().any(|id| *id == 0) {
        return Err(SyncError::Validation(format!("{} id cannot be 0", kind)));
    }
    Ok(())
}

/// Settings validator with detailed checks on role machine names and CRM ids
pub struct StrictSettingsValidator;

impl SettingsValidator for StrictSettingsValidator {
    fn validate_settings(&self, settings: &Settings) -> SyncResult<()> {
        validate_domain_id(settings.domain_id)?;
        validate_crm_ids("Group", &settings.groups)?;
        validate_crm_ids("Tag", &settings.tags)?;

        for role in &settings.roles {
            validate_role_id(role)?;
        }

        Ok(())
    }
}
