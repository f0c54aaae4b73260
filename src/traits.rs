//! Traits for the external collaborators of the sync planner

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::types::*;

/// Source of the two match snapshots that feed reconciliation
///
/// Implementations may query the CRM, a cache, or anything else that can
/// produce key-addressable records. Both snapshots should be taken close
/// together; the reconciler does not reconcile across stale data.
#[async_trait]
pub trait MatchProvider: Send + Sync {
    /// Contacts that already have an account provisioned by this integration
    async fn existing_matches(&self) -> SyncResult<ExistingMatches>;

    /// Contacts that currently satisfy the inclusion filters
    async fn candidate_matches(&self) -> SyncResult<CandidateMatches>;
}

/// Narrow persistence contract for [`Settings`]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the stored settings, `None` when nothing was saved yet
    async fn load(&self) -> SyncResult<Option<Settings>>;

    /// Persist settings, replacing what was stored
    async fn save(&mut self, settings: &Settings) -> SyncResult<()>;
}

/// CRM API access
#[async_trait]
pub trait CrmDataSource: Send + Sync {
    /// Fetch every record of `entity` (e.g. `Group`, `Tag`, `Contact`)
    /// matching `filters`, keyed by record id
    async fn get_all(&self, entity: &str, filters: &CrmFilters)
        -> SyncResult<BTreeMap<u64, CrmRecord>>;
}

/// Directory of user roles
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// List every role, built-in ones included
    async fn list_roles(&self) -> SyncResult<Vec<Role>>;
}

/// Trait for implementing custom settings validation rules
pub trait SettingsValidator: Send + Sync {
    /// Validate settings before saving
    fn validate_settings(&self, settings: &Settings) -> SyncResult<()>;
}

/// Default settings validator with basic rules
pub struct DefaultSettingsValidator;

impl SettingsValidator for DefaultSettingsValidator {
    fn validate_settings(&self, settings: &Settings) -> SyncResult<()> {
        if settings.domain_id < 1 {
            return Err(SyncError::Validation(
                "Domain id must be at least 1".to_string(),
            ));
        }

        if let Some(role) = settings
            .roles
            .iter()
            .find(|role| BUILTIN_ROLES.contains(&role.as_str()))
        {
            return Err(SyncError::Validation(format!(
                "Role '{}' is implicit and cannot be assigned",
                role
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validator_accepts_defaults() {
        assert!(DefaultSettingsValidator
            .validate_settings(&Settings::default())
            .is_ok());
    }

    #[test]
    fn test_default_validator_rejects_zero_domain() {
        let settings = Settings {
            domain_id: 0,
            ..Settings::default()
        };
        let result = DefaultSettingsValidator.validate_settings(&settings);
        assert!(matches!(result, Err(SyncError::Validation(_))));
    }

    #[test]
    fn test_default_validator_rejects_builtin_roles() {
        let mut settings = Settings::default();
        settings.roles.insert("authenticated".to_string());
        let result = DefaultSettingsValidator.validate_settings(&settings);
        assert!(matches!(result, Err(SyncError::Validation(_))));
    }
}
