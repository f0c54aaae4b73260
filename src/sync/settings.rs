//! Settings loading, validation and the choices offered for each field

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::traits::*;
use crate::types::*;

/// Choices offered for the multi-valued and enumerated settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SettingsOptions {
    /// CRM group id to group title
    pub groups: BTreeMap<u64, String>,
    /// CRM tag id to tag name
    pub tags: BTreeMap<u64, String>,
    /// Assignable role id to role label
    pub roles: BTreeMap<String, String>,
    pub username_sources: Vec<(UsernameSource, String)>,
    pub operations: Vec<(Operation, String)>,
}

/// Read a string label out of a CRM record
fn record_label(entity: &str, id: u64, record: &CrmRecord, field: &str) -> SyncResult<String> {
    record
        .get(field)
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| SyncError::malformed(entity, id, format!("missing '{}' field", field)))
}

/// Stored settings with defaults applied and an unset domain id repaired
pub(crate) fn resolve_stored(stored: Option<Settings>) -> Settings {
    let mut settings = stored.unwrap_or_default();
    if settings.domain_id == 0 {
        warn!("stored domain id is unset, using 1");
        settings.domain_id = 1;
    }
    settings
}

/// Settings manager for loading, validating and saving [`Settings`]
pub struct SettingsManager<S: SettingsStore, C: CrmDataSource, R: RoleDirectory> {
    store: S,
    crm: C,
    roles: R,
    validator: Box<dyn SettingsValidator>,
}

impl<S: SettingsStore, C: CrmDataSource, R: RoleDirectory> SettingsManager<S, C, R> {
    /// Create a new settings manager
    pub fn new(store: S, crm: C, roles: R) -> Self {
        Self {
            store,
            crm,
            roles,
            validator: Box::new(DefaultSettingsValidator),
        }
    }

    /// Create a new settings manager with custom validator
    pub fn with_validator(
        store: S,
        crm: C,
        roles: R,
        validator: Box<dyn SettingsValidator>,
    ) -> Self {
        Self {
            store,
            crm,
            roles,
            validator,
        }
    }

    /// Load stored settings, falling back to defaults when nothing is stored
    pub async fn load(&self) -> SyncResult<Settings> {
        Ok(resolve_stored(self.store.load().await?))
    }

    /// Build the choices for each settings field
    pub async fn options(&self) -> SyncResult<SettingsOptions> {
        let no_filters = CrmFilters::new();

        let mut groups = BTreeMap::new();
        for (id, record) in self.crm.get_all("Group", &no_filters).await? {
            groups.insert(id, record_label("Group", id, &record, "title")?);
        }

        let mut tags = BTreeMap::new();
        for (id, record) in self.crm.get_all("Tag", &no_filters).await? {
            tags.insert(id, record_label("Tag", id, &record, "name")?);
        }

        let roles = self
            .roles
            .list_roles()
            .await?
            .into_iter()
            .filter(|role| !role.is_builtin())
            .map(|role| (role.id, role.label))
            .collect();

        Ok(SettingsOptions {
            groups,
            tags,
            roles,
            username_sources: UsernameSource::ALL
                .iter()
                .map(|source| (*source, source.label().to_string()))
                .collect(),
            operations: Operation::ALL
                .iter()
                .map(|operation| (*operation, operation.label().to_string()))
                .collect(),
        })
    }

    /// Validate and persist settings
    pub async fn save(&mut self, settings: &Settings) -> SyncResult<()> {
        // Validate the settings
        self.validator.validate_settings(settings)?;

        // Every selection must be one of the offered choices
        let options = self.options().await?;
        if let Some(group) = settings
            .groups
            .iter()
            .find(|g| !options.groups.contains_key(*g))
        {
            return Err(SyncError::Validation(format!(
                "Group '{}' does not exist",
                group
            )));
        }
        if let Some(tag) = settings.tags.iter().find(|t| !options.tags.contains_key(*t)) {
            return Err(SyncError::Validation(format!(
                "Tag '{}' does not exist",
                tag
            )));
        }
        if let Some(role) = settings
            .roles
            .iter()
            .find(|r| !options.roles.contains_key(r.as_str()))
        {
            return Err(SyncError::Validation(format!(
                "Role '{}' is not assignable",
                role
            )));
        }

        self.store.save(settings).await?;
        info!(
            domain_id = settings.domain_id,
            groups = settings.groups.len(),
            tags = settings.tags.len(),
            roles = settings.roles.len(),
            "saved sync settings"
        );
        Ok(())
    }
}
