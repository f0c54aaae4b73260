//! In-memory collaborator implementations for testing

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory settings store for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: Arc<RwLock<Option<Settings>>>,
}

impl MemorySettingsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored settings directly
    pub fn set(&self, settings: Settings) {
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(settings);
    }

    /// Snapshot of the stored settings
    pub fn get(&self) -> Option<Settings> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> SyncResult<Option<Settings>> {
        let settings = self
            .settings
            .read()
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        Ok(settings.clone())
    }

    async fn save(&mut self, settings: &Settings) -> SyncResult<()> {
        let mut stored = self
            .settings
            .write()
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        *stored = Some(settings.clone());
        Ok(())
    }
}

/// Does a record field satisfy one filter value?
///
/// A list filter matches when the field (scalar or list) shares at least one
/// value with it. A scalar filter needs an equal field.
fn filter_matches(field: Option<&Value>, expected: &Value) -> bool {
    match (field, expected) {
        (None, _) => false,
        (Some(Value::Array(values)), Value::Array(wanted)) => {
            values.iter().any(|v| wanted.contains(v))
        }
        (Some(value), Value::Array(wanted)) => wanted.contains(value),
        (Some(value), expected) => value == expected,
    }
}

/// In-memory CRM holding records per entity
#[derive(Debug, Clone, Default)]
pub struct MemoryCrm {
    entities: Arc<RwLock<HashMap<String, BTreeMap<u64, CrmRecord>>>>,
}

impl MemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record. Non-object values are stored as empty records.
    pub fn insert(&self, entity: &str, id: u64, record: Value) {
        let record = match record {
            Value::Object(map) => map,
            _ => CrmRecord::new(),
        };
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(entity.to_string())
            .or_default()
            .insert(id, record);
    }

    /// Remove a record, returning whether it existed
    pub fn remove(&self, entity: &str, id: u64) -> bool {
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(entity)
            .is_some_and(|records| records.remove(&id).is_some())
    }
}

#[async_trait]
impl CrmDataSource for MemoryCrm {
    async fn get_all(
        &self,
        entity: &str,
        filters: &CrmFilters,
    ) -> SyncResult<BTreeMap<u64, CrmRecord>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| SyncError::Crm(e.to_string()))?;

        let Some(records) = entities.get(entity) else {
            return Ok(BTreeMap::new());
        };

        Ok(records
            .iter()
            .filter(|(_, record)| {
                filters
                    .iter()
                    .all(|(field, expected)| filter_matches(record.get(field), expected))
            })
            .map(|(id, record)| (*id, record.clone()))
            .collect())
    }
}

/// In-memory role directory
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleDirectory {
    roles: Arc<RwLock<Vec<Role>>>,
}

impl MemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles: Arc::new(RwLock::new(roles)),
        }
    }
}

#[async_trait]
impl RoleDirectory for MemoryRoleDirectory {
    async fn list_roles(&self) -> SyncResult<Vec<Role>> {
        let roles = self
            .roles
            .read()
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        Ok(roles.clone())
    }
}

/// Match provider serving fixed snapshots
#[derive(Debug, Clone, Default)]
pub struct MemoryMatchProvider {
    existing: Arc<RwLock<ExistingMatches>>,
    candidates: Arc<RwLock<CandidateMatches>>,
}

impl MemoryMatchProvider {
    pub fn new(candidates: CandidateMatches, existing: ExistingMatches) -> Self {
        Self {
            existing: Arc::new(RwLock::new(existing)),
            candidates: Arc::new(RwLock::new(candidates)),
        }
    }

    pub fn set_candidates(&self, candidates: CandidateMatches) {
        *self
            .candidates
            .write()
            .unwrap_or_else(PoisonError::into_inner) = candidates;
    }

    pub fn set_existing(&self, existing: ExistingMatches) {
        *self
            .existing
            .write()
            .unwrap_or_else(PoisonError::into_inner) = existing;
    }
}

#[async_trait]
impl MatchProvider for MemoryMatchProvider {
    async fn existing_matches(&self) -> SyncResult<ExistingMatches> {
        let existing = self
            .existing
            .read()
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        Ok(existing.clone())
    }

    async fn candidate_matches(&self) -> SyncResult<CandidateMatches> {
        let candidates = self
            .candidates
            .read()
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        Ok(candidates.clone())
    }
}
