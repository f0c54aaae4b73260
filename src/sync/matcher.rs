//! Match provider backed by the CRM API

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::sync::settings::resolve_stored;
use crate::traits::*;
use crate::types::*;

const CONTACT: &str = "Contact";
const UF_MATCH: &str = "UFMatch";

fn optional_string(record: &CrmRecord, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// CRM ids arrive as numbers or numeric strings depending on the API version
fn required_id(entity: &str, id: u64, record: &CrmRecord, field: &str) -> SyncResult<u64> {
    let value = match record.get(field) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    value.ok_or_else(|| SyncError::malformed(entity, id, format!("missing or invalid '{}'", field)))
}

/// Filters for the contact query. Empty group or tag selections are left
/// out so that every group or tag applies.
pub fn contact_filters(settings: &Settings) -> CrmFilters {
    let mut filters = CrmFilters::new();
    filters.insert("domain_id".to_string(), Value::from(settings.domain_id));
    filters.insert("is_deleted".to_string(), Value::Bool(false));
    if !settings.groups.is_empty() {
        filters.insert(
            "group".to_string(),
            Value::from(settings.groups.iter().copied().collect::<Vec<u64>>()),
        );
    }
    if !settings.tags.is_empty() {
        filters.insert(
            "tag".to_string(),
            Value::from(settings.tags.iter().copied().collect::<Vec<u64>>()),
        );
    }
    filters
}

fn match_filters(settings: &Settings) -> CrmFilters {
    let mut filters = CrmFilters::new();
    filters.insert("domain_id".to_string(), Value::from(settings.domain_id));
    filters
}

/// [`MatchProvider`] that queries contacts and user matches from the CRM.
///
/// The group, tag and domain filters are read from the settings store on
/// every fetch, so saved settings apply to the next query.
pub struct CrmMatchProvider<C: CrmDataSource, S: SettingsStore> {
    crm: C,
    store: S,
}

impl<C: CrmDataSource, S: SettingsStore> CrmMatchProvider<C, S> {
    pub fn new(crm: C, store: S) -> Self {
        Self { crm, store }
    }

    /// Current stored settings, defaults when nothing is stored
    pub async fn settings(&self) -> SyncResult<Settings> {
        Ok(resolve_stored(self.store.load().await?))
    }
}

#[async_trait]
impl<C: CrmDataSource, S: SettingsStore> MatchProvider for CrmMatchProvider<C, S> {
    async fn existing_matches(&self) -> SyncResult<ExistingMatches> {
        let settings = self.settings().await?;
        let records = self.crm.get_all(UF_MATCH, &match_filters(&settings)).await?;
        debug!(count = records.len(), "fetched user matches");

        let mut matches = ExistingMatches::new();
        for (id, record) in records {
            let contact_id = required_id(UF_MATCH, id, &record, "contact_id")?;
            let user_id = required_id(UF_MATCH, id, &record, "uf_id")?;
            let user_match = UserMatch {
                contact_id,
                user_id,
                user_name: optional_string(&record, "uf_name"),
            };
            if let Some(previous) = matches.insert(contact_id, user_match) {
                return Err(SyncError::malformed(
                    UF_MATCH,
                    id,
                    format!(
                        "contact {} is already matched to user {}",
                        contact_id, previous.user_id
                    ),
                ));
            }
        }
        Ok(matches)
    }

    async fn candidate_matches(&self) -> SyncResult<CandidateMatches> {
        let settings = self.settings().await?;
        let records = self.crm.get_all(CONTACT, &contact_filters(&settings)).await?;
        debug!(count = records.len(), "fetched candidate contacts");

        Ok(records
            .into_iter()
            .map(|(contact_id, record)| {
                let contact = Contact {
                    contact_id,
                    email: optional_string(&record, "email"),
                    display_name: optional_string(&record, "display_name"),
                    first_name: optional_string(&record, "first_name"),
                    last_name: optional_string(&record, "last_name"),
                };
                (contact_id, contact)
            })
            .collect())
    }
}
