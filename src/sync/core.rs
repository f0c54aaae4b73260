//! Main sync orchestrator that wires the collaborators together

use tracing::{debug, info};

use crate::reconciliation::Reconciler;
use crate::sync::{SettingsManager, SettingsOptions, SyncPlan, WorkSummary};
use crate::traits::*;
use crate::types::*;

/// Entry point for inspecting and planning user synchronization
///
/// Every collaborator is injected: the match provider supplies the two
/// snapshots, the settings manager owns configuration.
pub struct SyncManager<P, S, C, R>
where
    P: MatchProvider,
    S: SettingsStore,
    C: CrmDataSource,
    R: RoleDirectory,
{
    provider: P,
    settings_manager: SettingsManager<S, C, R>,
    reconciler: Reconciler,
}

impl<P, S, C, R> SyncManager<P, S, C, R>
where
    P: MatchProvider,
    S: SettingsStore,
    C: CrmDataSource,
    R: RoleDirectory,
{
    /// Create a new sync manager
    pub fn new(provider: P, settings_store: S, crm: C, roles: R) -> Self {
        Self {
            provider,
            settings_manager: SettingsManager::new(settings_store, crm, roles),
            reconciler: Reconciler::new(),
        }
    }

    /// Create a new sync manager with custom settings validator
    pub fn with_validator(
        provider: P,
        settings_store: S,
        crm: C,
        roles: R,
        validator: Box<dyn SettingsValidator>,
    ) -> Self {
        Self {
            provider,
            settings_manager: SettingsManager::with_validator(
                settings_store,
                crm,
                roles,
                validator,
            ),
            reconciler: Reconciler::new(),
        }
    }

    // Settings operations
    /// Load the current settings
    pub async fn settings(&self) -> SyncResult<Settings> {
        self.settings_manager.load().await
    }

    /// Choices offered for each settings field
    pub async fn settings_options(&self) -> SyncResult<SettingsOptions> {
        self.settings_manager.options().await
    }

    /// Validate and persist new settings
    pub async fn save_settings(&mut self, settings: &Settings) -> SyncResult<()> {
        self.settings_manager.save(settings).await
    }

    // Reconciliation operations
    /// Fetch both snapshots and classify them into action sets
    pub async fn action_sets(&self) -> SyncResult<(ContactActionSets, ExistingMatches)> {
        let existing = self.provider.existing_matches().await?;
        let candidates = self.provider.candidate_matches().await?;
        debug!(
            existing = existing.len(),
            candidates = candidates.len(),
            "fetched match snapshots"
        );

        let actions = self.reconciler.reconcile(&candidates, &existing);
        Ok((actions, existing))
    }

    /// Count what the workers would have to process
    pub async fn work_summary(&self) -> SyncResult<WorkSummary> {
        let (actions, _) = self.action_sets().await?;
        let summary = WorkSummary::from_action_sets(&actions);

        info!(
            to_create = summary.to_create,
            to_update = summary.to_update,
            to_block = summary.to_block,
            "{}",
            summary
        );
        Ok(summary)
    }

    /// Build the queue items for the operations enabled in the settings
    pub async fn plan(&self) -> SyncResult<SyncPlan> {
        let settings = self.settings().await?;
        let (actions, existing) = self.action_sets().await?;

        let plan = SyncPlan::from_action_sets(&actions, &existing, &settings);
        info!(
            items = plan.items.len(),
            skipped = plan.skipped.total(),
            "planned sync queue"
        );
        Ok(plan)
    }
}
