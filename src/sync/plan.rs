//! Consumers of reconciliation results: the work summary and the queue plan

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::reconciliation::ActionSets;
use crate::sync::username::UsernameAllocator;
use crate::types::*;

/// Number of users each operation would touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkSummary {
    pub to_create: usize,
    pub to_update: usize,
    pub to_block: usize,
}

impl WorkSummary {
    pub fn from_action_sets<K: Ord, C, E>(actions: &ActionSets<K, C, E>) -> Self {
        let (to_create, to_update, to_block) = actions.counts();
        Self {
            to_create,
            to_update,
            to_block,
        }
    }

    pub fn total(&self) -> usize {
        self.to_create + self.to_update + self.to_block
    }
}

impl fmt::Display for WorkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Users to create: {}, to update: {}, to block: {}.",
            self.to_create, self.to_update, self.to_block
        )
    }
}

/// A unit of work for the provisioning worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    pub operation: Operation,
    pub contact_id: ContactId,
    /// Account to update or block; `None` for creations
    pub user_id: Option<UserId>,
    /// Proposed username for creations
    pub username: Option<String>,
    pub created_at: NaiveDateTime,
}

impl QueueItem {
    pub fn new(operation: Operation, contact_id: ContactId) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            contact_id,
            user_id: None,
            username: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn with_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }
}

/// Queue items for the enabled operations, creations first, then updates,
/// then blocks, each in ascending contact id order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub items: Vec<QueueItem>,
    /// Work left out because its operation is disabled
    pub skipped: WorkSummary,
}

impl SyncPlan {
    /// Build the plan for `actions` restricted to the operations enabled
    /// in `settings`.
    ///
    /// Update items carry the user id of the matching existing account.
    /// Proposed usernames follow `settings.username` and avoid the names of
    /// existing accounts and of earlier creations in the same plan.
    pub fn from_action_sets(
        actions: &ContactActionSets,
        existing: &ExistingMatches,
        settings: &Settings,
    ) -> Self {
        let mut items = Vec::new();
        let mut skipped = WorkSummary::default();

        if settings.is_enabled(Operation::Create) {
            let mut names = UsernameAllocator::new(
                existing.iter().filter_map(|(_, m)| m.user_name.as_deref()),
            );

            for (contact_id, contact) in &actions.to_create {
                let username = settings
                    .username
                    .username_for(contact)
                    .map(|base| names.allocate(&base));
                items.push(
                    QueueItem::new(Operation::Create, *contact_id).with_username(username),
                );
            }
        } else {
            skipped.to_create = actions.to_create.len();
        }

        if settings.is_enabled(Operation::Update) {
            for (contact_id, _) in &actions.to_update {
                let user_id = existing.get(contact_id).map(|m| m.user_id);
                items.push(QueueItem::new(Operation::Update, *contact_id).with_user(user_id));
            }
        } else {
            skipped.to_update = actions.to_update.len();
        }

        if settings.is_enabled(Operation::Block) {
            for (contact_id, user_match) in &actions.to_block {
                items.push(
                    QueueItem::new(Operation::Block, *contact_id)
                        .with_user(Some(user_match.user_id)),
                );
            }
        } else {
            skipped.to_block = actions.to_block.len();
        }

        Self { items, skipped }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items for a single operation
    pub fn items_for(&self, operation: Operation) -> impl Iterator<Item = &QueueItem> {
        self.items
            .iter()
            .filter(move |item| item.operation == operation)
    }
}
