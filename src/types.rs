//! Core types and data structures for CiviCRM user synchronization

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::reconciliation::{ActionSets, MatchSet};

/// CiviCRM contact identifier
pub type ContactId = u64;

/// Identifier of an account in the user store
pub type UserId = u64;

/// Contacts that satisfy the configured inclusion filters
pub type CandidateMatches = MatchSet<ContactId, Contact>;

/// Contacts that already have an account provisioned by this integration
pub type ExistingMatches = MatchSet<ContactId, UserMatch>;

/// Action sets over contacts
pub type ContactActionSets = ActionSets<ContactId, Contact, UserMatch>;

/// A raw CRM API record, field name to value
pub type CrmRecord = serde_json::Map<String, serde_json::Value>;

/// Filters passed to a CRM `get` call, field name to expected value
pub type CrmFilters = serde_json::Map<String, serde_json::Value>;

/// Roles every user has implicitly; they can never be assigned
pub const BUILTIN_ROLES: [&str; 2] = ["anonymous", "authenticated"];

/// A user role as known to the role directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Machine name
    pub id: String,
    pub label: String,
}

impl Role {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Whether this is one of the implicit `anonymous`/`authenticated` roles
    pub fn is_builtin(&self) -> bool {
        BUILTIN_ROLES.contains(&self.id.as_str())
    }
}

/// A CiviCRM contact eligible for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub contact_id: ContactId,
    pub email: Option<String>,
    /// Formatted name, e.g. "Ms Jane DOE"
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Contact {
    /// Create a contact with no name or email set
    pub fn new(contact_id: ContactId) -> Self {
        Self {
            contact_id,
            email: None,
            display_name: None,
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }
}

/// Link between a contact and an account created by a previous sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMatch {
    pub contact_id: ContactId,
    pub user_id: UserId,
    pub user_name: Option<String>,
}

impl UserMatch {
    pub fn new(contact_id: ContactId, user_id: UserId) -> Self {
        Self {
            contact_id,
            user_id,
            user_name: None,
        }
    }
}

/// Operations a sync worker may run on user accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Block,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Create, Operation::Update, Operation::Block];

    pub fn label(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Block => "Block",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Block => write!(f, "block"),
        }
    }
}

/// Contact value used as the account username
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsernameSource {
    #[default]
    Email,
    DisplayName,
    FirstAndLastName,
}

impl UsernameSource {
    pub const ALL: [UsernameSource; 3] = [
        UsernameSource::Email,
        UsernameSource::DisplayName,
        UsernameSource::FirstAndLastName,
    ];

    /// Stable machine name, as stored in settings
    pub fn key(&self) -> &'static str {
        match self {
            UsernameSource::Email => "email",
            UsernameSource::DisplayName => "display_name",
            UsernameSource::FirstAndLastName => "first_and_last_name",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UsernameSource::Email => "Email",
            UsernameSource::DisplayName => "Display name (e.g. Ms Jane DOE)",
            UsernameSource::FirstAndLastName => "First and last name (e.g. Jane DOE)",
        }
    }
}

/// Typed synchronization settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CiviCRM domain id, 1 unless several front ends share one CiviCRM
    pub domain_id: u32,
    /// Limit users to these groups; all groups apply when empty
    pub groups: BTreeSet<u64>,
    /// Limit users to these tags; all tags apply when empty
    pub tags: BTreeSet<u64>,
    /// Contact value the username is taken from
    pub username: UsernameSource,
    /// Roles assigned to newly created users
    pub roles: BTreeSet<String>,
    /// Operations the worker is allowed to run
    pub operations: BTreeSet<Operation>,
    /// Block register/edit/delete of synchronized users in the user store
    pub user_readonly: bool,
}

impl Settings {
    pub fn is_enabled(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain_id: 1,
            groups: BTreeSet::new(),
            tags: BTreeSet::new(),
            username: UsernameSource::default(),
            roles: BTreeSet::new(),
            operations: BTreeSet::new(),
            user_readonly: false,
        }
    }
}

/// Errors that can occur while planning a synchronization
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("CRM error: {0}")]
    Crm(String),
    #[error("Malformed {entity} record {id}: {reason}")]
    MalformedRecord {
        entity: String,
        id: String,
        reason: String,
    },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn malformed(entity: &str, id: impl ToString, reason: impl Into<String>) -> Self {
        SyncError::MalformedRecord {
            entity: entity.to_string(),
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
