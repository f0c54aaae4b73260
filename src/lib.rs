//! # CiviCRM User Sync
//!
//! Planning library for synchronizing CiviCRM contacts with user accounts.
//!
//! ## Features
//!
//! - **Reconciliation**: Classify candidate and existing matches into create, update and block sets
//! - **Typed settings**: Domain, group/tag filters, username source, roles and enabled operations
//! - **Match providers**: Candidate and existing matches straight from the CRM API
//! - **Planning**: Work summaries and queue items for a provisioning worker
//! - **Collaborator abstraction**: Trait-based settings store, CRM, role directory and match provider
//!
//! ## Quick Start
//!
//! ```rust
//! use civicrm_user_sync::{reconcile, CandidateMatches, Contact, ExistingMatches, UserMatch};
//!
//! let candidates: CandidateMatches = [(1, Contact::new(1)), (2, Contact::new(2))]
//!     .into_iter()
//!     .collect();
//! let existing: ExistingMatches = [(2, UserMatch::new(2, 20)), (3, UserMatch::new(3, 30))]
//!     .into_iter()
//!     .collect();
//!
//! let actions = reconcile(&candidates, &existing);
//! assert_eq!(actions.counts(), (1, 1, 1));
//! ```

pub mod config;
pub mod reconciliation;
pub mod sync;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use reconciliation::*;
pub use sync::*;
pub use traits::*;
pub use types::*;
