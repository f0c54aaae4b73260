//! Reconciliation of candidate matches against existing matches
//!
//! Given the contacts that should have an account (candidates) and the
//! contacts that already have one (existing), this module classifies every
//! key into exactly one of three action sets: create, update or block.
//! The computation is pure and never fails.

pub mod match_set;

pub use match_set::*;

use serde::{Deserialize, Serialize};

/// The three disjoint action sets produced by a reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSets<K: Ord, C, E> {
    /// Candidates without an existing account
    pub to_create: MatchSet<K, C>,
    /// Candidates that already have an account
    pub to_update: MatchSet<K, C>,
    /// Existing accounts that are no longer candidates
    pub to_block: MatchSet<K, E>,
}

impl<K: Ord, C, E> ActionSets<K, C, E> {
    /// Sizes of the create, update and block sets, in that order
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.to_create.len(),
            self.to_update.len(),
            self.to_block.len(),
        )
    }

    /// True when there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_block.is_empty()
    }
}

impl<K: Ord, C, E> Default for ActionSets<K, C, E> {
    fn default() -> Self {
        Self {
            to_create: MatchSet::new(),
            to_update: MatchSet::new(),
            to_block: MatchSet::new(),
        }
    }
}

/// Classify candidate and existing matches into create/update/block sets.
///
/// `to_update` holds the candidates whose key is also in `existing`.
/// Subtracting `to_block` from `candidate` instead would remove nothing,
/// since no key of `to_block` is a candidate.
pub fn reconcile<K, C, E>(
    candidate: &MatchSet<K, C>,
    existing: &MatchSet<K, E>,
) -> ActionSets<K, C, E>
where
    K: Ord + Clone,
    C: Clone,
    E: Clone,
{
    let to_create = candidate.difference_by_key(existing);
    let to_block = existing.difference_by_key(candidate);
    let to_update = candidate.intersection_by_key(existing);

    ActionSets {
        to_create,
        to_update,
        to_block,
    }
}

/// Stateless reconciliation engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// See [`reconcile`]
    pub fn reconcile<K, C, E>(
        &self,
        candidate: &MatchSet<K, C>,
        existing: &MatchSet<K, E>,
    ) -> ActionSets<K, C, E>
    where
        K: Ord + Clone,
        C: Clone,
        E: Clone,
    {
        reconcile(candidate, existing)
    }
}
