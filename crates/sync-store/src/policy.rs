//! Replication allow-list.
//!
//! The policy is the only authority on which action types cross windows and
//! on how their wire payload is shaped. Loading/error flags and UI state are
//! never listed.

use std::collections::HashMap;
use sync_types::ActionType;

use crate::actions::{buckets, leads, metrics, teams, vaults};

/// Wire payload shape of a replicated type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{ data, context }`
    Contextual,
    /// The raw data, no context.
    Flat,
}

/// Allow-list of replicated action types.
#[derive(Debug, Clone, Default)]
pub struct ReplicationPolicy {
    entries: HashMap<String, PayloadShape>,
}

impl ReplicationPolicy {
    /// Empty policy: nothing is replicated.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every set/add/update/remove of buckets, leads and metrics (contextual)
    /// and of vaults and teams (flat), plus `leads/updateLeadField`.
    #[must_use]
    pub fn standard() -> Self {
        let mut policy = Self::empty();
        for types in [buckets::TYPES, leads::TYPES, metrics::TYPES] {
            for action_type in types.mutations() {
                policy = policy.allow(action_type, PayloadShape::Contextual);
            }
        }
        policy = policy.allow(leads::UPDATE_LEAD_FIELD, PayloadShape::Contextual);
        for types in [vaults::TYPES, teams::TYPES] {
            for action_type in types.mutations() {
                policy = policy.allow(action_type, PayloadShape::Flat);
            }
        }
        policy
    }

    /// Add one type to the allow-list.
    #[must_use]
    pub fn allow(mut self, action_type: impl Into<String>, shape: PayloadShape) -> Self {
        self.entries.insert(action_type.into(), shape);
        self
    }

    #[must_use]
    pub fn shape_of(&self, action_type: &ActionType) -> Option<PayloadShape> {
        self.entries.get(action_type.as_str()).copied()
    }

    #[must_use]
    pub fn is_replicated(&self, action_type: &ActionType) -> bool {
        self.entries.contains_key(action_type.as_str())
    }

    #[must_use]
    pub fn is_contextual(&self, action_type: &ActionType) -> bool {
        self.shape_of(action_type) == Some(PayloadShape::Contextual)
    }

    /// Number of listed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_policy_contents() {
        let policy = ReplicationPolicy::standard();
        assert_eq!(policy.len(), 21);

        assert!(policy.is_contextual(&ActionType::from_static("buckets/addBucket")));
        assert!(policy.is_contextual(&ActionType::from_static("leads/updateLeadField")));
        assert!(policy.is_contextual(&ActionType::from_static("metrics/setMetrics")));
        assert_eq!(
            policy.shape_of(&ActionType::from_static("vaults/setVaults")),
            Some(PayloadShape::Flat)
        );
        assert_eq!(
            policy.shape_of(&ActionType::from_static("teams/removeTeam")),
            Some(PayloadShape::Flat)
        );
    }

    #[test]
    fn test_local_concerns_are_never_listed() {
        let policy = ReplicationPolicy::standard();
        for name in [
            "buckets/setLoading",
            "metrics/setError",
            "ui/setActiveContext",
            "ui/setMetricVisibility",
        ] {
            assert!(!policy.is_replicated(&ActionType::new(name)), "{name}");
        }
    }

    #[test]
    fn test_allow_extends_policy() {
        let policy = ReplicationPolicy::empty().allow("notes/addNote", PayloadShape::Contextual);
        assert!(policy.is_replicated(&ActionType::from_static("notes/addNote")));
        assert!(!policy.is_replicated(&ActionType::from_static("buckets/addBucket")));
    }
}
