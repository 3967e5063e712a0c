//! Replicated domain entities.
//!
//! Every entity keeps its canonical fields typed and carries all other
//! original fields verbatim in `extra`. Normalization is the only way to build
//! one, so the fetch path, the local mutation path and the remote broadcast
//! path all converge on the same stored shape.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use super::normalize::{into_fields, merge_fields, take_integer, take_string, to_fields};

/// Common contract of a stored entity.
pub trait Entity: Clone + fmt::Debug + PartialEq + Serialize + Send + Sync + 'static {
    /// Human-readable kind for logs.
    const KIND: &'static str;

    /// Id aliases, canonical key first.
    const ID_KEYS: &'static [&'static str];

    /// Every alias group the entity normalizes, `ID_KEYS` included.
    const ALIAS_GROUPS: &'static [&'static [&'static str]];

    /// Coerce arbitrary input into the canonical shape.
    fn normalize(raw: Value) -> Self;

    /// Normalized identifier, `None` when no alias carried a usable value.
    fn id(&self) -> Option<&str>;

    /// Apply a shallow patch and renormalize.
    #[must_use]
    fn merged(&self, patch: Map<String, Value>) -> Self {
        let fields = merge_fields(to_fields(self), patch, Self::ALIAS_GROUPS);
        Self::normalize(Value::Object(fields))
    }
}

const BUCKET_ID: &[&str] = &["id", "bucketId", "bucket_id", "_id"];
const BUCKET_NAME: &[&str] = &["name", "bucketName", "bucket_name"];

/// A named group of leads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub id: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Bucket {
    const KIND: &'static str = "bucket";
    const ID_KEYS: &'static [&'static str] = BUCKET_ID;
    const ALIAS_GROUPS: &'static [&'static [&'static str]] = &[BUCKET_ID, BUCKET_NAME];

    fn normalize(raw: Value) -> Self {
        let mut extra = into_fields(raw);
        Self {
            id: take_string(&mut extra, BUCKET_ID),
            name: take_string(&mut extra, BUCKET_NAME).unwrap_or_default(),
            extra,
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

const LEAD_ID: &[&str] = &["id", "leadId", "lead_id", "_id"];
const LEAD_NAME: &[&str] = &["name", "leadName", "lead_name"];
const LEAD_BUCKET: &[&str] = &["bucketId", "bucket_id"];

/// A tracked lead, optionally filed under a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Option<String>,
    pub name: String,
    pub bucket_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Lead {
    const KIND: &'static str = "lead";
    const ID_KEYS: &'static [&'static str] = LEAD_ID;
    const ALIAS_GROUPS: &'static [&'static [&'static str]] = &[LEAD_ID, LEAD_NAME, LEAD_BUCKET];

    fn normalize(raw: Value) -> Self {
        let mut extra = into_fields(raw);
        Self {
            id: take_string(&mut extra, LEAD_ID),
            name: take_string(&mut extra, LEAD_NAME).unwrap_or_default(),
            bucket_id: take_string(&mut extra, LEAD_BUCKET),
            extra,
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

const METRIC_ID: &[&str] = &["id", "metricId", "metric_id", "_id"];
const METRIC_FIELD: &[&str] = &["fieldName", "field_name", "name"];
const METRIC_OBJECTIVE: &[&str] = &["objectiveCount", "objective_count"];

/// A counted activity with a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: Option<String>,
    pub field_name: String,
    pub objective_count: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Metric {
    const KIND: &'static str = "metric";
    const ID_KEYS: &'static [&'static str] = METRIC_ID;
    const ALIAS_GROUPS: &'static [&'static [&'static str]] =
        &[METRIC_ID, METRIC_FIELD, METRIC_OBJECTIVE];

    fn normalize(raw: Value) -> Self {
        let mut extra = into_fields(raw);
        Self {
            id: take_string(&mut extra, METRIC_ID),
            field_name: take_string(&mut extra, METRIC_FIELD).unwrap_or_default(),
            objective_count: take_integer(&mut extra, METRIC_OBJECTIVE).unwrap_or(0),
            extra,
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

const VAULT_ID: &[&str] = &["id", "vaultId", "vault_id", "_id"];
const VAULT_NAME: &[&str] = &["name", "vaultName", "vault_name"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vault {
    pub id: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Vault {
    const KIND: &'static str = "vault";
    const ID_KEYS: &'static [&'static str] = VAULT_ID;
    const ALIAS_GROUPS: &'static [&'static [&'static str]] = &[VAULT_ID, VAULT_NAME];

    fn normalize(raw: Value) -> Self {
        let mut extra = into_fields(raw);
        Self {
            id: take_string(&mut extra, VAULT_ID),
            name: take_string(&mut extra, VAULT_NAME).unwrap_or_default(),
            extra,
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

const TEAM_ID: &[&str] = &["id", "teamId", "team_id", "_id"];
const TEAM_NAME: &[&str] = &["name", "teamName", "team_name"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub id: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Team {
    const KIND: &'static str = "team";
    const ID_KEYS: &'static [&'static str] = TEAM_ID;
    const ALIAS_GROUPS: &'static [&'static [&'static str]] = &[TEAM_ID, TEAM_NAME];

    fn normalize(raw: Value) -> Self {
        let mut extra = into_fields(raw);
        Self {
            id: take_string(&mut extra, TEAM_ID),
            name: take_string(&mut extra, TEAM_NAME).unwrap_or_default(),
            extra,
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
