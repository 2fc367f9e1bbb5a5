use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of one task instance.
///
/// Assigned by the caller before the job starts and never reused for a
/// different task. Serialized as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl JobId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for JobId {
    fn from(v: i64) -> Self {
        JobId(v)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of a task to run.
///
/// Created by the external scheduling layer; this core forwards it verbatim
/// and never interprets `job_class` beyond carrying the string to the
/// executor, which resolves it against its job registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobContext {
    /// Job implementation tag resolved by the executor's registry.
    pub job_class: String,
    /// Caller-assigned task identity.
    pub job_id: JobId,
    /// Opaque string properties, forwarded unchanged.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub job_properties: BTreeMap<String, String>,
    /// Job input parameters, forwarded unchanged.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub job_parameters: BTreeMap<String, String>,
}

impl JobContext {
    pub fn new<C: Into<String>>(job_class: C, job_id: JobId) -> Self {
        Self {
            job_class: job_class.into(),
            job_id,
            job_properties: BTreeMap::new(),
            job_parameters: BTreeMap::new(),
        }
    }

    pub fn with_property<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.job_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_parameter<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.job_parameters.insert(key.into(), value.into());
        self
    }
}
