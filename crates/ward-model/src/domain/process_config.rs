use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Launch configuration for an executor OS process.
///
/// The environment map may contain values pre-encrypted by an external
/// secrets component; they are forwarded as-is into the child's environment
/// and never decrypted here. Heap bounds are advisory: they reach the
/// executor through the env contract (see [`crate::env_keys`]) and any hard
/// enforcement is a separate supervisor-side knob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessConfig {
    /// Lower heap bound, in megabytes.
    pub min_heap_mb: u64,
    /// Upper heap bound, in megabytes.
    pub max_heap_mb: u64,
    /// Environment variables for the executor process, forwarded verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, String>,
}

impl ProcessConfig {
    pub fn new(min_heap_mb: u64, max_heap_mb: u64) -> Self {
        Self {
            min_heap_mb,
            max_heap_mb,
            environments: BTreeMap::new(),
        }
    }

    pub fn with_env<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.environments.insert(key.into(), value.into());
        self
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::new(256, 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let cfg = ProcessConfig::new(512, 2048).with_env("WARD_LOG_DIR", ".");

        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"minHeapMb\":512"));
        assert!(json.contains("\"maxHeapMb\":2048"));

        let back: ProcessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_environments_defaults_empty() {
        let back: ProcessConfig =
            serde_json::from_str(r#"{"minHeapMb":128,"maxHeapMb":256}"#).unwrap();
        assert!(back.environments.is_empty());
    }
}
