use std::fmt;

use serde::{Deserialize, Serialize};

/// Addressable identity of one running supervisor process.
///
/// Identity is purely structural: two values with equal host and port name
/// the same reachable process, no matter which caller created them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorEndpoint {
    pub host: String,
    pub port: u16,
}

impl SupervisorEndpoint {
    pub fn new<H: Into<String>>(host: H, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for SupervisorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Address of a spawned executor process.
///
/// Stable for the lifetime of the task. Carries the port of the supervisor
/// that spawned it, so a holder of this value can address either process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorEndpoint {
    pub host: String,
    /// Port of the supervisor that spawned this executor.
    pub supervisor_port: u16,
    /// Port the executor process listens on.
    pub executor_port: u16,
}

impl ExecutorEndpoint {
    pub fn new<H: Into<String>>(host: H, supervisor_port: u16, executor_port: u16) -> Self {
        Self {
            host: host.into(),
            supervisor_port,
            executor_port,
        }
    }

    /// The endpoint of the spawning supervisor.
    pub fn supervisor(&self) -> SupervisorEndpoint {
        SupervisorEndpoint::new(self.host.clone(), self.supervisor_port)
    }
}

impl fmt::Display for ExecutorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} (supervisor {})",
            self.host, self.executor_port, self.supervisor_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn supervisor_identity_is_structural() {
        let a = SupervisorEndpoint::new("192.168.1.9", 8989);
        let b = SupervisorEndpoint::new("192.168.1.9".to_string(), 8989);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn different_port_is_a_different_supervisor() {
        let a = SupervisorEndpoint::new("localhost", 18001);
        let b = SupervisorEndpoint::new("localhost", 18002);
        assert_ne!(a, b);
    }

    #[test]
    fn executor_back_references_its_supervisor() {
        let exec = ExecutorEndpoint::new("127.0.0.1", 18001, 19001);
        assert_eq!(
            exec.supervisor(),
            SupervisorEndpoint::new("127.0.0.1", 18001)
        );
    }

    #[test]
    fn executor_endpoint_serde_roundtrip() {
        let exec = ExecutorEndpoint::new("127.0.0.1", 18001, 19001);
        let json = serde_json::to_string(&exec).unwrap();
        assert!(json.contains("\"supervisorPort\":18001"));
        assert!(json.contains("\"executorPort\":19001"));

        let back: ExecutorEndpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exec);
    }
}
