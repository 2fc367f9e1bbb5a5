//! Host identity and coarse resource introspection, best effort.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

static LOCAL_HOST: OnceLock<String> = OnceLock::new();

/// Hostname this process advertises in endpoints it creates.
///
/// Resolved once; falls back to the loopback address when the hostname
/// cannot be read.
pub fn local_host() -> &'static str {
    LOCAL_HOST.get_or_init(|| {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "127.0.0.1".to_string())
    })
}

/// Coarse memory snapshot served by `/memInfo`.
///
/// All values in kilobytes; zero when the platform offers no cheap way to
/// read them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemInfo {
    pub total_kb: u64,
    pub available_kb: u64,
    pub process_rss_kb: u64,
}

/// Snapshot current host and process memory figures.
pub fn mem_info() -> MemInfo {
    #[cfg(target_os = "linux")]
    {
        let mut info = MemInfo::default();
        if let Ok(content) = std::fs::read_to_string("/proc/meminfo") {
            info.total_kb = parse_kb_line(&content, "MemTotal:").unwrap_or(0);
            info.available_kb = parse_kb_line(&content, "MemAvailable:").unwrap_or(0);
        }
        if let Ok(content) = std::fs::read_to_string("/proc/self/status") {
            info.process_rss_kb = parse_kb_line(&content, "VmRSS:").unwrap_or(0);
        }
        info
    }

    #[cfg(not(target_os = "linux"))]
    {
        MemInfo::default()
    }
}

#[cfg(target_os = "linux")]
fn parse_kb_line(content: &str, prefix: &str) -> Option<u64> {
    content
        .lines()
        .find(|line| line.starts_with(prefix))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|value| value.parse().ok())
}
