//! In-memory table of executors this supervisor spawned.
//!
//! The registry is only one of the two liveness oracles: a supervisor that
//! restarted (and so lost this table) still answers for locally reachable
//! executors through direct probing. Lookups never await while holding the
//! map lock; process handles are shared out behind their own async mutex.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ward_exec::ExecutorProcess;
use ward_model::{ExecutorEndpoint, JobId};

/// One spawned executor known to this supervisor.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub endpoint: ExecutorEndpoint,
    pub process: Arc<tokio::sync::Mutex<ExecutorProcess>>,
}

impl TaskRecord {
    pub fn new(endpoint: ExecutorEndpoint, process: ExecutorProcess) -> Self {
        Self {
            endpoint,
            process: Arc::new(tokio::sync::Mutex::new(process)),
        }
    }
}

enum Entry {
    /// A START is in flight; blocks duplicate spawns for the same job.
    Reserved,
    Running(TaskRecord),
}

/// Outcome of claiming a job identity for START.
pub enum StartSlot {
    /// The identity is now reserved for this caller; it must either
    /// [`TaskRegistry::complete`] or [`TaskRegistry::abort`] the claim.
    Reserved,
    /// Another START holds the reservation right now.
    InFlight,
    /// A record already exists for this identity.
    Existing(TaskRecord),
}

/// Concurrent JobId → executor table.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<RwLock<HashMap<JobId, Entry>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for a START, without spawning under the lock.
    pub fn reserve(&self, id: JobId) -> StartSlot {
        let mut map = self.inner.write().unwrap();
        if let Some(entry) = map.get(&id) {
            return match entry {
                Entry::Reserved => StartSlot::InFlight,
                Entry::Running(record) => StartSlot::Existing(record.clone()),
            };
        }
        map.insert(id, Entry::Reserved);
        StartSlot::Reserved
    }

    /// Fulfil a reservation with the spawned executor.
    pub fn complete(&self, id: JobId, record: TaskRecord) {
        let mut map = self.inner.write().unwrap();
        map.insert(id, Entry::Running(record));
    }

    /// Drop a reservation after a failed spawn.
    pub fn abort(&self, id: JobId) {
        let mut map = self.inner.write().unwrap();
        if let Some(Entry::Reserved) = map.get(&id) {
            map.remove(&id);
        }
    }

    pub fn get(&self, id: JobId) -> Option<TaskRecord> {
        let map = self.inner.read().unwrap();
        match map.get(&id) {
            Some(Entry::Running(record)) => Some(record.clone()),
            _ => None,
        }
    }

    /// Remove the record for `id` if it still points at `endpoint`.
    ///
    /// The endpoint guard keeps a stale remove (duplicate destroy racing a
    /// restart) from clobbering a newer registration.
    pub fn remove_matching(
        &self,
        id: JobId,
        endpoint: &ExecutorEndpoint,
    ) -> Option<TaskRecord> {
        let mut map = self.inner.write().unwrap();
        let matches = matches!(
            map.get(&id),
            Some(Entry::Running(record)) if record.endpoint == *endpoint
        );
        if !matches {
            return None;
        }
        match map.remove(&id) {
            Some(Entry::Running(record)) => Some(record),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Identities currently registered (reserved or running).
    pub fn jobs(&self) -> Vec<JobId> {
        self.inner.read().unwrap().keys().copied().collect()
    }
}
