use parking_lot::Mutex;
use std::sync::OnceLock;

use crate::store::{CacheRecord, CacheStore};

/// An in-memory, process-lifetime cache store.
///
/// The record is created the first time it is accessed and lives as long as
/// the store. Every cycle served by the same process should share one
/// `ProcessCache`, usually behind an `Arc`.
///
/// ### Note
///
/// Nothing is written to durable storage; restarting the process forgets
/// every cached credential.
#[derive(Debug, Default)]
pub struct ProcessCache {
    record: OnceLock<Mutex<CacheRecord>>,
}

impl ProcessCache {
    pub fn new() -> Self {
        Self {
            record: OnceLock::new(),
        }
    }

    /// Whether the record has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.record.get().is_some()
    }

    fn get(&self) -> &Mutex<CacheRecord> {
        self.record.get_or_init(|| {
            tracing::debug!("initializing process cache record");
            Mutex::new(CacheRecord::default())
        })
    }
}

impl CacheStore for ProcessCache {
    fn with_record<R>(&self, f: impl FnOnce(&mut CacheRecord) -> R) -> R {
        let mut record = self.get().lock();
        f(&mut record)
    }
}
