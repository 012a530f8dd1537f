// Job store: injected status tracking with expiry

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use uuid::Uuid;

use super::{JobError, JobRecord};

/// Callback applied to a record in place.
pub type JobUpdate = Box<dyn FnOnce(&mut JobRecord) + Send>;

/// Where job status lives between submission and expiry.
///
/// Lifecycle: `insert` on submit, `update` on progress, eviction on expiry
/// (the implementation decides when).
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, record: JobRecord);

    async fn get(&self, id: Uuid) -> Option<JobRecord>;

    /// Apply `update` to the record and return the new state.
    async fn update(&self, id: Uuid, update: JobUpdate) -> Result<JobRecord, JobError>;

    /// Live records, newest first.
    async fn list(&self) -> Vec<JobRecord>;
}

/// In-memory store backed by a moka cache. Records expire `ttl` after
/// their last write.
#[derive(Clone)]
pub struct MemoryJobStore {
    cache: Cache<Uuid, JobRecord>,
}

impl MemoryJobStore {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flush pending maintenance (expiry, eviction). Mostly for tests.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, record: JobRecord) {
        self.cache.insert(record.id, record).await;
    }

    async fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.cache.get(&id).await
    }

    async fn update(&self, id: Uuid, update: JobUpdate) -> Result<JobRecord, JobError> {
        // Calls on one key are serialized by the cache, so no write is lost
        let result = self
            .cache
            .entry(id)
            .and_compute_with(|entry| {
                let op = match entry {
                    Some(entry) => {
                        let mut record = entry.into_value();
                        update(&mut record);
                        record.touch();
                        Op::Put(record)
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        match result {
            CompResult::ReplacedWith(entry) | CompResult::Inserted(entry) => Ok(entry.into_value()),
            _ => Err(JobError::NotFound(id)),
        }
    }

    async fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self.cache.iter().map(|(_, record)| record).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}
