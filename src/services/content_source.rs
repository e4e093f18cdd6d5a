use crate::error::Result;
use crate::models::ContentRecord;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Read-only seam to the content corpus.
///
/// The engine only ever pulls a point-in-time snapshot; it never mutates
/// content records. In production this is backed by the content
/// collaborator; tests and embedded hosts use [`InMemoryContentSource`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// A point-in-time snapshot of the corpus, visibility flags included.
    async fn snapshot(&self) -> Result<Vec<ContentRecord>>;
}

/// In-memory corpus backed by a `RwLock<Vec<_>>`.
#[derive(Default)]
pub struct InMemoryContentSource {
    records: RwLock<Vec<ContentRecord>>,
}

impl InMemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record by id.
    pub async fn upsert(&self, record: ContentRecord) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    pub async fn remove(&self, content_id: Uuid) {
        self.records.write().await.retain(|r| r.id != content_id);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn snapshot(&self) -> Result<Vec<ContentRecord>> {
        Ok(self.records.read().await.clone())
    }
}
