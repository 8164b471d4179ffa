//! In-memory entry store.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::enrollment::Entry;
use crate::domain::foundation::CourseId;
use crate::ports::{EntryFilter, EntryRepository, StoreError};

/// In-memory `EntryRepository`.
///
/// Entries are kept in insertion order. Reads and writes can be made to fail
/// for tests that exercise partial reconciliation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntryRepository {
    entries: Arc<RwLock<Vec<Entry>>>,
    failing_courses: Arc<RwLock<HashSet<CourseId>>>,
    fail_reads: Arc<RwLock<bool>>,
}

impl InMemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            ..Self::default()
        }
    }

    /// Snapshot of every stored entry.
    pub async fn all(&self) -> Vec<Entry> {
        self.entries.read().await.clone()
    }

    /// Make saves of entries for `course_id` fail.
    pub async fn fail_saves_for(&self, course_id: CourseId) {
        self.failing_courses.write().await.insert(course_id);
    }

    /// Make every `find` fail.
    pub async fn fail_reads(&self, fail: bool) {
        *self.fail_reads.write().await = fail;
    }

    /// Remove every injected failure.
    pub async fn clear_failures(&self) {
        self.failing_courses.write().await.clear();
        *self.fail_reads.write().await = false;
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    async fn find(&self, filter: EntryFilter) -> Result<Vec<Entry>, StoreError> {
        if *self.fail_reads.read().await {
            return Err(StoreError::read_failed("entry store unavailable"));
        }
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    async fn save(&self, entry: &Entry) -> Result<(), StoreError> {
        if self.failing_courses.read().await.contains(&entry.course_id) {
            return Err(StoreError::write_failed(format!(
                "entry for course {} rejected",
                entry.course_id
            )));
        }

        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }
        Ok(())
    }
}
