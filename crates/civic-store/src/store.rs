//! The complaint store proper
use civic_core::{Complaint, ComplaintStatus, SeverityLevel};
use std::sync::RwLock;
use thiserror::Error;

use crate::stats::ComplaintStatistics;

/// Errors surfaced by store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("complaint '{0}' not found")]
    NotFound(String),

    #[error("complaint '{0}' already exists")]
    DuplicateId(String),
}

/// Filter parameters for [`ComplaintStore::list`]
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Keep only complaints with this status
    pub status: Option<ComplaintStatus>,
    /// Keep only complaints in this severity tier
    pub severity: Option<SeverityLevel>,
    /// Truncate the result to at most this many records
    pub limit: Option<usize>,
}

/// Default truncation when the query omits a limit
const DEFAULT_LIST_LIMIT: usize = 50;

/// Process-lifetime ordered collection of complaints, keyed by
/// complaint_id. Every operation is atomic under the interior lock;
/// the lock is never held across an await point.
#[derive(Debug, Default)]
pub struct ComplaintStore {
    inner: RwLock<Vec<Complaint>>,
}

impl ComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a complaint. Rejects an already-present ID; the builder's
    /// ID generation should make this unreachable, but it is checked.
    pub fn insert(&self, complaint: Complaint) -> Result<(), StoreError> {
        let mut records = self.write();
        if records.iter().any(|c| c.complaint_id == complaint.complaint_id) {
            return Err(StoreError::DuplicateId(complaint.complaint_id));
        }
        records.push(complaint);
        Ok(())
    }

    /// Fetch a single complaint by ID
    pub fn get(&self, id: &str) -> Result<Complaint, StoreError> {
        self.read()
            .iter()
            .find(|c| c.complaint_id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Filtered listing, most-recent-first, truncated to the limit.
    /// Order is stable across repeated calls with no intervening
    /// mutation.
    pub fn list(&self, query: &ListQuery) -> Vec<Complaint> {
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        self.read()
            .iter()
            .rev()
            .filter(|c| query.status.is_none_or(|s| c.status == s))
            .filter(|c| query.severity.is_none_or(|s| c.severity_level == s))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Replace the status field of an existing complaint, leaving all
    /// other fields untouched. Last write wins on concurrent updates.
    pub fn update_status(
        &self,
        id: &str,
        new_status: ComplaintStatus,
    ) -> Result<Complaint, StoreError> {
        let mut records = self.write();
        let record = records
            .iter_mut()
            .find(|c| c.complaint_id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.status = new_status;
        Ok(record.clone())
    }

    /// Remove a complaint permanently
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.write();
        let pos = records
            .iter()
            .position(|c| c.complaint_id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        records.remove(pos);
        Ok(())
    }

    /// Aggregate counts and the resolution rate over the whole store
    pub fn statistics(&self) -> ComplaintStatistics {
        ComplaintStatistics::from_records(&self.read())
    }

    /// Every record, in insertion order, in full
    pub fn export_all(&self) -> Vec<Complaint> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock only happens when another thread panicked while
    // holding it; the collection itself is still structurally valid,
    // so recover the guard instead of propagating the panic.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Complaint>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Complaint>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
