// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory store backends.
//!
//! These back the integration tests and are usable as embedded stands-in
//! for the real clients. [`MemoryLedger`] maintains a genuine ordered
//! secondary index over disowned rows so that
//! [`find_disowned_before`](crate::OwnershipLedger::find_disowned_before)
//! is a range scan, matching the access pattern the real table must
//! provide.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use mirra_core::{Error, OwnershipState, ReplicaRecord, Result};
use parking_lot::Mutex;

use crate::blob::BlobStore;
use crate::ledger::OwnershipLedger;

/// In-memory blob store holding objects for any number of buckets.
///
/// The destination bucket is named at construction; `copy` and `delete`
/// target it. Delete failures can be injected per key to exercise the
/// sweeper's partial-failure path.
pub struct MemoryBlobStore {
    dst_bucket: String,
    objects: DashMap<(String, String), Bytes>,
    fail_deletes: DashMap<String, String>,
}

impl MemoryBlobStore {
    /// Creates a store whose destination bucket is `dst_bucket`.
    pub fn new(dst_bucket: impl Into<String>) -> Self {
        Self {
            dst_bucket: dst_bucket.into(),
            objects: DashMap::new(),
            fail_deletes: DashMap::new(),
        }
    }

    /// Seeds an object, e.g. into a source bucket.
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.objects.insert((bucket.to_string(), key.to_string()), data.into());
    }

    /// Removes an object without going through `delete`.
    pub fn remove_object(&self, bucket: &str, key: &str) {
        self.objects.remove(&(bucket.to_string(), key.to_string()));
    }

    /// Returns true if `bucket/key` is present.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects.contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Returns the keys currently present in the destination bucket.
    pub fn dst_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().0 == self.dst_bucket)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Makes the next `delete` of `key` fail once with `reason`.
    pub fn inject_delete_failure(&self, key: &str, reason: &str) {
        self.fail_deletes.insert(key.to_string(), reason.to_string());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self.contains(bucket, key))
    }

    async fn copy(&self, src_bucket: &str, src_key: &str, dst_key: &str) -> Result<()> {
        let data = self
            .objects
            .get(&(src_bucket.to_string(), src_key.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::blob(format!("source object {src_bucket}/{src_key} vanished")))?;
        self.objects.insert((self.dst_bucket.clone(), dst_key.to_string()), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Some((_, reason)) = self.fail_deletes.remove(key) {
            return Err(Error::blob(reason));
        }
        // Absence is success.
        self.objects.remove(&(self.dst_bucket.clone(), key.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct LedgerInner {
    rows: BTreeMap<(String, String), ReplicaRecord>,
    // Secondary index: disowned rows ordered by (state_changed_at, pk).
    disowned: BTreeSet<(u64, String, String)>,
}

impl LedgerInner {
    fn unindex(&mut self, record: &ReplicaRecord) {
        if record.state == OwnershipState::Disowned {
            self.disowned.remove(&(
                record.state_changed_at,
                record.object_id.clone(),
                record.copy_id.clone(),
            ));
        }
    }

    fn index(&mut self, record: &ReplicaRecord) {
        if record.state == OwnershipState::Disowned {
            self.disowned.insert((
                record.state_changed_at,
                record.object_id.clone(),
                record.copy_id.clone(),
            ));
        }
    }
}

/// In-memory ownership ledger.
pub struct MemoryLedger {
    inner: Mutex<LedgerInner>,
    fail_next: Mutex<Option<String>>,
    fail_deletes: DashMap<(String, String), String>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerInner::default()),
            fail_next: Mutex::new(None),
            fail_deletes: DashMap::new(),
        }
    }

    /// Makes the next ledger operation fail once with `reason`.
    pub fn inject_failure(&self, reason: &str) {
        *self.fail_next.lock() = Some(reason.to_string());
    }

    /// Makes the next `delete` of `(object_id, copy_id)` fail once.
    pub fn inject_delete_failure(&self, object_id: &str, copy_id: &str, reason: &str) {
        self.fail_deletes
            .insert((object_id.to_string(), copy_id.to_string()), reason.to_string());
    }

    /// Returns the number of rows currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    /// Returns true if the ledger holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fault(&self) -> Result<()> {
        if let Some(reason) = self.fail_next.lock().take() {
            return Err(Error::ledger(reason));
        }
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OwnershipLedger for MemoryLedger {
    async fn find_by_object_id(&self, object_id: &str) -> Result<Vec<ReplicaRecord>> {
        self.check_fault()?;
        let inner = self.inner.lock();
        let start = (object_id.to_string(), String::new());
        Ok(inner
            .rows
            .range(start..)
            .take_while(|((oid, _), _)| oid == object_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn find_disowned_before(&self, cutoff: u64) -> Result<Vec<ReplicaRecord>> {
        self.check_fault()?;
        let inner = self.inner.lock();
        // Strict upper bound: (cutoff, "", "") sorts before any row whose
        // timestamp equals cutoff.
        let end = (cutoff, String::new(), String::new());
        Ok(inner
            .disowned
            .range(..end)
            .filter_map(|(_, object_id, copy_id)| {
                inner.rows.get(&(object_id.clone(), copy_id.clone())).cloned()
            })
            .collect())
    }

    async fn put(&self, record: ReplicaRecord) -> Result<()> {
        self.check_fault()?;
        let mut inner = self.inner.lock();
        let key = (record.object_id.clone(), record.copy_id.clone());
        if let Some(previous) = inner.rows.remove(&key) {
            inner.unindex(&previous);
        }
        inner.index(&record);
        inner.rows.insert(key, record);
        Ok(())
    }

    async fn delete(&self, object_id: &str, copy_id: &str) -> Result<()> {
        self.check_fault()?;
        if let Some((_, reason)) =
            self.fail_deletes.remove(&(object_id.to_string(), copy_id.to_string()))
        {
            return Err(Error::ledger(reason));
        }
        let mut inner = self.inner.lock();
        if let Some(record) = inner.rows.remove(&(object_id.to_string(), copy_id.to_string())) {
            inner.unindex(&record);
        }
        Ok(())
    }

    async fn mark_disowned(&self, object_id: &str, copy_id: &str, now: u64) -> Result<()> {
        self.check_fault()?;
        let mut inner = self.inner.lock();
        let key = (object_id.to_string(), copy_id.to_string());
        let Some(record) = inner.rows.get(&key).cloned() else {
            return Ok(());
        };
        if record.state == OwnershipState::Disowned {
            return Ok(());
        }
        let mut updated = record;
        updated.state = OwnershipState::Disowned;
        updated.state_changed_at = now;
        inner.index(&updated);
        inner.rows.insert(key, updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blob_copy_and_idempotent_delete() {
        let store = MemoryBlobStore::new("dst");
        store.put_object("src", "a", &b"payload"[..]);

        assert!(store.exists("src", "a").await.unwrap());
        store.copy("src", "a", "a-1000-x").await.unwrap();
        assert!(store.contains("dst", "a-1000-x"));

        store.delete("a-1000-x").await.unwrap();
        assert!(!store.contains("dst", "a-1000-x"));
        // Second delete of an absent key is still a success.
        store.delete("a-1000-x").await.unwrap();
    }

    #[tokio::test]
    async fn test_blob_copy_of_vanished_source_fails() {
        let store = MemoryBlobStore::new("dst");
        let err = store.copy("src", "ghost", "ghost-1-x").await.unwrap_err();
        assert!(err.to_string().contains("vanished"));
    }

    #[tokio::test]
    async fn test_ledger_find_by_object_id_is_prefix_scoped() {
        let ledger = MemoryLedger::new();
        ledger.put(ReplicaRecord::owned("a", "a-1-x", 1)).await.unwrap();
        ledger.put(ReplicaRecord::owned("ab", "ab-2-y", 2)).await.unwrap();

        let records = ledger.find_by_object_id("a").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].copy_id, "a-1-x");
    }

    #[tokio::test]
    async fn test_disowned_index_strict_cutoff() {
        let ledger = MemoryLedger::new();
        ledger.put(ReplicaRecord::owned("a", "a-1-x", 1)).await.unwrap();
        ledger.put(ReplicaRecord::owned("b", "b-2-y", 2)).await.unwrap();
        ledger.mark_disowned("a", "a-1-x", 100).await.unwrap();
        ledger.mark_disowned("b", "b-2-y", 200).await.unwrap();

        // Strictly-before semantics: cutoff equal to a timestamp excludes it.
        let hits = ledger.find_disowned_before(100).await.unwrap();
        assert!(hits.is_empty());

        let hits = ledger.find_disowned_before(101).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object_id, "a");

        let hits = ledger.find_disowned_before(u64::MAX).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_disowned_is_idempotent() {
        let ledger = MemoryLedger::new();
        ledger.put(ReplicaRecord::owned("a", "a-1-x", 1)).await.unwrap();
        ledger.mark_disowned("a", "a-1-x", 100).await.unwrap();
        // A duplicate delete notification must not move the deadline.
        ledger.mark_disowned("a", "a-1-x", 500).await.unwrap();

        let records = ledger.find_by_object_id("a").await.unwrap();
        assert_eq!(records[0].state_changed_at, 100);

        // Marking an absent row is a success no-op.
        ledger.mark_disowned("ghost", "ghost-1-x", 100).await.unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_delete_is_idempotent_and_unindexes() {
        let ledger = MemoryLedger::new();
        ledger.put(ReplicaRecord::owned("a", "a-1-x", 1)).await.unwrap();
        ledger.mark_disowned("a", "a-1-x", 100).await.unwrap();

        ledger.delete("a", "a-1-x").await.unwrap();
        ledger.delete("a", "a-1-x").await.unwrap();
        assert!(ledger.is_empty());
        assert!(ledger.find_disowned_before(u64::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrite_replaces_index_entry() {
        let ledger = MemoryLedger::new();
        let mut record = ReplicaRecord::owned("a", "a-1-x", 1);
        record.state = OwnershipState::Disowned;
        record.state_changed_at = 50;
        ledger.put(record.clone()).await.unwrap();

        // Upsert the same pk back to Owned; the stale index entry must go.
        ledger.put(ReplicaRecord::owned("a", "a-1-x", 60)).await.unwrap();
        assert!(ledger.find_disowned_before(u64::MAX).await.unwrap().is_empty());
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let ledger = MemoryLedger::new();
        ledger.inject_failure("throttled");
        assert!(ledger.find_by_object_id("a").await.is_err());
        assert!(ledger.find_by_object_id("a").await.is_ok());
    }
}
