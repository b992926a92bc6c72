// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! Ownership ledger trait definition.

use async_trait::async_trait;
use mirra_core::{ReplicaRecord, Result};

/// Typed access layer over the keyed record store tracking replica
/// ownership.
///
/// The backing table is keyed by `(object_id, copy_id)` and carries one
/// secondary index on `(state, state_changed_at)` supporting range
/// queries; [`find_disowned_before`](OwnershipLedger::find_disowned_before)
/// must be served from that index, not by scanning the table.
#[async_trait]
pub trait OwnershipLedger: Send + Sync {
    /// Returns every record for `object_id`, in no defined order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be performed.
    async fn find_by_object_id(&self, object_id: &str) -> Result<Vec<ReplicaRecord>>;

    /// Returns disowned records with `state_changed_at` strictly before
    /// `cutoff`, via the secondary index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index query cannot be performed.
    async fn find_disowned_before(&self, cutoff: u64) -> Result<Vec<ReplicaRecord>>;

    /// Upserts `record`, overwriting any row with the same
    /// `(object_id, copy_id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn put(&self, record: ReplicaRecord) -> Result<()>;

    /// Deletes the row for `(object_id, copy_id)`.
    ///
    /// Idempotent: absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only on a transient store failure.
    async fn delete(&self, object_id: &str, copy_id: &str) -> Result<()>;

    /// Marks the row for `(object_id, copy_id)` disowned as of `now`.
    ///
    /// Idempotent: re-marking an already-disowned row succeeds without
    /// touching its original `state_changed_at`, so duplicate delete
    /// notifications cannot push the sweep deadline forward. Marking an
    /// absent row is also a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn mark_disowned(&self, object_id: &str, copy_id: &str, now: u64) -> Result<()>;
}
