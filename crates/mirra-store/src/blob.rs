// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! Blob store trait definition.

use async_trait::async_trait;
use mirra_core::Result;

/// Trait for the content-addressed blob stores Mirra replicates between.
///
/// An implementation is bound to one destination bucket at construction;
/// `copy` and `delete` operate on that bucket, while `exists` and the
/// source side of `copy` name their bucket explicitly (create events can
/// arrive from any watched source bucket).
///
/// All failures are transient from Mirra's point of view and map to
/// [`mirra_core::Error::StoreUnavailable`]; the caller relies on
/// redelivery rather than retrying in place.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check whether an object currently exists in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Copy `src_bucket/src_key` to `dst_key` in the destination bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails, including when the source
    /// object disappears between the existence check and the copy.
    async fn copy(&self, src_bucket: &str, src_key: &str, dst_key: &str) -> Result<()>;

    /// Delete `key` from the destination bucket.
    ///
    /// Idempotent: deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error only on a transient store failure.
    async fn delete(&self, key: &str) -> Result<()>;
}
