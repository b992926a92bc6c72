//! Replication controller.
//!
//! Translates one change notification into a consistent ledger +
//! destination-store state: create/update events copy the source object
//! and supersede the previous replica outright; delete events mark every
//! ledger record for the key disowned and leave the blob for the sweeper.

use std::sync::Arc;

use metrics::counter;
use mirra_core::{Config, ReplicaRecord, Result};
use mirra_store::{BlobStore, OwnershipLedger};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{ChangeEvent, EventKind};

/// What handling a single event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new replica was written; carries its copy id.
    Replicated(String),
    /// Ledger records were marked disowned; carries how many.
    Disowned(usize),
    /// The event was stale (source object already gone) and was skipped.
    Skipped,
}

/// Aggregate result of handling a notification batch.
///
/// Per-event errors are isolated: one failing event does not block the
/// rest of the batch, it is counted here and left to redelivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Events that mutated the ledger or destination store.
    pub handled: usize,
    /// Stale events skipped without effect.
    pub skipped: usize,
    /// Events whose handling failed and needs redelivery.
    pub failed: usize,
}

impl BatchSummary {
    /// Returns true if no event in the batch failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable status line.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "batch complete: {} handled, {} skipped, {} failed",
            self.handled, self.skipped, self.failed
        )
    }
}

/// Consumes source-store change events, maintaining at most one live
/// replica per logical object.
///
/// Stateless apart from the injected store handles; concurrent instances
/// synchronize only through the stores, and every step is idempotent in
/// outcome so at-least-once redelivery is safe.
pub struct ReplicationController {
    config: Config,
    blobs: Arc<dyn BlobStore>,
    ledger: Arc<dyn OwnershipLedger>,
}

impl ReplicationController {
    /// Creates a controller over the given stores.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if required identifiers are missing.
    pub fn new(
        config: Config,
        blobs: Arc<dyn BlobStore>,
        ledger: Arc<dyn OwnershipLedger>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, blobs, ledger })
    }

    /// Dispatches one event to the create/update or delete path.
    ///
    /// # Errors
    ///
    /// Propagates transient store failures for redelivery.
    pub async fn handle(&self, event: &ChangeEvent, now: u64) -> Result<Outcome> {
        match event.kind {
            EventKind::Created => self.on_create_or_update(&event.bucket, &event.key, now).await,
            EventKind::Removed => self.on_delete(&event.key, now).await,
        }
    }

    /// Handles a whole notification batch, isolating per-event failures.
    pub async fn handle_batch(&self, events: &[ChangeEvent], now: u64) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for event in events {
            match self.handle(event, now).await {
                Ok(Outcome::Skipped) => summary.skipped += 1,
                Ok(_) => summary.handled += 1,
                Err(error) => {
                    warn!(key = %event.key, %error, "event handling failed, leaving for redelivery");
                    summary.failed += 1;
                }
            }
        }
        info!(
            handled = summary.handled,
            skipped = summary.skipped,
            failed = summary.failed,
            "notification batch processed"
        );
        summary
    }

    /// Replicates `src_bucket/key` into the destination store.
    ///
    /// The previous replica for the key, if any, is superseded: deleted
    /// outright from both stores rather than aged out through the grace
    /// period. The grace path exists for deletions, not updates.
    ///
    /// # Errors
    ///
    /// Propagates transient store failures; the caller redelivers and
    /// re-running these steps converges to the same end state.
    pub async fn on_create_or_update(
        &self,
        src_bucket: &str,
        key: &str,
        now: u64,
    ) -> Result<Outcome> {
        // A delete can race ahead of this notification; treat a missing
        // source object as a stale event, not an error.
        if !self.blobs.exists(src_bucket, key).await? {
            debug!(bucket = %src_bucket, key = %key, "source object gone, skipping stale event");
            counter!("mirra_events_skipped_total").increment(1);
            return Ok(Outcome::Skipped);
        }

        let copy_id = derive_copy_id(key, now);
        self.blobs.copy(src_bucket, key, &copy_id).await?;

        // Query before inserting the new record: whatever already exists
        // for this key is the supersession candidate set.
        let existing = self.ledger.find_by_object_id(key).await?;
        let oldest = existing.iter().min_by(|a, b| {
            (a.state_changed_at, &a.copy_id).cmp(&(b.state_changed_at, &b.copy_id))
        });
        if let Some(oldest) = oldest {
            info!(key = %key, superseded = %oldest.copy_id, "superseding previous replica");
            self.blobs.delete(&oldest.copy_id).await?;
            self.ledger.delete(&oldest.object_id, &oldest.copy_id).await?;
        }

        self.ledger.put(ReplicaRecord::owned(key, &copy_id, now)).await?;
        counter!("mirra_replicas_written_total").increment(1);
        Ok(Outcome::Replicated(copy_id))
    }

    /// Marks every ledger record for `key` disowned as of `now`.
    ///
    /// No blob is touched here: the replica stays visible through the
    /// grace window and is reclaimed by the sweeper.
    ///
    /// # Errors
    ///
    /// Propagates transient store failures; marking is idempotent under
    /// redelivery.
    pub async fn on_delete(&self, key: &str, now: u64) -> Result<Outcome> {
        let records = self.ledger.find_by_object_id(key).await?;
        // Usually zero or one record, but races in the supersession step
        // can leave more; disown them all.
        for record in &records {
            self.ledger.mark_disowned(&record.object_id, &record.copy_id, now).await?;
        }
        info!(key = %key, records = records.len(), "marked replicas disowned");
        counter!("mirra_replicas_disowned_total").increment(records.len() as u64);
        Ok(Outcome::Disowned(records.len()))
    }

    /// Returns the destination bucket this controller writes to.
    pub fn dst_bucket(&self) -> &str {
        &self.config.dst_bucket
    }
}

/// Derives a replica id from the object key and event time.
///
/// The random suffix keeps ids unique when two updates to the same key
/// land in the same second; ordering between replicas always comes from
/// `state_changed_at`, never from comparing copy ids.
fn derive_copy_id(key: &str, now: u64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{key}-{now}-{}", &suffix[..8])
}
