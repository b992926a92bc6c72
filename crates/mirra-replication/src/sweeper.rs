//! Retention sweeper.
//!
//! Periodically reclaims replicas that have been disowned for longer
//! than the grace period: the destination-store blob is deleted first,
//! then the ledger row. Each record's cleanup is independent; one
//! failure is reported and counted, never fatal to the pass.

use std::sync::Arc;

use metrics::{counter, gauge};
use mirra_core::{Config, Result};
use mirra_store::{BlobStore, OwnershipLedger};
use tracing::{info, warn};

/// Aggregate result of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records returned by the disowned-index query.
    pub examined: usize,
    /// Records whose blob and ledger row were both removed.
    pub swept: usize,
    /// Records whose cleanup failed and will be retried next pass.
    pub failed: usize,
}

impl SweepReport {
    /// Returns true if every examined record was fully cleaned up.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable status line.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "sweep complete: {} examined, {} swept, {} failed",
            self.examined, self.swept, self.failed
        )
    }
}

/// Reclaims disowned replicas once their grace period has elapsed.
///
/// Invoked on a fixed interval by an external scheduler; each call runs
/// exactly one bounded pass.
pub struct RetentionSweeper {
    config: Config,
    blobs: Arc<dyn BlobStore>,
    ledger: Arc<dyn OwnershipLedger>,
}

impl RetentionSweeper {
    /// Creates a sweeper over the given stores.
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

    /// Runs one sweep pass as of `now` (epoch seconds).
    ///
    /// A record left with its blob deleted but its ledger row intact is a
    /// valid transient state: the next pass retries the blob delete
    /// idempotently and completes the ledger delete.
    ///
    /// # Errors
    ///
    /// Returns an error only if the disowned-index query itself fails;
    /// per-record failures are absorbed into the report.
    pub async fn run(&self, now: u64) -> Result<SweepReport> {
        let cutoff = now.saturating_sub(self.config.grace_seconds);
        let expired = self.ledger.find_disowned_before(cutoff).await?;

        let mut report = SweepReport { examined: expired.len(), ..Default::default() };
        gauge!("mirra_sweep_candidates").set(expired.len() as f64);

        for record in expired {
            if let Err(error) = self.blobs.delete(&record.copy_id).await {
                warn!(copy_id = %record.copy_id, %error, "blob delete failed, will retry next pass");
                report.failed += 1;
                continue;
            }
            if let Err(error) = self.ledger.delete(&record.object_id, &record.copy_id).await {
                warn!(copy_id = %record.copy_id, %error, "ledger delete failed, will retry next pass");
                report.failed += 1;
                continue;
            }
            report.swept += 1;
        }

        counter!("mirra_sweep_swept_total").increment(report.swept as u64);
        counter!("mirra_sweep_failures_total").increment(report.failed as u64);
        info!(
            cutoff,
            examined = report.examined,
            swept = report.swept,
            failed = report.failed,
            "sweep pass finished"
        );
        Ok(report)
    }
}
