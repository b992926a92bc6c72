// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for Mirra replication.

use thiserror::Error;

/// A specialized `Result` type for Mirra operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during replication and sweeping.
///
/// Transient store failures are surfaced to the caller unchanged so the
/// notification-delivery layer can redeliver the event; there is no
/// internal retry loop. A source object missing at copy time is a skip,
/// not an error, and has no variant here.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// An external store call failed for a transient reason
    /// (connectivity, throttling, server error).
    #[error("{store} store unavailable: {reason}")]
    StoreUnavailable {
        /// Which store failed ("blob" or "ledger").
        store: &'static str,
        /// The underlying failure, as reported by the client.
        reason: String,
    },

    /// The configuration is missing or invalid. Fatal at startup,
    /// never produced mid-operation.
    #[error("configuration error: {0}")]
    Config(String),

    /// A change notification could not be parsed.
    #[error("invalid change notification: {0}")]
    InvalidEvent(String),
}

impl Error {
    /// Creates a transient blob-store error.
    pub fn blob(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable { store: "blob", reason: reason.into() }
    }

    /// Creates a transient ledger error.
    pub fn ledger(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable { store: "ledger", reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::blob("connection reset");
        assert_eq!(error.to_string(), "blob store unavailable: connection reset");

        let error = Error::ledger("throttled");
        assert_eq!(error.to_string(), "ledger store unavailable: throttled");

        let error = Error::Config("destination bucket not set".to_string());
        assert_eq!(error.to_string(), "configuration error: destination bucket not set");
    }
}
