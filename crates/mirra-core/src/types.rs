// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! Replica ownership data model.

use serde::{Deserialize, Serialize};

/// Ownership state of a replica.
///
/// A record is created `Owned` and may transition to `Disowned` exactly
/// once, when the source object is deleted. `Disowned` is terminal until
/// the record is physically swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipState {
    /// The replica's source object currently exists.
    Owned,
    /// The replica's source object has been deleted; the replica is
    /// eligible for sweeping once the grace period elapses.
    Disowned,
}

impl OwnershipState {
    /// Parse from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owned" => Some(Self::Owned),
            "disowned" => Some(Self::Disowned),
            _ => None,
        }
    }

    /// Convert to string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Disowned => "disowned",
        }
    }
}

/// One row per physical replica that has not yet been swept.
///
/// Keyed by `(object_id, copy_id)`: `object_id` identifies the logical
/// source object, `copy_id` identifies this specific replica in the
/// destination store. `copy_id` values are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaRecord {
    /// Stable identifier of the logical source object (its key).
    pub object_id: String,

    /// Unique identifier of this replica; also its destination-store key.
    pub copy_id: String,

    /// Current ownership state.
    pub state: OwnershipState,

    /// Epoch seconds of the last transition into the current state.
    pub state_changed_at: u64,
}

impl ReplicaRecord {
    /// Creates a new `Owned` record, as written on a create/update event.
    pub fn owned(object_id: impl Into<String>, copy_id: impl Into<String>, now: u64) -> Self {
        Self {
            object_id: object_id.into(),
            copy_id: copy_id.into(),
            state: OwnershipState::Owned,
            state_changed_at: now,
        }
    }

}
