// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! Store abstractions for Mirra.
//!
//! This crate provides:
//! - The [`BlobStore`] trait over the source and destination object stores
//! - The [`OwnershipLedger`] trait over the keyed record store
//! - In-memory implementations of both for testing and embedding

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod blob;
pub mod ledger;
pub mod memory;

pub use blob::BlobStore;
pub use ledger::OwnershipLedger;
pub use memory::{MemoryBlobStore, MemoryLedger};
