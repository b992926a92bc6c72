// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! Core types for Mirra object replication.
//!
//! This crate provides:
//! - The replica ownership data model ([`ReplicaRecord`], [`OwnershipState`])
//! - Configuration loading and validation ([`Config`])
//! - The shared error taxonomy ([`Error`], [`Result`])

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    Config, ConfigValidationError, DEFAULT_GRACE_SECONDS, DEFAULT_SWEEP_INTERVAL_SECONDS,
};
pub use error::{Error, Result};
pub use types::{OwnershipState, ReplicaRecord};
