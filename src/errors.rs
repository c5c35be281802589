// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for DNS probes, resource store access and reconciliation passes.
//!
//! Errors fall in three groups:
//! - **Not found**: never surfaced as an error by a pass. A missing `Domain` ends the
//!   pass, a missing `Ingress` on delete counts as deleted.
//! - **Transient**: probe lookups, API failures, optimistic-concurrency conflicts and
//!   pass deadlines. The dispatcher retries the key after the short interval.
//! - **Invariant**: objects that cannot exist under correct operation (no uid, name
//!   collisions). Surfaced like any other failure so the pass is retried and logged.

use crate::store::ObjectKey;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// DNS check performed against a domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Check {
    /// DKIM public key record
    Dkim,
    /// Stats endpoint record on the base domain
    StatsDns,
    /// SPF policy record
    Spf,
}

impl Check {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Check::Dkim => "dkim",
            Check::StatsDns => "stats_dns",
            Check::Spf => "spf",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of a reconciliation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Probe,
    ConvergeIngress,
    PersistStatus,
}

impl Stage {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Probe => "probe",
            Stage::ConvergeIngress => "converge_ingress",
            Stage::PersistStatus => "persist_status",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by DNS lookups.
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    /// The record name built from the domain spec is not a valid DNS name
    #[error("Invalid DNS name '{name}': {reason}")]
    InvalidName {
        /// The name that failed to parse
        name: String,
        /// Parser error
        reason: String,
    },

    /// The resolver could not be reached or returned a failure response code
    #[error("{record_type} lookup for '{name}' via {server} failed: {reason}")]
    LookupFailed {
        /// Queried name
        name: String,
        /// Queried record type (e.g., "TXT")
        record_type: String,
        /// Resolver address
        server: String,
        /// Transport error or response code
        reason: String,
    },

    /// The lookup did not complete within the configured timeout
    #[error("{record_type} lookup for '{name}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Queried name
        name: String,
        /// Queried record type
        record_type: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },
}

/// Errors returned by a resource store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Object does not exist
    #[error("{kind} {key} not found")]
    NotFound {
        /// Resource kind
        kind: String,
        /// Object key
        key: ObjectKey,
    },

    /// Stale resource version on update, or the object already exists on create
    #[error("Conflict writing {kind} {key}: {reason}")]
    Conflict {
        /// Resource kind
        kind: String,
        /// Object key
        key: ObjectKey,
        /// Server message
        reason: String,
    },

    /// Object is missing metadata required by the operation
    #[error("Invalid {kind} object: {reason}")]
    InvalidObject {
        /// Resource kind
        kind: String,
        /// What is missing
        reason: String,
    },

    /// Any other API server failure
    #[error("API error on {kind} {key}: {source}")]
    Api {
        /// Resource kind
        kind: String,
        /// Object key
        key: ObjectKey,
        /// Underlying client error
        #[source]
        source: kube::Error,
    },

    /// Object could not be serialized for a patch
    #[error("Failed to serialize {kind}: {source}")]
    Serialization {
        /// Resource kind
        kind: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// `true` for errors that mean the object is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// `true` for optimistic-concurrency and already-exists conflicts.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Error returned by a reconciliation pass.
///
/// Carries the key and the stage that failed. The remaining stages of the pass did not run.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A DNS check failed; no status was written and the ingress was not touched
    #[error("{check} check failed for Domain {key}: {source}")]
    Probe {
        /// Domain key
        key: ObjectKey,
        /// Check that failed
        check: Check,
        /// Lookup error
        #[source]
        source: ProbeError,
    },

    /// A store operation failed
    #[error("{stage} failed for Domain {key}: {source}")]
    Store {
        /// Domain key
        key: ObjectKey,
        /// Stage that issued the store call
        stage: Stage,
        /// Store error
        #[source]
        source: StoreError,
    },

    /// Objects are in a state that cannot occur under correct operation
    #[error("Invariant violated during {stage} for Domain {key}: {reason}")]
    Invariant {
        /// Domain key
        key: ObjectKey,
        /// Stage that detected the violation
        stage: Stage,
        /// Description
        reason: String,
    },

    /// The pass exceeded its deadline and every in-flight call was dropped
    #[error("Reconciliation of Domain {key} cancelled after {timeout:?}")]
    Cancelled {
        /// Domain key
        key: ObjectKey,
        /// Deadline that expired
        timeout: Duration,
    },
}

impl ReconcileError {
    /// Key of the `Domain` whose pass failed.
    #[must_use]
    pub fn key(&self) -> &ObjectKey {
        match self {
            ReconcileError::Probe { key, .. }
            | ReconcileError::Store { key, .. }
            | ReconcileError::Invariant { key, .. }
            | ReconcileError::Cancelled { key, .. } => key,
        }
    }

    /// Label for the `error_type` metric.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            ReconcileError::Probe { .. } => Stage::Probe.as_str(),
            ReconcileError::Store { stage, .. } | ReconcileError::Invariant { stage, .. } => {
                stage.as_str()
            }
            ReconcileError::Cancelled { .. } => "cancelled",
        }
    }

    /// `true` for transient failures that are expected to clear on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, ReconcileError::Invariant { .. })
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
