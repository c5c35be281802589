// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the mail domain operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

macro_rules! api_group {
    () => {
        "mail.firestoned.io"
    };
}

macro_rules! api_version {
    () => {
        "v1alpha1"
    };
}

/// API group for the `Domain` CRD
pub const API_GROUP: &str = api_group!();

/// API version for the `Domain` CRD
pub const API_VERSION: &str = api_version!();

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = concat!(api_group!(), "/", api_version!());

/// Kind name for `Domain` resource
pub const KIND_DOMAIN: &str = "Domain";

/// Kind name for the derived stats `Ingress`
pub const KIND_INGRESS: &str = "Ingress";

// ============================================================================
// Stats Ingress Constants
// ============================================================================

/// Suffix appended to the `Domain` name to build the stats `Ingress` name
pub const STATS_INGRESS_SUFFIX: &str = "-stats";

/// Path served by the stats `Ingress` rule
pub const STATS_INGRESS_PATH: &str = "/";

/// Path type of the stats `Ingress` rule
pub const STATS_INGRESS_PATH_TYPE: &str = "Prefix";

/// Default backend service receiving stats traffic
pub const DEFAULT_STATS_SERVICE_NAME: &str = "kannon-stats";

/// Default backend service port receiving stats traffic
pub const DEFAULT_STATS_SERVICE_PORT: u16 = 80;

// ============================================================================
// DNS Probe Constants
// ============================================================================

/// Label under which DKIM public keys are published (`<selector>._domainkey.<domain>`)
pub const DKIM_DOMAIN_KEY_LABEL: &str = "_domainkey";

/// Version tag every SPF policy must start with
pub const SPF_VERSION_TAG: &str = "v=spf1";

/// Default SPF include mechanism a domain must delegate to
pub const DEFAULT_SPF_INCLUDE: &str = "_spf.kannon.email";

/// Default recursive resolver used for probes
pub const DEFAULT_DNS_SERVER: &str = "1.1.1.1:53";

/// Default per-query DNS timeout
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Requeue Constants
// ============================================================================

/// Requeue interval once every DNS check passes (1 hour)
pub const CONVERGED_REQUEUE_SECS: u64 = 3600;

/// Requeue interval while any DNS check is failing, and after errors (1 minute)
pub const PENDING_REQUEUE_SECS: u64 = 60;

/// Deadline for a single reconciliation pass
pub const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Field manager name used for API writes
pub const FIELD_MANAGER: &str = "maildomain-operator";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint served next to metrics
pub const HEALTH_SERVER_PATH: &str = "/healthz";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
