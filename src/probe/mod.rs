// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS checks that compute a `Domain`'s status.
//!
//! A [`DnsChecker`] performs three independent, read-only lookups scoped to the
//! domain's base name. [`check_domain_dns`] runs them in a fixed order (DKIM, stats,
//! SPF) and stops at the first lookup error, so a failed pass never produces a
//! partially filled status.

pub mod hickory;
pub mod records;

pub use hickory::HickoryDnsChecker;

use crate::crd::{DnsStatus, Domain};
use crate::errors::{Check, ProbeError, ReconcileError};
use crate::store::ObjectKey;
use async_trait::async_trait;
use tracing::{error, info};

/// External DNS checks for a domain.
///
/// Each method returns `Ok(false)` when the record is absent or wrong, and `Err` only
/// when the lookup itself failed.
#[async_trait]
pub trait DnsChecker: Send + Sync {
    /// DKIM public key is published under the configured selector.
    async fn check_dkim(&self, domain: &Domain) -> Result<bool, ProbeError>;

    /// The base domain resolves to the stats endpoint.
    async fn check_stats_dns(&self, domain: &Domain) -> Result<bool, ProbeError>;

    /// SPF policy delegates to the sending infrastructure.
    async fn check_spf(&self, domain: &Domain) -> Result<bool, ProbeError>;
}

/// Run every check against `domain` and collect the flags.
///
/// # Errors
///
/// Returns [`ReconcileError::Probe`] naming the first check whose lookup failed.
/// Checks after it are not run.
pub async fn check_domain_dns(
    checker: &dyn DnsChecker,
    key: &ObjectKey,
    domain: &Domain,
) -> Result<DnsStatus, ReconcileError> {
    info!(domain = %key, base_domain = %domain.spec.base_domain, "Checking domain DNS");

    let dkim = run_check(Check::Dkim, key, checker.check_dkim(domain).await)?;
    let stats = run_check(Check::StatsDns, key, checker.check_stats_dns(domain).await)?;
    let spf = run_check(Check::Spf, key, checker.check_spf(domain).await)?;

    let status = DnsStatus { dkim, stats, spf };
    info!(domain = %key, dkim, stats, spf, "Domain DNS checked");
    Ok(status)
}

fn run_check(
    check: Check,
    key: &ObjectKey,
    result: Result<bool, ProbeError>,
) -> Result<bool, ReconcileError> {
    match result {
        Ok(passed) => {
            crate::metrics::record_probe_result(check.as_str(), passed);
            Ok(passed)
        }
        Err(source) => {
            error!(domain = %key, check = %check, error = %source, "DNS check failed");
            crate::metrics::record_probe_error(check.as_str());
            Err(ReconcileError::Probe {
                key: key.clone(),
                check,
                source,
            })
        }
    }
}
