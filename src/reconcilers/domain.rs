// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Domain` reconciliation pass.
//!
//! A pass runs five stages in order and stops at the first failure:
//!
//! 1. **Fetch** - load the domain; a missing domain ends the pass cleanly
//! 2. **Probe** - run the DNS checks
//! 3. **Converge** - create or delete the stats ingress
//! 4. **Persist** - replace the status, guarded by `resourceVersion`
//! 5. **Schedule** - pick the delay before the next pass
//!
//! There is no retry inside a pass. Failures are returned to the controller,
//! which requeues the key on the short interval.

use super::ingress::reconcile_stats_ingress;
use super::interval::next_interval;
use super::status_changed;
use crate::context::Context;
use crate::crd::DomainStatus;
use crate::errors::{ReconcileError, Stage};
use crate::probe::check_domain_dns;
use crate::store::ObjectKey;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Result of a successful pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The domain no longer exists; nothing to schedule
    Gone,
    /// Run the next pass after `delay`
    RequeueAfter {
        delay: Duration,
        /// Every DNS check passed
        converged: bool,
    },
}

/// Run one pass for `key` without a deadline.
///
/// # Errors
///
/// Returns the error of the first failing stage. Stages after it did not run.
pub async fn reconcile_domain(
    ctx: &Context,
    key: &ObjectKey,
) -> Result<ReconcileOutcome, ReconcileError> {
    let Some(domain) = ctx
        .domains
        .get(key)
        .await
        .map_err(|source| ReconcileError::Store {
            key: key.clone(),
            stage: Stage::Fetch,
            source,
        })?
    else {
        info!(domain = %key, "Domain no longer exists, nothing to reconcile");
        return Ok(ReconcileOutcome::Gone);
    };

    let dns = check_domain_dns(ctx.checker.as_ref(), key, &domain).await?;

    let action = reconcile_stats_ingress(ctx, key, &domain, &dns).await?;
    debug!(domain = %key, action = ?action, "Stats ingress converged");

    let status = Some(DomainStatus {
        dns,
        observed_generation: domain.metadata.generation,
    });
    if status_changed(&domain.status, &status) {
        let mut updated = domain;
        updated.status = status;
        ctx.domains
            .update_status(&updated)
            .await
            .map_err(|source| ReconcileError::Store {
                key: key.clone(),
                stage: Stage::PersistStatus,
                source,
            })?;
        info!(domain = %key, dkim = dns.dkim, stats = dns.stats, spf = dns.spf, "Updated Domain status");
    } else {
        debug!(domain = %key, "Domain status unchanged, skipping update");
    }

    let delay = next_interval(&ctx.config.intervals, &dns);
    let converged = dns.is_converged();
    info!(
        domain = %key,
        converged,
        requeue_secs = delay.as_secs(),
        "Reconciled Domain"
    );
    Ok(ReconcileOutcome::RequeueAfter { delay, converged })
}

/// Run one pass for `key`, bounded by the configured pass deadline.
///
/// When the deadline expires the pass future is dropped, which drops every
/// in-flight store and DNS call.
///
/// # Errors
///
/// Returns [`ReconcileError::Cancelled`] on deadline expiry, otherwise the
/// error of [`reconcile_domain`].
pub async fn run_pass(ctx: &Context, key: &ObjectKey) -> Result<ReconcileOutcome, ReconcileError> {
    let timeout = ctx.config.pass_timeout;
    let span = info_span!("reconcile", domain = %key);

    async move {
        match tokio::time::timeout(timeout, reconcile_domain(ctx, key)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(domain = %key, timeout_secs = timeout.as_secs(), "Reconciliation deadline exceeded");
                Err(ReconcileError::Cancelled {
                    key: key.clone(),
                    timeout,
                })
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod domain_tests;
