// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Domain` controller.
//!
//! Watches `Domain` resources and the stats ingresses they own, and runs one
//! reconciliation pass per trigger. The kube-runtime controller guarantees at most
//! one concurrent pass per key and coalesces duplicate triggers.

use crate::constants::KIND_DOMAIN;
use crate::context::Context;
use crate::crd::Domain;
use crate::errors::ReconcileError;
use crate::reconcilers::{run_pass, ReconcileOutcome};
use crate::store::ObjectKey;
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::runtime::controller::Action;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Run the `Domain` controller until a shutdown signal is received.
///
/// In-flight passes finish on SIGINT/SIGTERM; no new pass is started.
///
/// # Arguments
///
/// * `client` - Kubernetes client used for the watches
/// * `context` - Stores, checker and configuration used by every pass
/// * `namespace` - Restrict the watches to one namespace (`None` for all namespaces)
///
/// # Errors
///
/// Returns an error if the controller fails to start.
pub async fn run_domain_controller(
    client: Client,
    context: Arc<Context>,
    namespace: Option<String>,
) -> Result<()> {
    let (domains, ingresses): (Api<Domain>, Api<Ingress>) = match namespace.as_deref() {
        Some(ns) => {
            info!(namespace = ns, "Starting Domain controller for a single namespace");
            (
                Api::namespaced(client.clone(), ns),
                Api::namespaced(client, ns),
            )
        }
        None => {
            info!("Starting Domain controller with cluster-wide watch");
            (Api::all(client.clone()), Api::all(client))
        }
    };

    Controller::new(domains, WatcherConfig::default())
        .owns(ingresses, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile_wrapper, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => {
                    debug!(object = %object, action = ?action, "Reconciled");
                }
                Err(e) => warn!(error = %e, "Controller stream error"),
            }
        })
        .await;

    info!("Domain controller stopped");
    Ok(())
}

/// Run one pass and translate its outcome into a controller action.
async fn reconcile_wrapper(
    domain: Arc<Domain>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();

    let Some(key) = ObjectKey::of(domain.as_ref()) else {
        warn!("Ignoring Domain without name or namespace");
        return Ok(Action::await_change());
    };

    match run_pass(&ctx, &key).await {
        Ok(ReconcileOutcome::Gone) => {
            crate::metrics::record_reconciliation_success(KIND_DOMAIN, start.elapsed());
            Ok(Action::await_change())
        }
        Ok(ReconcileOutcome::RequeueAfter { delay, converged }) => {
            crate::metrics::record_reconciliation_success(KIND_DOMAIN, start.elapsed());
            let reason = if converged {
                "converged"
            } else {
                "pending"
            };
            crate::metrics::record_reconciliation_requeue(KIND_DOMAIN, reason);
            Ok(Action::requeue(delay))
        }
        Err(e) => {
            crate::metrics::record_reconciliation_error(KIND_DOMAIN, start.elapsed());
            crate::metrics::record_error(KIND_DOMAIN, e.error_type());
            Err(e)
        }
    }
}

/// Requeue a failed key on the short interval.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
fn error_policy(_domain: Arc<Domain>, err: &ReconcileError, ctx: Arc<Context>) -> Action {
    let retry_after = ctx.config.intervals.pending;
    error!(
        domain = %err.key(),
        error = %err,
        transient = err.is_transient(),
        "Reconciliation error - will retry in {}s",
        retry_after.as_secs()
    );
    crate::metrics::record_reconciliation_requeue(KIND_DOMAIN, "error");
    Action::requeue(retry_after)
}

#[cfg(test)]
#[path = "domain_controller_tests.rs"]
mod domain_controller_tests;
