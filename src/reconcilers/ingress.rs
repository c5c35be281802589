// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Stats `Ingress` derived from a `Domain`.
//!
//! A domain whose stats record resolves gets one `Ingress` named
//! `<domain>-stats` that routes its base domain to the stats service. The
//! ingress exists only while the latest DNS check passes and is owned by the
//! domain, so the API server garbage-collects it when the domain is deleted.
//!
//! The existing ingress is never diffed against the canonical one: presence is
//! the only property this module converges.

use crate::config::StatsBackend;
use crate::constants::{
    API_GROUP_VERSION, KIND_DOMAIN, KIND_INGRESS, STATS_INGRESS_PATH, STATS_INGRESS_PATH_TYPE,
    STATS_INGRESS_SUFFIX,
};
use crate::context::Context;
use crate::crd::{DnsStatus, Domain};
use crate::errors::{ReconcileError, Stage};
use crate::labels::{
    COMPONENT_STATS_INGRESS, K8S_COMPONENT, K8S_INSTANCE, K8S_MANAGED_BY, K8S_PART_OF,
    MANAGED_BY_DOMAIN, PART_OF_MAILDOMAIN,
};
use crate::store::ObjectKey;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What [`reconcile_stats_ingress`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngressAction {
    /// Presence already matched the DNS status
    Unchanged,
    /// The ingress was created
    Created,
    /// The ingress was deleted, or was already gone when deleted
    Deleted,
    /// The ingress is already being deleted
    DeletionPending,
}

/// Name of the stats ingress of a domain.
#[must_use]
pub fn stats_ingress_name(domain_name: &str) -> String {
    format!("{domain_name}{STATS_INGRESS_SUFFIX}")
}

/// Standard labels of a stats ingress.
#[must_use]
pub fn build_stats_ingress_labels(domain_name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(K8S_MANAGED_BY.into(), MANAGED_BY_DOMAIN.into());
    labels.insert(K8S_PART_OF.into(), PART_OF_MAILDOMAIN.into());
    labels.insert(K8S_COMPONENT.into(), COMPONENT_STATS_INGRESS.into());
    labels.insert(K8S_INSTANCE.into(), domain_name.into());
    labels
}

/// Controller owner reference pointing at `domain`.
///
/// Returns `None` when the domain has no uid, which only happens for objects
/// that were never persisted.
#[must_use]
pub fn build_owner_reference(domain: &Domain) -> Option<OwnerReference> {
    Some(OwnerReference {
        api_version: API_GROUP_VERSION.to_string(),
        kind: KIND_DOMAIN.to_string(),
        name: domain.name_any(),
        uid: domain.metadata.uid.clone()?,
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

/// Canonical stats ingress of a domain.
///
/// One rule for the base domain, path `/` (prefix), backed by the configured
/// stats service.
///
/// # Errors
///
/// Returns [`ReconcileError::Invariant`] if the domain has no uid.
pub fn build_stats_ingress(
    key: &ObjectKey,
    domain: &Domain,
    backend: &StatsBackend,
) -> Result<Ingress, ReconcileError> {
    let owner = build_owner_reference(domain).ok_or_else(|| ReconcileError::Invariant {
        key: key.clone(),
        stage: Stage::ConvergeIngress,
        reason: "Domain has no uid, cannot set owner reference".to_string(),
    })?;

    let path = HTTPIngressPath {
        path: Some(STATS_INGRESS_PATH.to_string()),
        path_type: STATS_INGRESS_PATH_TYPE.to_string(),
        backend: IngressBackend {
            service: Some(IngressServiceBackend {
                name: backend.service_name.clone(),
                port: Some(ServiceBackendPort {
                    number: Some(i32::from(backend.service_port)),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
    };

    Ok(Ingress {
        metadata: ObjectMeta {
            name: Some(stats_ingress_name(&key.name)),
            namespace: Some(key.namespace.clone()),
            labels: Some(build_stats_ingress_labels(&key.name)),
            owner_references: Some(vec![owner]),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            ingress_class_name: backend.ingress_class.clone(),
            rules: Some(vec![IngressRule {
                host: Some(domain.spec.base_domain.clone()),
                http: Some(HTTPIngressRuleValue { paths: vec![path] }),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// `true` if another object controls `ingress`.
fn controlled_by_other(ingress: &Ingress, domain: &Domain) -> bool {
    let Some(uid) = domain.metadata.uid.as_deref() else {
        return false;
    };
    ingress
        .owner_references()
        .iter()
        .any(|owner| owner.controller == Some(true) && owner.uid != uid)
}

/// Make the stats ingress exist iff `status.stats` is true.
///
/// # Errors
///
/// Store failures and conflicts are returned as [`ReconcileError::Store`]. An
/// ingress controlled by another object is a [`ReconcileError::Invariant`].
pub async fn reconcile_stats_ingress(
    ctx: &Context,
    key: &ObjectKey,
    domain: &Domain,
    status: &DnsStatus,
) -> Result<IngressAction, ReconcileError> {
    let ingress_key = ObjectKey::new(&key.namespace, stats_ingress_name(&key.name));
    let store_error = |source| ReconcileError::Store {
        key: key.clone(),
        stage: Stage::ConvergeIngress,
        source,
    };

    let existing = ctx.ingresses.get(&ingress_key).await.map_err(store_error)?;

    if let Some(ingress) = &existing {
        if controlled_by_other(ingress, domain) {
            return Err(ReconcileError::Invariant {
                key: key.clone(),
                stage: Stage::ConvergeIngress,
                reason: format!("Ingress {ingress_key} is controlled by another object"),
            });
        }
    }

    match (existing, status.stats) {
        (Some(_), true) | (None, false) => {
            debug!(domain = %key, ingress = %ingress_key, stats = status.stats, "Stats ingress up to date");
            Ok(IngressAction::Unchanged)
        }
        (Some(ingress), false) => {
            if ingress.metadata.deletion_timestamp.is_some() {
                debug!(domain = %key, ingress = %ingress_key, "Stats ingress already being deleted");
                return Ok(IngressAction::DeletionPending);
            }

            match ctx.ingresses.delete(&ingress).await {
                Ok(()) => {
                    info!(domain = %key, ingress = %ingress_key, "Deleted stats ingress");
                    crate::metrics::record_resource_deleted(KIND_INGRESS);
                    Ok(IngressAction::Deleted)
                }
                Err(e) if e.is_not_found() => {
                    debug!(domain = %key, ingress = %ingress_key, "Stats ingress already gone");
                    Ok(IngressAction::Deleted)
                }
                Err(e) => Err(store_error(e)),
            }
        }
        (None, true) => {
            let ingress = build_stats_ingress(key, domain, &ctx.config.stats_backend)?;
            ctx.ingresses.create(&ingress).await.map_err(store_error)?;

            info!(
                domain = %key,
                ingress = %ingress_key,
                host = %domain.spec.base_domain,
                "Created stats ingress"
            );
            crate::metrics::record_resource_created(KIND_INGRESS);
            Ok(IngressAction::Created)
        }
    }
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod ingress_tests;
