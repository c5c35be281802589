// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context passed to every reconciliation pass.
//!
//! The context holds the store handles, the DNS checker and the reconciler
//! configuration. The binary builds it once from a Kubernetes client; tests build
//! it from in-memory stores and a scripted checker.

use crate::config::{ProbeConfig, ReconcilerConfig};
use crate::crd::Domain;
use crate::probe::{DnsChecker, HickoryDnsChecker};
use crate::store::{KubeStore, ResourceStore};
use k8s_openapi::api::networking::v1::Ingress;
use kube::Client;
use std::sync::Arc;

/// Dependencies of the `Domain` reconciler.
#[derive(Clone)]
pub struct Context {
    /// `Domain` objects (read and status writes)
    pub domains: Arc<dyn ResourceStore<Domain>>,

    /// Stats ingresses (read, create and delete)
    pub ingresses: Arc<dyn ResourceStore<Ingress>>,

    /// DNS checks
    pub checker: Arc<dyn DnsChecker>,

    /// Backend, intervals and pass deadline
    pub config: ReconcilerConfig,
}

impl Context {
    #[must_use]
    pub fn new(
        domains: Arc<dyn ResourceStore<Domain>>,
        ingresses: Arc<dyn ResourceStore<Ingress>>,
        checker: Arc<dyn DnsChecker>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            domains,
            ingresses,
            checker,
            config,
        }
    }

    /// Production context: API-server stores and a resolver-backed checker.
    #[must_use]
    pub fn from_client(client: Client, probe: &ProbeConfig, config: ReconcilerConfig) -> Self {
        Self::new(
            Arc::new(KubeStore::<Domain>::new(client.clone())),
            Arc::new(KubeStore::<Ingress>::new(client)),
            Arc::new(HickoryDnsChecker::new(probe)),
            config,
        )
    }
}
