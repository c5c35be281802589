// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for reconciler and probe tests: a scripted DNS checker and an
//! in-memory context seeded with the `acme` domain.

use crate::config::ReconcilerConfig;
use crate::context::Context;
use crate::crd::{DkimConfig, Domain, DomainSpec};
use crate::errors::{Check, ProbeError, StoreError};
use crate::probe::DnsChecker;
use crate::store::{MemoryStore, ObjectKey, ResourceStore};
use async_trait::async_trait;
use k8s_openapi::api::networking::v1::Ingress;
use kube::Resource;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NAMESPACE: &str = "mail";
pub const DOMAIN_NAME: &str = "acme";
pub const BASE_DOMAIN: &str = "mail.acme.com";

struct Script {
    dkim: Result<bool, ProbeError>,
    stats: Result<bool, ProbeError>,
    spf: Result<bool, ProbeError>,
    delay: Option<Duration>,
    calls: Vec<Check>,
}

/// [`DnsChecker`] returning preset results and recording which checks ran.
pub struct ScriptedChecker {
    script: Mutex<Script>,
}

impl ScriptedChecker {
    pub fn new(dkim: bool, stats: bool, spf: bool) -> Self {
        Self {
            script: Mutex::new(Script {
                dkim: Ok(dkim),
                stats: Ok(stats),
                spf: Ok(spf),
                delay: None,
                calls: Vec::new(),
            }),
        }
    }

    pub fn passing() -> Self {
        Self::new(true, true, true)
    }

    /// Set the result of one check.
    pub fn set(&self, check: Check, result: Result<bool, ProbeError>) {
        let mut script = self.script.lock().unwrap();
        match check {
            Check::Dkim => script.dkim = result,
            Check::StatsDns => script.stats = result,
            Check::Spf => script.spf = result,
        }
    }

    /// Make the lookup of `check` fail.
    pub fn fail(&self, check: Check) {
        self.set(check, Err(lookup_error(check)));
    }

    /// Sleep this long inside every check.
    pub fn set_delay(&self, delay: Duration) {
        self.script.lock().unwrap().delay = Some(delay);
    }

    /// Checks run so far, in order.
    pub fn calls(&self) -> Vec<Check> {
        self.script.lock().unwrap().calls.clone()
    }

    async fn run(&self, check: Check) -> Result<bool, ProbeError> {
        let (result, delay) = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(check);
            let result = match check {
                Check::Dkim => script.dkim.clone(),
                Check::StatsDns => script.stats.clone(),
                Check::Spf => script.spf.clone(),
            };
            (result, script.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

#[async_trait]
impl DnsChecker for ScriptedChecker {
    async fn check_dkim(&self, _domain: &Domain) -> Result<bool, ProbeError> {
        self.run(Check::Dkim).await
    }

    async fn check_stats_dns(&self, _domain: &Domain) -> Result<bool, ProbeError> {
        self.run(Check::StatsDns).await
    }

    async fn check_spf(&self, _domain: &Domain) -> Result<bool, ProbeError> {
        self.run(Check::Spf).await
    }
}

pub fn lookup_error(check: Check) -> ProbeError {
    ProbeError::LookupFailed {
        name: format!("{check}.{BASE_DOMAIN}."),
        record_type: "TXT".to_string(),
        server: "127.0.0.1:53".to_string(),
        reason: "SERVFAIL".to_string(),
    }
}

/// Unpersisted `acme` domain (no uid, no resource version).
pub fn acme_domain() -> Domain {
    let mut domain = Domain::new(
        DOMAIN_NAME,
        DomainSpec {
            base_domain: BASE_DOMAIN.to_string(),
            dkim: DkimConfig {
                selector: "kannon".to_string(),
                public_key: "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEA".to_string(),
            },
        },
    );
    domain.metadata.namespace = Some(NAMESPACE.to_string());
    domain.metadata.generation = Some(1);
    domain
}

pub fn acme_key() -> ObjectKey {
    ObjectKey::new(NAMESPACE, DOMAIN_NAME)
}

pub fn stats_key() -> ObjectKey {
    ObjectKey::new(NAMESPACE, format!("{DOMAIN_NAME}-stats"))
}

/// Store whose reads return a fixed snapshot while writes go to `inner`,
/// like a watch cache that lags behind the API server.
pub struct LaggingStore<K> {
    pub inner: MemoryStore<K>,
    snapshot: Mutex<Option<K>>,
}

impl<K> LaggingStore<K>
where
    K: Resource<DynamicType = ()> + Clone,
{
    pub fn new(snapshot: Option<K>) -> Self {
        Self {
            inner: MemoryStore::new(),
            snapshot: Mutex::new(snapshot),
        }
    }
}

#[async_trait]
impl<K> ResourceStore<K> for LaggingStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    async fn get(&self, _key: &ObjectKey) -> Result<Option<K>, StoreError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn create(&self, obj: &K) -> Result<(), StoreError> {
        self.inner.create(obj).await
    }

    async fn delete(&self, obj: &K) -> Result<(), StoreError> {
        self.inner.delete(obj).await
    }

    async fn update_status(&self, obj: &K) -> Result<(), StoreError> {
        self.inner.update_status(obj).await
    }
}

/// In-memory stores, a scripted checker and a context wired to them.
pub struct Harness {
    pub domains: Arc<MemoryStore<Domain>>,
    pub ingresses: Arc<MemoryStore<Ingress>>,
    pub checker: Arc<ScriptedChecker>,
    pub ctx: Context,
}

impl Harness {
    /// Harness with the `acme` domain already stored.
    pub async fn with_acme(checker: ScriptedChecker) -> Self {
        let harness = Self::empty(checker);
        harness.domains.insert(acme_domain()).await.unwrap();
        harness
    }

    pub fn empty(checker: ScriptedChecker) -> Self {
        Self::with_config(checker, ReconcilerConfig::default())
    }

    pub fn with_config(checker: ScriptedChecker, config: ReconcilerConfig) -> Self {
        let domains = Arc::new(MemoryStore::<Domain>::new());
        let ingresses = Arc::new(MemoryStore::<Ingress>::new());
        let checker = Arc::new(checker);
        let ctx = Context::new(domains.clone(), ingresses.clone(), checker.clone(), config);
        Self {
            domains,
            ingresses,
            checker,
            ctx,
        }
    }

    /// Current stored `acme` domain.
    pub async fn acme(&self) -> Domain {
        self.domains.get(&acme_key()).await.unwrap().unwrap()
    }

    /// Context sharing this harness' domains and checker, with `ingresses` swapped in.
    pub fn ctx_with_ingresses(&self, ingresses: Arc<dyn ResourceStore<Ingress>>) -> Context {
        Context::new(
            self.domains.clone(),
            ingresses,
            self.checker.clone(),
            self.ctx.config.clone(),
        )
    }

    /// Current stored `acme-stats` ingress, if any.
    pub async fn stats_ingress(&self) -> Option<Ingress> {
        self.ingresses.get(&stats_key()).await.unwrap()
    }
}
