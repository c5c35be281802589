// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration.
//!
//! Every setting can be given as a command-line flag or an environment variable.
//! [`OperatorArgs::validate`] runs at startup, before any controller is started.

use crate::constants::{
    CONVERGED_REQUEUE_SECS, DEFAULT_DNS_SERVER, DEFAULT_DNS_TIMEOUT_SECS,
    DEFAULT_RECONCILE_TIMEOUT_SECS, DEFAULT_SPF_INCLUDE, DEFAULT_STATS_SERVICE_NAME,
    DEFAULT_STATS_SERVICE_PORT, METRICS_SERVER_PORT, PENDING_REQUEUE_SECS,
};
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Invalid configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{flag} must not be empty")]
    Empty { flag: &'static str },

    #[error("{flag} must be greater than zero")]
    Zero { flag: &'static str },

    #[error("--converged-requeue-secs ({converged}) must not be shorter than --pending-requeue-secs ({pending})")]
    IntervalOrder { converged: u64, pending: u64 },
}

/// Command-line arguments of the operator binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct OperatorArgs {
    /// Service receiving traffic from the stats ingresses
    #[arg(long, env = "STATS_SERVICE_NAME", default_value = DEFAULT_STATS_SERVICE_NAME)]
    pub stats_service_name: String,

    /// Port of the stats service
    #[arg(long, env = "STATS_SERVICE_PORT", default_value_t = DEFAULT_STATS_SERVICE_PORT)]
    pub stats_service_port: u16,

    /// Ingress class set on stats ingresses (cluster default when unset)
    #[arg(long, env = "INGRESS_CLASS")]
    pub ingress_class: Option<String>,

    /// Recursive resolver used for DNS checks
    #[arg(long, env = "DNS_SERVER", default_value = DEFAULT_DNS_SERVER)]
    pub dns_server: SocketAddr,

    /// Per-query DNS timeout in seconds
    #[arg(long, env = "DNS_TIMEOUT_SECS", default_value_t = DEFAULT_DNS_TIMEOUT_SECS)]
    pub dns_timeout_secs: u64,

    /// Include mechanism every SPF policy must contain
    #[arg(long, env = "SPF_INCLUDE", default_value = DEFAULT_SPF_INCLUDE)]
    pub spf_include: String,

    /// Address the base domain must resolve to for the stats check (any address when empty)
    #[arg(long = "stats-ingress-address", env = "STATS_INGRESS_ADDRESSES", value_delimiter = ',')]
    pub stats_ingress_addresses: Vec<Ipv4Addr>,

    /// Requeue interval once every DNS check passes
    #[arg(long, env = "CONVERGED_REQUEUE_SECS", default_value_t = CONVERGED_REQUEUE_SECS)]
    pub converged_requeue_secs: u64,

    /// Requeue interval while a check fails, and after errors
    #[arg(long, env = "PENDING_REQUEUE_SECS", default_value_t = PENDING_REQUEUE_SECS)]
    pub pending_requeue_secs: u64,

    /// Deadline of a single reconciliation pass
    #[arg(long, env = "RECONCILE_TIMEOUT_SECS", default_value_t = DEFAULT_RECONCILE_TIMEOUT_SECS)]
    pub reconcile_timeout_secs: u64,

    /// Only watch `Domain` resources in this namespace (all namespaces when unset)
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Port of the metrics and health server
    #[arg(long, env = "METRICS_PORT", default_value_t = METRICS_SERVER_PORT)]
    pub metrics_port: u16,
}

impl OperatorArgs {
    /// Check values clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stats_service_name.trim().is_empty() {
            return Err(ConfigError::Empty {
                flag: "--stats-service-name",
            });
        }
        if self.spf_include.trim().is_empty() {
            return Err(ConfigError::Empty {
                flag: "--spf-include",
            });
        }

        let non_zero = [
            ("--stats-service-port", u64::from(self.stats_service_port)),
            ("--dns-timeout-secs", self.dns_timeout_secs),
            ("--converged-requeue-secs", self.converged_requeue_secs),
            ("--pending-requeue-secs", self.pending_requeue_secs),
            ("--reconcile-timeout-secs", self.reconcile_timeout_secs),
            ("--metrics-port", u64::from(self.metrics_port)),
        ];
        if let Some((flag, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { flag: *flag });
        }

        if self.converged_requeue_secs < self.pending_requeue_secs {
            return Err(ConfigError::IntervalOrder {
                converged: self.converged_requeue_secs,
                pending: self.pending_requeue_secs,
            });
        }

        Ok(())
    }

    /// Settings consumed by the reconcilers.
    #[must_use]
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            stats_backend: StatsBackend {
                service_name: self.stats_service_name.clone(),
                service_port: self.stats_service_port,
                ingress_class: self.ingress_class.clone(),
            },
            intervals: RequeueIntervals {
                converged: Duration::from_secs(self.converged_requeue_secs),
                pending: Duration::from_secs(self.pending_requeue_secs),
            },
            pass_timeout: Duration::from_secs(self.reconcile_timeout_secs),
        }
    }

    /// Settings consumed by the DNS checker.
    #[must_use]
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            dns_server: self.dns_server,
            dns_timeout: Duration::from_secs(self.dns_timeout_secs),
            spf_include: self.spf_include.trim().to_string(),
            stats_ingress_addresses: self.stats_ingress_addresses.clone(),
        }
    }
}

/// Backend of every stats ingress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsBackend {
    pub service_name: String,
    pub service_port: u16,
    pub ingress_class: Option<String>,
}

impl Default for StatsBackend {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_STATS_SERVICE_NAME.to_string(),
            service_port: DEFAULT_STATS_SERVICE_PORT,
            ingress_class: None,
        }
    }
}

/// The two requeue tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequeueIntervals {
    /// Used once a domain is fully converged
    pub converged: Duration,
    /// Used while a check fails and after any error
    pub pending: Duration,
}

impl Default for RequeueIntervals {
    fn default() -> Self {
        Self {
            converged: Duration::from_secs(CONVERGED_REQUEUE_SECS),
            pending: Duration::from_secs(PENDING_REQUEUE_SECS),
        }
    }
}

/// Configuration shared by every reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    pub stats_backend: StatsBackend,
    pub intervals: RequeueIntervals,
    pub pass_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            stats_backend: StatsBackend::default(),
            intervals: RequeueIntervals::default(),
            pass_timeout: Duration::from_secs(DEFAULT_RECONCILE_TIMEOUT_SECS),
        }
    }
}

/// Configuration of the resolver-backed DNS checker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    pub dns_server: SocketAddr,
    pub dns_timeout: Duration,
    pub spf_include: String,
    pub stats_ingress_addresses: Vec<Ipv4Addr>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
