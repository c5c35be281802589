// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! [`DnsChecker`] that queries a recursive resolver with hickory-client.
//!
//! Queries go over UDP using the synchronous client on the blocking pool. Each
//! lookup is bounded twice: by the UDP socket timeout, and by an async timeout so
//! the reconciliation pass returns promptly even if the blocking call lingers.

use super::records::{dkim_matches, dkim_record_name, fqdn, spf_matches, stats_addresses_match};
use super::DnsChecker;
use crate::config::ProbeConfig;
use crate::crd::Domain;
use crate::errors::ProbeError;
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{DNSClass, Name, RData, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Resolver-backed DNS checks.
#[derive(Clone, Debug)]
pub struct HickoryDnsChecker {
    server: SocketAddr,
    timeout: Duration,
    spf_include: String,
    stats_addresses: Vec<Ipv4Addr>,
}

impl HickoryDnsChecker {
    #[must_use]
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            server: config.dns_server,
            timeout: config.dns_timeout,
            spf_include: config.spf_include.clone(),
            stats_addresses: config.stats_ingress_addresses.clone(),
        }
    }

    /// Record data of every answer of `record_type` for `name`.
    ///
    /// NXDOMAIN and empty answers yield an empty list.
    async fn lookup(&self, name: &str, record_type: RecordType) -> Result<Vec<RData>, ProbeError> {
        let name = fqdn(name);
        let server = self.server;
        let timeout = self.timeout;

        debug!(name = %name, record_type = %record_type, server = %server, "Querying DNS");

        let query_name = name.clone();
        let task = tokio::task::spawn_blocking(move || {
            query_blocking(server, timeout, &query_name, record_type)
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ProbeError::LookupFailed {
                name,
                record_type: record_type.to_string(),
                server: server.to_string(),
                reason: format!("DNS query task failed: {join_error}"),
            }),
            Err(_) => Err(ProbeError::Timeout {
                name,
                record_type: record_type.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// TXT answers for `name`, each with its character-strings joined.
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ProbeError> {
        let answers = self.lookup(name, RecordType::TXT).await?;
        Ok(answers
            .iter()
            .filter_map(|data| match data {
                RData::TXT(txt) => Some(
                    txt.txt_data()
                        .iter()
                        .map(|bytes| String::from_utf8_lossy(bytes))
                        .collect::<String>(),
                ),
                _ => None,
            })
            .collect())
    }
}

fn query_blocking(
    server: SocketAddr,
    timeout: Duration,
    name: &str,
    record_type: RecordType,
) -> Result<Vec<RData>, ProbeError> {
    let lookup_failed = |reason: String| ProbeError::LookupFailed {
        name: name.to_string(),
        record_type: record_type.to_string(),
        server: server.to_string(),
        reason,
    };

    let query_name = Name::from_str(name).map_err(|e| ProbeError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let conn = UdpClientConnection::with_timeout(server, timeout)
        .map_err(|e| lookup_failed(format!("failed to create UDP connection: {e}")))?;
    let client = SyncClient::new(conn);

    let response = client
        .query(&query_name, DNSClass::IN, record_type)
        .map_err(|e| lookup_failed(e.to_string()))?;

    match response.response_code() {
        ResponseCode::NoError => Ok(response
            .answers()
            .iter()
            .filter(|record| record.record_type() == record_type)
            .filter_map(|record| record.data().cloned())
            .collect()),
        ResponseCode::NXDomain => Ok(Vec::new()),
        code => Err(lookup_failed(format!("server answered {code}"))),
    }
}

#[async_trait]
impl DnsChecker for HickoryDnsChecker {
    async fn check_dkim(&self, domain: &Domain) -> Result<bool, ProbeError> {
        let name = dkim_record_name(&domain.spec.dkim.selector, &domain.spec.base_domain);
        let records = self.lookup_txt(&name).await?;
        Ok(records
            .iter()
            .any(|txt| dkim_matches(txt, &domain.spec.dkim.public_key)))
    }

    async fn check_stats_dns(&self, domain: &Domain) -> Result<bool, ProbeError> {
        let answers = self.lookup(&domain.spec.base_domain, RecordType::A).await?;
        let resolved: Vec<Ipv4Addr> = answers
            .iter()
            .filter_map(|data| match data {
                RData::A(a) => Some(a.0),
                _ => None,
            })
            .collect();
        Ok(stats_addresses_match(&resolved, &self.stats_addresses))
    }

    async fn check_spf(&self, domain: &Domain) -> Result<bool, ProbeError> {
        let records = self.lookup_txt(&domain.spec.base_domain).await?;
        Ok(records
            .iter()
            .any(|txt| spf_matches(txt, &self.spf_include)))
    }
}

#[cfg(test)]
#[path = "hickory_tests.rs"]
mod hickory_tests;
