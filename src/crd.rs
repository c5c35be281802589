// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for mail domains.
//!
//! A [`Domain`] declares a sending domain and the DKIM key published for it. The
//! operator owns the status subresource: every reconciliation replaces it with the
//! result of the latest DNS checks.
//!
//! # Example
//!
//! ```rust,no_run
//! use maildomain_operator::crd::{DkimConfig, Domain, DomainSpec};
//!
//! let domain = Domain::new(
//!     "acme",
//!     DomainSpec {
//!         base_domain: "mail.acme.com".to_string(),
//!         dkim: DkimConfig {
//!             selector: "kannon".to_string(),
//!             public_key: "MIIBIjANBgkqh...".to_string(),
//!         },
//!     },
//! );
//! assert!(domain.status.is_none());
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// DKIM signing configuration for a domain.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DkimConfig {
    /// DKIM selector. The public key is expected at `<selector>._domainkey.<baseDomain>`.
    #[schemars(regex(pattern = r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"))]
    pub selector: String,

    /// Base64 public key that must appear as the `p=` tag of the DKIM TXT record.
    pub public_key: String,
}

/// `Domain` declares a mail sending domain whose DNS setup is verified by the operator.
///
/// # Example
///
/// ```yaml
/// apiVersion: mail.firestoned.io/v1alpha1
/// kind: Domain
/// metadata:
///   name: acme
///   namespace: mail
/// spec:
///   baseDomain: mail.acme.com
///   dkim:
///     selector: kannon
///     publicKey: MIIBIjANBgkqh...
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "mail.firestoned.io",
    version = "v1alpha1",
    kind = "Domain",
    namespaced,
    shortname = "mdom",
    doc = "Domain declares a mail sending domain. The operator checks its DKIM, SPF and stats DNS records and publishes a stats Ingress once the stats record resolves.",
    printcolumn = r#"{"name":"Base Domain","type":"string","jsonPath":".spec.baseDomain"}"#,
    printcolumn = r#"{"name":"DKIM","type":"boolean","jsonPath":".status.dns.dkim"}"#,
    printcolumn = r#"{"name":"SPF","type":"boolean","jsonPath":".status.dns.spf"}"#,
    printcolumn = r#"{"name":"Stats","type":"boolean","jsonPath":".status.dns.stats"}"#
)]
#[kube(status = "DomainStatus")]
#[serde(rename_all = "camelCase")]
pub struct DomainSpec {
    /// Sending domain (e.g., "mail.example.com"). Also the host served by the stats ingress.
    #[schemars(regex(
        pattern = r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ))]
    pub base_domain: String,

    /// DKIM configuration used to validate the published DKIM record.
    pub dkim: DkimConfig,
}

/// Results of the DNS checks for a domain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
pub struct DnsStatus {
    /// DKIM TXT record is published with the configured public key.
    pub dkim: bool,
    /// The base domain resolves to the stats endpoint.
    pub stats: bool,
    /// SPF policy delegates to the configured include.
    pub spf: bool,
}

impl DnsStatus {
    /// `true` once every check passes and nothing is left to correct.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.dkim && self.stats && self.spf
    }
}

/// `Domain` status.
///
/// All fields are always serialized so a status write replaces the previous value
/// entirely.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainStatus {
    #[serde(default)]
    pub dns: DnsStatus,
    #[serde(default)]
    pub observed_generation: Option<i64>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
