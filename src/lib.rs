// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Mail Domain Operator for Kubernetes
//!
//! Kubernetes operator that verifies the DNS setup of mail sending domains.
//!
//! ## Overview
//!
//! For every `Domain` resource the operator repeatedly:
//!
//! - checks the DKIM, SPF and stats DNS records of the domain
//! - creates the `<name>-stats` Ingress while the stats record resolves, and
//!   deletes it when it stops resolving
//! - writes the check results to the `Domain` status
//! - rechecks hourly once every check passes, every minute otherwise
//!
//! ## Modules
//!
//! - [`crd`] - `Domain` Custom Resource Definition
//! - [`probe`] - DNS checks
//! - [`reconcilers`] - Reconciliation pass, stats ingress and requeue policy
//! - [`store`] - Resource store abstraction (API server or in-memory)
//! - [`domain_controller`] - kube-runtime controller wiring
//! - [`config`] - Command-line and environment configuration
//! - [`metrics`] - Prometheus metrics and their HTTP endpoint
//!
//! ## Example
//!
//! ```rust,no_run
//! use maildomain_operator::crd::{DkimConfig, DomainSpec};
//!
//! let spec = DomainSpec {
//!     base_domain: "mail.example.com".to_string(),
//!     dkim: DkimConfig {
//!         selector: "kannon".to_string(),
//!         public_key: "MIIBIjANBgkqh...".to_string(),
//!     },
//! };
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod domain_controller;
pub mod errors;
pub mod labels;
pub mod metrics;
pub mod probe;
pub mod reconcilers;
pub mod store;
