// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label constants applied to resources created by the operator.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

// ============================================================================
// Label Values
// ============================================================================

/// Value for `app.kubernetes.io/part-of`
pub const PART_OF_MAILDOMAIN: &str = "maildomain-operator";

/// Value for `app.kubernetes.io/managed-by` on resources owned by a `Domain`
pub const MANAGED_BY_DOMAIN: &str = "Domain";

/// Component value for stats ingresses
pub const COMPONENT_STATS_INGRESS: &str = "stats-ingress";
