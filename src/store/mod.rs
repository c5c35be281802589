// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource store abstraction used by the reconcilers.
//!
//! Reconcilers never talk to a process-wide client. They receive one
//! [`ResourceStore`] per resource kind at construction time:
//!
//! - [`KubeStore`] - backed by the Kubernetes API server
//! - [`MemoryStore`] - in-process store with resource versions, used in tests
//!
//! Status updates are optimistic: the object's `resourceVersion` must match the
//! stored one, otherwise the store fails with [`StoreError::Conflict`].

pub mod cluster;
pub mod memory;

pub use cluster::KubeStore;
pub use memory::MemoryStore;

use crate::errors::StoreError;
use async_trait::async_trait;
use kube::ResourceExt;
use std::fmt;

/// Namespace-scoped identity of an object.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of a namespaced object, or `None` when name or namespace is unset.
    #[must_use]
    pub fn of<K: ResourceExt>(obj: &K) -> Option<Self> {
        let name = obj.meta().name.clone()?;
        let namespace = obj.namespace()?;
        Some(Self { namespace, name })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Read/write access to objects of one kind.
#[async_trait]
pub trait ResourceStore<K>: Send + Sync
where
    K: Send + Sync,
{
    /// Fetch an object. `Ok(None)` when it does not exist.
    async fn get(&self, key: &ObjectKey) -> Result<Option<K>, StoreError>;

    /// Create an object. Fails with a conflict if it already exists.
    async fn create(&self, obj: &K) -> Result<(), StoreError>;

    /// Delete an object. Fails with `NotFound` if it is already gone.
    async fn delete(&self, obj: &K) -> Result<(), StoreError>;

    /// Replace the status of an object, guarded by its `resourceVersion`.
    async fn update_status(&self, obj: &K) -> Result<(), StoreError>;
}

/// Key of `obj`, or an `InvalidObject` error naming what is missing.
pub(crate) fn require_key<K: ResourceExt>(kind: &str, obj: &K) -> Result<ObjectKey, StoreError> {
    ObjectKey::of(obj).ok_or_else(|| StoreError::InvalidObject {
        kind: kind.to_string(),
        reason: "object must have a name and a namespace".to_string(),
    })
}
