// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! [`ResourceStore`] backed by the Kubernetes API server.
//!
//! Status writes are merge patches on the status subresource that carry the
//! object's `metadata.resourceVersion`. The API server rejects the patch with
//! `409 Conflict` if the object changed since it was read, which gives the
//! optimistic-concurrency behaviour the reconcilers rely on.

use super::{require_key, ObjectKey, ResourceStore};
use crate::constants::FIELD_MANAGER;
use crate::errors::StoreError;
use async_trait::async_trait;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams, Preconditions};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

/// Store for one namespaced resource kind, using a shared [`Client`].
pub struct KubeStore<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeStore<K> {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned,
{
    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn kind() -> String {
        K::kind(&()).to_string()
    }
}

/// Map a client error onto the store taxonomy.
fn classify(kind: String, key: &ObjectKey, err: kube::Error) -> StoreError {
    let code = match &err {
        kube::Error::Api(ae) => Some(ae.code),
        _ => None,
    };

    match code {
        Some(404) => StoreError::NotFound {
            kind,
            key: key.clone(),
        },
        Some(409) => StoreError::Conflict {
            kind,
            key: key.clone(),
            reason: err.to_string(),
        },
        _ => StoreError::Api {
            kind,
            key: key.clone(),
            source: err,
        },
    }
}

/// Build the merge patch used for a guarded status replace.
///
/// # Errors
///
/// Returns an error if the object has no `resourceVersion` or cannot be serialized.
pub fn status_patch<K>(kind: &str, obj: &K) -> Result<Value, StoreError>
where
    K: Resource + Serialize,
{
    let resource_version =
        obj.meta()
            .resource_version
            .clone()
            .ok_or_else(|| StoreError::InvalidObject {
                kind: kind.to_string(),
                reason: "status update requires metadata.resourceVersion".to_string(),
            })?;

    let value = serde_json::to_value(obj).map_err(|source| StoreError::Serialization {
        kind: kind.to_string(),
        source,
    })?;
    let status = value.get("status").cloned().unwrap_or(Value::Null);

    Ok(json!({
        "metadata": { "resourceVersion": resource_version },
        "status": status,
    }))
}

#[async_trait]
impl<K> ResourceStore<K> for KubeStore<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<Option<K>, StoreError> {
        self.api(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(|e| classify(Self::kind(), key, e))
    }

    async fn create(&self, obj: &K) -> Result<(), StoreError> {
        let key = require_key(&Self::kind(), obj)?;
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PostParams::default()
        };

        self.api(&key.namespace)
            .create(&params, obj)
            .await
            .map_err(|e| classify(Self::kind(), &key, e))?;

        debug!(kind = %Self::kind(), object = %key, "Created object");
        Ok(())
    }

    async fn delete(&self, obj: &K) -> Result<(), StoreError> {
        let key = require_key(&Self::kind(), obj)?;

        // Pin the uid so a recreated object with the same name is left alone.
        let params = DeleteParams {
            preconditions: Some(Preconditions {
                uid: obj.uid(),
                resource_version: None,
            }),
            ..DeleteParams::background()
        };

        self.api(&key.namespace)
            .delete(&key.name, &params)
            .await
            .map_err(|e| classify(Self::kind(), &key, e))?;

        debug!(kind = %Self::kind(), object = %key, "Deleted object");
        Ok(())
    }

    async fn update_status(&self, obj: &K) -> Result<(), StoreError> {
        let key = require_key(&Self::kind(), obj)?;
        let patch = status_patch(&Self::kind(), obj)?;

        self.api(&key.namespace)
            .patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| classify(Self::kind(), &key, e))?;

        debug!(kind = %Self::kind(), object = %key, "Replaced status");
        Ok(())
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod cluster_tests;
