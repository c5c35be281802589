// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-process [`ResourceStore`] with API-server-like versioning.
//!
//! Every write bumps a store-wide resource version, `create` assigns a uid, and
//! `update_status` rejects objects whose `resourceVersion` is stale. Write counters
//! let tests assert that a pass performed no mutation.

use super::{require_key, ObjectKey, ResourceStore};
use crate::errors::StoreError;
use async_trait::async_trait;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Number of successful writes per operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub creates: u64,
    pub deletes: u64,
    pub status_updates: u64,
}

impl WriteCounts {
    /// Total number of writes.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.creates + self.deletes + self.status_updates
    }
}

struct State<K> {
    objects: BTreeMap<ObjectKey, K>,
    version: u64,
    writes: WriteCounts,
}

impl<K: Resource> State<K> {
    fn stamp(&mut self, obj: &mut K) {
        self.version += 1;
        obj.meta_mut().resource_version = Some(self.version.to_string());
        if obj.meta().uid.is_none() {
            obj.meta_mut().uid = Some(format!("uid-{}", self.version));
        }
    }
}

/// In-memory store for one resource kind.
pub struct MemoryStore<K> {
    state: Mutex<State<K>>,
}

impl<K> Default for MemoryStore<K> {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                objects: BTreeMap::new(),
                version: 0,
                writes: WriteCounts::default(),
            }),
        }
    }
}

impl<K> MemoryStore<K>
where
    K: Resource<DynamicType = ()> + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn kind() -> String {
        K::kind(&()).to_string()
    }

    /// Seed an object without counting it as a write. Returns the stored copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the object has no name or namespace.
    pub async fn insert(&self, mut obj: K) -> Result<K, StoreError> {
        let key = require_key(&Self::kind(), &obj)?;
        let mut state = self.state.lock().await;
        state.stamp(&mut obj);
        state.objects.insert(key, obj.clone());
        Ok(obj)
    }

    /// Simulate a write by another client, making previously read copies stale.
    pub async fn bump_resource_version(&self, key: &ObjectKey) {
        let mut state = self.state.lock().await;
        if let Some(mut obj) = state.objects.remove(key) {
            state.stamp(&mut obj);
            state.objects.insert(key.clone(), obj);
        }
    }

    /// Writes performed through the [`ResourceStore`] interface so far.
    pub async fn writes(&self) -> WriteCounts {
        self.state.lock().await.writes
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.state.lock().await.objects.len()
    }

    /// `true` when no object is stored.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.objects.is_empty()
    }
}

#[async_trait]
impl<K> ResourceStore<K> for MemoryStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<Option<K>, StoreError> {
        Ok(self.state.lock().await.objects.get(key).cloned())
    }

    async fn create(&self, obj: &K) -> Result<(), StoreError> {
        let key = require_key(&Self::kind(), obj)?;
        let mut state = self.state.lock().await;

        if state.objects.contains_key(&key) {
            return Err(StoreError::Conflict {
                kind: Self::kind(),
                key,
                reason: "already exists".to_string(),
            });
        }

        let mut stored = obj.clone();
        stored.meta_mut().uid = None;
        state.stamp(&mut stored);
        state.objects.insert(key, stored);
        state.writes.creates += 1;
        Ok(())
    }

    async fn delete(&self, obj: &K) -> Result<(), StoreError> {
        let key = require_key(&Self::kind(), obj)?;
        let mut state = self.state.lock().await;

        let Some(existing) = state.objects.get(&key) else {
            return Err(StoreError::NotFound {
                kind: Self::kind(),
                key,
            });
        };

        if obj.uid().is_some() && existing.uid() != obj.uid() {
            return Err(StoreError::Conflict {
                kind: Self::kind(),
                key,
                reason: "uid precondition failed".to_string(),
            });
        }

        state.objects.remove(&key);
        state.writes.deletes += 1;
        Ok(())
    }

    async fn update_status(&self, obj: &K) -> Result<(), StoreError> {
        let key = require_key(&Self::kind(), obj)?;
        let mut state = self.state.lock().await;

        let Some(existing) = state.objects.get(&key) else {
            return Err(StoreError::NotFound {
                kind: Self::kind(),
                key,
            });
        };

        if existing.resource_version() != obj.resource_version() {
            return Err(StoreError::Conflict {
                kind: Self::kind(),
                key,
                reason: format!(
                    "resourceVersion {:?} is stale, current is {:?}",
                    obj.resource_version(),
                    existing.resource_version()
                ),
            });
        }

        let mut stored = obj.clone();
        state.stamp(&mut stored);
        state.objects.insert(key, stored);
        state.writes.status_updates += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
