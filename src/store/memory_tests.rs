// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{Domain, DomainStatus};
    use crate::reconcilers::test_fixtures::{acme_domain, acme_key};

    #[tokio::test]
    async fn test_insert_assigns_uid_and_version_without_counting_writes() {
        let store: MemoryStore<Domain> = MemoryStore::new();

        let stored = store.insert(acme_domain()).await.unwrap();

        assert!(stored.uid().is_some());
        assert!(stored.resource_version().is_some());
        assert_eq!(store.writes().await, WriteCounts::default());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store: MemoryStore<Domain> = MemoryStore::new();

        assert!(store.get(&acme_key()).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_twice_is_a_conflict() {
        let store: MemoryStore<Domain> = MemoryStore::new();
        store.create(&acme_domain()).await.unwrap();

        let err = store.create(&acme_domain()).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.writes().await.creates, 1);
    }

    #[tokio::test]
    async fn test_create_requires_namespace() {
        let store: MemoryStore<Domain> = MemoryStore::new();
        let mut domain = acme_domain();
        domain.metadata.namespace = None;

        let err = store.create(&domain).await.unwrap_err();

        assert!(matches!(err, StoreError::InvalidObject { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store: MemoryStore<Domain> = MemoryStore::new();

        let err = store.delete(&acme_domain()).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_checks_uid() {
        let store: MemoryStore<Domain> = MemoryStore::new();
        let stored = store.insert(acme_domain()).await.unwrap();

        let mut other = stored.clone();
        other.metadata.uid = Some("recreated".to_string());
        assert!(store.delete(&other).await.unwrap_err().is_conflict());

        store.delete(&stored).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(store.writes().await.deletes, 1);
    }

    #[tokio::test]
    async fn test_update_status_bumps_resource_version() {
        let store: MemoryStore<Domain> = MemoryStore::new();
        let mut domain = store.insert(acme_domain()).await.unwrap();
        let before = domain.resource_version();

        domain.status = Some(DomainStatus::default());
        store.update_status(&domain).await.unwrap();

        let stored = store.get(&acme_key()).await.unwrap().unwrap();
        assert_eq!(stored.status, Some(DomainStatus::default()));
        assert_ne!(stored.resource_version(), before);
        assert_eq!(stored.uid(), domain.uid());
        assert_eq!(store.writes().await.status_updates, 1);
    }

    #[tokio::test]
    async fn test_update_status_with_stale_version_is_a_conflict() {
        let store: MemoryStore<Domain> = MemoryStore::new();
        let mut domain = store.insert(acme_domain()).await.unwrap();
        store.bump_resource_version(&acme_key()).await;

        domain.status = Some(DomainStatus::default());
        let err = store.update_status(&domain).await.unwrap_err();

        assert!(err.is_conflict());
        let stored = store.get(&acme_key()).await.unwrap().unwrap();
        assert!(stored.status.is_none());
        assert_eq!(store.writes().await.total(), 0);
    }

    #[tokio::test]
    async fn test_update_status_missing_is_not_found() {
        let store: MemoryStore<Domain> = MemoryStore::new();
        let mut domain = acme_domain();
        domain.metadata.resource_version = Some("1".to_string());

        assert!(store.update_status(&domain).await.unwrap_err().is_not_found());
    }
}
