// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;

    fn key() -> ObjectKey {
        ObjectKey::new("mail", "acme")
    }

    fn lookup_failed() -> ProbeError {
        ProbeError::LookupFailed {
            name: "kannon._domainkey.mail.acme.com.".to_string(),
            record_type: "TXT".to_string(),
            server: "1.1.1.1:53".to_string(),
            reason: "SERVFAIL".to_string(),
        }
    }

    #[test]
    fn test_probe_error_display() {
        assert_eq!(
            lookup_failed().to_string(),
            "TXT lookup for 'kannon._domainkey.mail.acme.com.' via 1.1.1.1:53 failed: SERVFAIL"
        );

        let timeout = ProbeError::Timeout {
            name: "mail.acme.com.".to_string(),
            record_type: "A".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(
            timeout.to_string(),
            "A lookup for 'mail.acme.com.' timed out after 5000ms"
        );
    }

    #[test]
    fn test_reconcile_error_carries_key_and_stage() {
        let err = ReconcileError::Probe {
            key: key(),
            check: Check::Dkim,
            source: lookup_failed(),
        };
        assert_eq!(err.key(), &key());
        assert_eq!(err.error_type(), "probe");
        assert!(err.to_string().starts_with("dkim check failed for Domain mail/acme"));

        let err = ReconcileError::Store {
            key: key(),
            stage: Stage::PersistStatus,
            source: StoreError::Conflict {
                kind: "Domain".to_string(),
                key: key(),
                reason: "stale".to_string(),
            },
        };
        assert_eq!(err.error_type(), "persist_status");
        assert!(err.to_string().contains("persist_status failed for Domain mail/acme"));
    }

    #[test]
    fn test_cancelled_error() {
        let err = ReconcileError::Cancelled {
            key: key(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.error_type(), "cancelled");
        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "Reconciliation of Domain mail/acme cancelled after 30s"
        );
    }

    #[test]
    fn test_only_invariant_errors_are_not_transient() {
        let invariant = ReconcileError::Invariant {
            key: key(),
            stage: Stage::ConvergeIngress,
            reason: "Domain has no uid".to_string(),
        };
        assert!(!invariant.is_transient());
        assert_eq!(invariant.error_type(), "converge_ingress");

        let store = ReconcileError::Store {
            key: key(),
            stage: Stage::Fetch,
            source: StoreError::NotFound {
                kind: "Domain".to_string(),
                key: key(),
            },
        };
        assert!(store.is_transient());
    }

    #[test]
    fn test_store_error_predicates() {
        let not_found = StoreError::NotFound {
            kind: "Ingress".to_string(),
            key: ObjectKey::new("mail", "acme-stats"),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_conflict());
        assert_eq!(not_found.to_string(), "Ingress mail/acme-stats not found");

        let conflict = StoreError::Conflict {
            kind: "Ingress".to_string(),
            key: ObjectKey::new("mail", "acme-stats"),
            reason: "already exists".to_string(),
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Check::StatsDns.to_string(), "stats_dns");
        assert_eq!(Stage::ConvergeIngress.as_str(), "converge_ingress");
    }
}
