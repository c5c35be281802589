// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{DnsStatus, Domain, DomainStatus};
    use crate::reconcilers::test_fixtures::{acme_domain, acme_key};

    #[test]
    fn test_status_patch_carries_resource_version_and_full_status() {
        let mut domain = acme_domain();
        domain.metadata.resource_version = Some("42".to_string());
        domain.status = Some(DomainStatus {
            dns: DnsStatus {
                dkim: true,
                stats: false,
                spf: true,
            },
            observed_generation: Some(1),
        });

        let patch = status_patch("Domain", &domain).unwrap();

        assert_eq!(
            patch,
            json!({
                "metadata": { "resourceVersion": "42" },
                "status": {
                    "dns": { "dkim": true, "stats": false, "spf": true },
                    "observedGeneration": 1,
                },
            })
        );
    }

    #[test]
    fn test_status_patch_does_not_touch_spec() {
        let mut domain = acme_domain();
        domain.metadata.resource_version = Some("7".to_string());
        domain.status = Some(DomainStatus::default());

        let patch = status_patch("Domain", &domain).unwrap();

        assert!(patch.get("spec").is_none());
        assert_eq!(patch["status"]["dns"]["stats"], json!(false));
    }

    #[test]
    fn test_status_patch_requires_resource_version() {
        let domain: Domain = acme_domain();

        let err = status_patch("Domain", &domain).unwrap_err();

        assert!(matches!(err, StoreError::InvalidObject { .. }));
    }

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(
            kube::core::Status::failure(&format!("request failed with {code}"), "Test")
                .with_code(code)
                .boxed(),
        )
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify("Ingress".to_string(), &acme_key(), api_error(404));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_classify_conflict() {
        let err = classify("Domain".to_string(), &acme_key(), api_error(409));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_classify_other_api_errors() {
        for code in [400, 403, 500, 503] {
            let err = classify("Domain".to_string(), &acme_key(), api_error(code));
            assert!(
                matches!(err, StoreError::Api { .. }),
                "code {code} should map to Api, got {err:?}"
            );
        }
    }
}
