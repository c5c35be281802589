// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record names and record-content matching used by the DNS checks.
//!
//! These functions are pure so the matching rules can be tested without a resolver.

use crate::constants::{DKIM_DOMAIN_KEY_LABEL, SPF_VERSION_TAG};
use std::net::Ipv4Addr;

/// Name of the DKIM TXT record: `<selector>._domainkey.<base_domain>`.
#[must_use]
pub fn dkim_record_name(selector: &str, base_domain: &str) -> String {
    format!(
        "{selector}.{DKIM_DOMAIN_KEY_LABEL}.{}",
        base_domain.trim_end_matches('.')
    )
}

/// Fully qualified form of `name` (trailing dot), as expected by the resolver.
#[must_use]
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Whether a DKIM TXT value carries `public_key` as its `p=` tag.
///
/// Long keys are split over several character-strings and often re-wrapped with
/// whitespace, so whitespace is ignored on both sides.
#[must_use]
pub fn dkim_matches(txt: &str, public_key: &str) -> bool {
    let expected: String = public_key.split_whitespace().collect();
    if expected.is_empty() {
        return false;
    }

    txt.split(';')
        .filter_map(|tag| tag.split_once('='))
        .any(|(name, value)| {
            name.trim() == "p" && value.split_whitespace().collect::<String>() == expected
        })
}

/// Whether an SPF TXT value is a `v=spf1` policy containing `include:<include>`.
#[must_use]
pub fn spf_matches(txt: &str, include: &str) -> bool {
    let mut terms = txt.split_whitespace();
    if !terms
        .next()
        .is_some_and(|tag| tag.eq_ignore_ascii_case(SPF_VERSION_TAG))
    {
        return false;
    }

    let wanted = include.trim_end_matches('.');
    terms.any(|term| {
        // Qualifiers (+, ?, ~, -) may prefix any mechanism.
        let term = term.trim_start_matches(['+', '?', '~', '-']);
        term.split_once(':').is_some_and(|(mechanism, domain)| {
            mechanism.eq_ignore_ascii_case("include")
                && domain.trim_end_matches('.').eq_ignore_ascii_case(wanted)
        })
    })
}

/// Whether the addresses a name resolved to satisfy the stats check.
///
/// With no expected addresses any resolution passes; otherwise one of the resolved
/// addresses must be expected.
#[must_use]
pub fn stats_addresses_match(resolved: &[Ipv4Addr], expected: &[Ipv4Addr]) -> bool {
    if resolved.is_empty() {
        return false;
    }
    expected.is_empty() || resolved.iter().any(|addr| expected.contains(addr))
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
