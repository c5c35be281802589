// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Delay before the next pass of a `Domain`.

use crate::config::RequeueIntervals;
use crate::crd::DnsStatus;
use std::time::Duration;

/// Delay until the next pass for a domain with the given DNS status.
///
/// Converged domains are rechecked on the long interval, anything else on the
/// short one. There is no backoff between the two tiers.
#[must_use]
pub fn next_interval(intervals: &RequeueIntervals, status: &DnsStatus) -> Duration {
    if status.is_converged() {
        intervals.converged
    } else {
        intervals.pending
    }
}

#[cfg(test)]
#[path = "interval_tests.rs"]
mod interval_tests;
