// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;

    fn status(dkim: bool, stats: bool, spf: bool) -> DnsStatus {
        DnsStatus { dkim, stats, spf }
    }

    #[test]
    fn test_converged_status_uses_long_interval() {
        let intervals = RequeueIntervals::default();
        assert_eq!(
            next_interval(&intervals, &status(true, true, true)),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_any_failing_check_uses_short_interval() {
        let intervals = RequeueIntervals::default();
        for flags in [
            (false, false, false),
            (true, false, false),
            (false, true, false),
            (false, false, true),
            (true, true, false),
            (true, false, true),
            (false, true, true),
        ] {
            let s = status(flags.0, flags.1, flags.2);
            assert_eq!(
                next_interval(&intervals, &s),
                Duration::from_secs(60),
                "unexpected interval for {s:?}"
            );
        }
    }

    #[test]
    fn test_configured_intervals_are_used() {
        let intervals = RequeueIntervals {
            converged: Duration::from_secs(600),
            pending: Duration::from_secs(5),
        };
        assert_eq!(
            next_interval(&intervals, &status(true, true, true)),
            Duration::from_secs(600)
        );
        assert_eq!(
            next_interval(&intervals, &status(true, true, false)),
            Duration::from_secs(5)
        );
    }
}
