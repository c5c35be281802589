// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `Domain` resources.
//!
//! # Reconciliation Architecture
//!
//! Each pass follows the standard Kubernetes controller pattern:
//!
//! 1. **Observe** - Load the `Domain` and check its DNS records
//! 2. **Converge** - Create or delete the stats `Ingress` to match the stats check
//! 3. **Status** - Report the check results back to Kubernetes
//! 4. **Schedule** - Recheck hourly once converged, every minute otherwise
//!
//! # Available Reconcilers
//!
//! - [`run_pass`] - One deadline-bounded pass for a `Domain` key
//! - [`reconcile_domain`] - The same pass without a deadline
//! - [`reconcile_stats_ingress`] - Stats ingress presence for a computed status
//! - [`next_interval`] - Delay before the next pass
//!
//! # Example
//!
//! ```rust,no_run
//! use maildomain_operator::context::Context;
//! use maildomain_operator::reconcilers::{run_pass, ReconcileOutcome};
//! use maildomain_operator::store::ObjectKey;
//!
//! async fn reconcile_once(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
//!     let key = ObjectKey::new("mail", "acme");
//!     if let ReconcileOutcome::RequeueAfter { delay, .. } = run_pass(ctx, &key).await? {
//!         println!("next pass in {delay:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod ingress;
pub mod interval;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use domain::{reconcile_domain, run_pass, ReconcileOutcome};
pub use ingress::{
    build_owner_reference, build_stats_ingress, build_stats_ingress_labels,
    reconcile_stats_ingress, stats_ingress_name, IngressAction,
};
pub use interval::next_interval;

/// Check if a status field has changed between current and new values.
///
/// Status writes trigger watch events which cause new reconciliations, so the
/// status is only written when its value actually changes.
///
/// # Example
///
/// ```rust
/// use maildomain_operator::reconcilers::status_changed;
///
/// assert!(status_changed(&None, &Some(1)));
/// assert!(!status_changed(&Some(1), &Some(1)));
/// ```
#[must_use]
pub fn status_changed<T: PartialEq>(current_value: &Option<T>, new_value: &Option<T>) -> bool {
    current_value != new_value
}
