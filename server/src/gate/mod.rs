//! Request gating subsystem.
//!
//! Three middlewares sit in front of every API request, in order:
//! maintenance gate, IP gate, email gate. Each asks the shared
//! `SettingsCache` for the current snapshot, short-circuits with a
//! rejection on a deny decision, or passes control onward. The gates
//! are read-only consumers of the cache; they never mutate state.
//!
//! When the cache can produce no snapshot at all (fresh or stale), the
//! gates FAIL OPEN: the request is allowed and the failure is logged.
//! This is a deliberate availability-over-security tradeoff - an
//! access-control outage must not become a full-service outage.

pub mod cache;
pub mod email;
pub mod ip;
pub mod maintenance;

use std::sync::Arc;

use peerloop_types::settings::SecuritySettingsSnapshot;

use crate::prelude::*;
use self::cache::{CacheResult, SettingsCache};

/// The outcome of a single gate evaluation. Used for response
/// construction and audit logging only; never persisted.
#[derive(Clone, Debug)]
pub struct GateDecision {
	pub allowed: bool,
	pub reason: Box<str>,
}

impl GateDecision {
	pub fn allow(reason: impl Into<Box<str>>) -> Self {
		Self { allowed: true, reason: reason.into() }
	}

	pub fn deny(reason: impl Into<Box<str>>) -> Self {
		Self { allowed: false, reason: reason.into() }
	}
}

/// Obtain a snapshot for a gate, applying the fail-open policy.
///
/// Fresh and stale snapshots are both usable for a gate decision;
/// `None` means the gate must let the request through.
pub(crate) async fn snapshot_or_fail_open(
	cache: &SettingsCache,
	gate: &str,
) -> Option<Arc<SecuritySettingsSnapshot>> {
	match cache.get().await {
		CacheResult::Fresh(snapshot) | CacheResult::Stale(snapshot) => Some(snapshot),
		CacheResult::Unavailable(err) => {
			warn!("{} gate: no settings snapshot available, failing open: {}", gate, err);
			None
		}
	}
}

// vim: ts=4
