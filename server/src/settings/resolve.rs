//! Resolution of the two settings sources.
//!
//! The original system unioned the env-var fallback into the
//! database-backed settings with ad-hoc object merging. Here the env
//! source is a bootstrap fallback only: it applies until the first
//! settings update lands in the dynamic store, after which the dynamic
//! snapshot is authoritative in full. Inferring precedence from
//! snapshot content instead would make a group set back to its
//! defaults (maintenance switched off by an admin, say) look
//! unconfigured, and the env value would resurrect it.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use peerloop_types::settings::SecuritySettingsSnapshot;
use peerloop_types::settings_adapter::SettingsAdapter;

use crate::prelude::*;

/// Pick the authoritative snapshot. `dynamic` must be `Some` only when
/// the dynamic store has been explicitly written; the env snapshot
/// covers the time before that. With both sources absent the result is
/// fully permissive.
pub fn resolve_settings(
	dynamic: Option<SecuritySettingsSnapshot>,
	env: Option<SecuritySettingsSnapshot>,
) -> SecuritySettingsSnapshot {
	dynamic.or(env).unwrap_or_default()
}

/// Settings adapter that layers an env-var fallback under a dynamic
/// source. The fallback is served until the first successful update
/// through this adapter; from then on fetches pass the dynamic
/// snapshot through unchanged, so an update that restores a group to
/// its defaults sticks.
#[derive(Debug)]
pub struct ResolvingAdapter {
	primary: Arc<dyn SettingsAdapter>,
	fallback: SecuritySettingsSnapshot,
	written: AtomicBool,
}

impl ResolvingAdapter {
	pub fn new(primary: Arc<dyn SettingsAdapter>, fallback: SecuritySettingsSnapshot) -> Self {
		Self { primary, fallback: fallback.normalized(), written: AtomicBool::new(false) }
	}
}

#[async_trait]
impl SettingsAdapter for ResolvingAdapter {
	async fn fetch_security_settings(&self) -> PlResult<SecuritySettingsSnapshot> {
		let dynamic = if self.written.load(Ordering::Acquire) {
			Some(self.primary.fetch_security_settings().await?)
		} else {
			None
		};
		Ok(resolve_settings(dynamic, Some(self.fallback.clone())))
	}

	async fn update_security_settings(&self, snapshot: SecuritySettingsSnapshot) -> PlResult<()> {
		self.primary.update_security_settings(snapshot).await?;
		self.written.store(true, Ordering::Release);
		Ok(())
	}
}


// vim: ts=4
