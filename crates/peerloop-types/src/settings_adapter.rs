//! Adapter trait through which the backing settings store is reached.
//!
//! The gates never talk to a store directly; they go through the
//! settings cache, which calls `fetch_security_settings` on refresh.
//! Adapters that cannot persist changes (the env-var source) return
//! `Error::ReadOnly` from `update_security_settings`.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::PlResult;
use crate::settings::SecuritySettingsSnapshot;

#[async_trait]
pub trait SettingsAdapter: Debug + Send + Sync {
	/// Fetch the current security settings from the backing store.
	/// Errors on backing-store failure; the cache decides whether to
	/// serve a stale snapshot instead.
	async fn fetch_security_settings(&self) -> PlResult<SecuritySettingsSnapshot>;

	/// Persist a new security settings snapshot. The caller is
	/// expected to invalidate the settings cache afterwards so the
	/// change is observed before natural TTL expiry.
	async fn update_security_settings(&self, snapshot: SecuritySettingsSnapshot) -> PlResult<()>;
}

// vim: ts=4
