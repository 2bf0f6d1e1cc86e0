//! In-process settings adapter.
//!
//! Holds the security settings snapshot in an `RwLock`. Supports
//! updates, so it backs the admin settings endpoints in deployments
//! without an external settings store, and is the adapter of choice
//! for integration tests.

use async_trait::async_trait;
use parking_lot::RwLock;

use peerloop::error::PlResult;
use peerloop::settings::SecuritySettingsSnapshot;
use peerloop::settings_adapter::SettingsAdapter;

#[derive(Debug, Default)]
pub struct SettingsAdapterMemory {
	snapshot: RwLock<SecuritySettingsSnapshot>,
}

impl SettingsAdapterMemory {
	pub fn new(snapshot: SecuritySettingsSnapshot) -> Self {
		Self { snapshot: RwLock::new(snapshot.normalized()) }
	}
}

#[async_trait]
impl SettingsAdapter for SettingsAdapterMemory {
	async fn fetch_security_settings(&self) -> PlResult<SecuritySettingsSnapshot> {
		Ok(self.snapshot.read().clone())
	}

	async fn update_security_settings(&self, snapshot: SecuritySettingsSnapshot) -> PlResult<()> {
		*self.snapshot.write() = snapshot.normalized();
		Ok(())
	}
}


// vim: ts=4
