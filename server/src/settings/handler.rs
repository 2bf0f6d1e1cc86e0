//! System/admin endpoints for the security settings.
//!
//! `PUT /api/v1/system/settings/security` persists through the adapter
//! and then invalidates the cache, so the new configuration is
//! observed by the gates immediately instead of waiting out the TTL.
//! These paths are maintenance-exempt; an operator must be able to
//! turn maintenance mode off through them.

use axum::{Json, extract::State};

use peerloop_types::settings::SecuritySettingsSnapshot;

use crate::gate::cache::CacheResult;
use crate::prelude::*;

/// Security settings as the gates currently see them (through the cache)
pub async fn get_security_settings(
	State(app): State<App>,
) -> PlResult<Json<SecuritySettingsSnapshot>> {
	match app.settings_cache.get().await {
		CacheResult::Fresh(snapshot) | CacheResult::Stale(snapshot) => Ok(Json((*snapshot).clone())),
		CacheResult::Unavailable(err) => Err(err),
	}
}

pub async fn put_security_settings(
	State(app): State<App>,
	Json(snapshot): Json<SecuritySettingsSnapshot>,
) -> PlResult<Json<SecuritySettingsSnapshot>> {
	let snapshot = snapshot.normalized();
	app.settings_adapter.update_security_settings(snapshot.clone()).await?;
	app.settings_cache.invalidate();
	info!("security settings updated, cache invalidated");
	Ok(Json(snapshot))
}

/// Maintenance status for clients polling during a window.
/// Settings outage reports as not-in-maintenance (fail open).
pub async fn get_maintenance_status(State(app): State<App>) -> Json<serde_json::Value> {
	match app.settings_cache.get().await {
		CacheResult::Fresh(snapshot) | CacheResult::Stale(snapshot) => Json(serde_json::json!({
			"maintenance": snapshot.maintenance.enabled,
			"message": snapshot.maintenance.message,
		})),
		CacheResult::Unavailable(err) => {
			warn!("maintenance status: no settings snapshot available: {}", err);
			Json(serde_json::json!({ "maintenance": false, "message": "" }))
		}
	}
}

// vim: ts=4
