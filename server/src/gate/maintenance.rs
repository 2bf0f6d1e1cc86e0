//! Maintenance gate: blocks non-essential traffic during a declared
//! maintenance window.
//!
//! The gate is a pure function of the current snapshot on each call;
//! it owns no state machine of its own. A fixed set of path prefixes
//! stays reachable regardless of identity so an operator can disable
//! maintenance mode and users can check system status. Rejections use
//! 503 rather than 403: the condition is transient and clients may
//! retry later without re-authenticating.

use axum::{
	body::Body,
	extract::State,
	http::{Request, response::Response},
	middleware::Next,
};

use peerloop_types::settings::{MaintenanceSettings, normalize_email};

use super::GateDecision;
use crate::core::Auth;
use crate::prelude::*;

/// Operationally necessary paths that bypass the maintenance window:
/// authentication, health checks, maintenance status, and the system
/// settings endpoints an operator needs to turn maintenance off.
pub const EXEMPT_PATH_PREFIXES: &[&str] = &[
	"/api/v1/auth/",
	"/health",
	"/api/v1/system/maintenance",
	"/api/v1/system/settings",
];

pub async fn maintenance_gate(
	State(app): State<App>,
	req: Request<Body>,
	next: Next,
) -> PlResult<Response<Body>> {
	let Some(snapshot) = super::snapshot_or_fail_open(&app.settings_cache, "maintenance").await
	else {
		return Ok(next.run(req).await);
	};

	let email = req.extensions().get::<Auth>().map(|auth| normalize_email(&auth.email));
	let decision = decide(&snapshot.maintenance, req.uri().path(), email.as_deref());
	if decision.allowed {
		Ok(next.run(req).await)
	} else {
		warn!(
			"maintenance gate deny: {} {} email={} ({})",
			req.method(),
			req.uri().path(),
			email.as_deref().unwrap_or("-"),
			decision.reason
		);
		Err(Error::Maintenance { message: snapshot.maintenance.message.clone() })
	}
}

pub fn is_exempt_path(path: &str) -> bool {
	EXEMPT_PATH_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub fn decide(settings: &MaintenanceSettings, path: &str, email: Option<&str>) -> GateDecision {
	if !settings.enabled {
		return GateDecision::allow("maintenance mode off");
	}
	if is_exempt_path(path) {
		return GateDecision::allow("exempt path");
	}
	if let Some(email) = email {
		if settings.bypass_emails.contains(email) {
			return GateDecision::allow("bypass email");
		}
	}
	GateDecision::deny("maintenance window active")
}


// vim: ts=4
