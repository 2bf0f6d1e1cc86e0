//! Router wiring: the gate pipeline in front of every route.
//!
//! Execution order for an inbound request is optional_auth (identity
//! plumbing), then maintenance gate, IP gate, email gate. Axum runs
//! the last-added layer first, so the layers below are added in
//! reverse.

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::core::app::{App, VERSION};
use crate::core::route_auth::optional_auth;
use crate::gate;
use crate::settings;

async fn health() -> axum::Json<serde_json::Value> {
	axum::Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

fn system_routes() -> Router<App> {
	Router::new()
		.route(
			"/api/v1/system/settings/security",
			get(settings::handler::get_security_settings)
				.put(settings::handler::put_security_settings),
		)
		.route("/api/v1/system/maintenance", get(settings::handler::get_maintenance_status))
		.route("/health", get(health))
}

/// Compose the gated router around the given API routes.
pub fn init_with(app: App, api: Router<App>) -> Router {
	Router::new()
		.merge(system_routes())
		.merge(api)
		.layer(middleware::from_fn_with_state(app.clone(), gate::email::email_gate))
		.layer(middleware::from_fn_with_state(app.clone(), gate::ip::ip_gate))
		.layer(middleware::from_fn_with_state(app.clone(), gate::maintenance::maintenance_gate))
		.layer(middleware::from_fn_with_state(app.clone(), optional_auth))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

pub fn init(app: App) -> Router {
	init_with(app, Router::new())
}

// vim: ts=4
