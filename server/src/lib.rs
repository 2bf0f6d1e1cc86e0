//! Peerloop is the backend of a multi-tenant HR feedback/review
//! platform. This crate ships its request-gating layer: the chain of
//! access-control middlewares that sits in front of every API request.
//!
//! # Features
//!
//! - IP gate
//!		- exact address and IPv4 CIDR allow-list matching
//!		- proxy-aware client address resolution
//!	- Email gate
//!		- specific-email and domain allow-lists with a hard override
//!		  between the two
//!	- Maintenance gate
//!		- global traffic blocking with path exemptions and a per-user
//!		  bypass list
//!	- Settings cache
//!		- TTL-bounded, single-flight refresh, stale-on-failure
//!	- Pluggable settings sources (adapter trait, env fallback)
//!
//! All three gates fail OPEN when no settings snapshot can be obtained
//! at all: an access-control outage must not become a full-service
//! outage. See `gate::snapshot_or_fail_open`.

#![forbid(unsafe_code)]

pub mod core;
pub mod gate;
pub mod prelude;
pub mod routes;
pub mod settings;

pub use peerloop_types::{error, settings as settings_types, settings_adapter, types};

pub use crate::core::app::{App, AppBuilder, AppBuilderOpts, AppState};

use std::sync::Arc;

use crate::prelude::*;
use peerloop_types::settings_adapter::SettingsAdapter;

pub struct PeerloopOpts {
	pub settings_adapter: Arc<dyn SettingsAdapter>,
	/// Listen address, default `0.0.0.0:3000`
	pub listen: Option<Box<str>>,
	/// HS256 secret for bearer-token decoding
	pub token_secret: Option<Box<str>>,
}

/// Build the app state and serve the gated router until shutdown.
pub async fn run(opts: PeerloopOpts) -> PlResult<()> {
	let mut builder = AppBuilder::new();
	if let Some(listen) = opts.listen {
		builder = builder.listen(listen);
	}
	if let Some(secret) = opts.token_secret {
		builder = builder.token_secret(secret);
	}
	let app = builder.build(opts.settings_adapter);

	let router = routes::init(app.clone());
	let listener = tokio::net::TcpListener::bind(&*app.opts.listen).await?;
	info!("peerloop {} listening on {}", core::app::VERSION, app.opts.listen);
	axum::serve(
		listener,
		router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
	)
	.await?;

	Ok(())
}

// vim: ts=4
