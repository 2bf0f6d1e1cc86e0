//! App state type

use std::sync::Arc;
use std::time::Duration;

use peerloop_types::settings_adapter::SettingsAdapter;

use crate::gate::cache::SettingsCache;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_SETTINGS_TTL: Duration = Duration::from_secs(30);
const DEFAULT_SETTINGS_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub settings_adapter: Arc<dyn SettingsAdapter>,
	/// Single process-wide cache instance shared by every concurrent
	/// request; one snapshot governs one logical request.
	pub settings_cache: SettingsCache,
}

pub type App = Arc<AppState>;

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	pub token_secret: Box<str>,
	pub settings_ttl: Duration,
	pub settings_wait_timeout: Duration,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "0.0.0.0:3000".into(),
			token_secret: "peerloop-dev-secret".into(),
			settings_ttl: DEFAULT_SETTINGS_TTL,
			settings_wait_timeout: DEFAULT_SETTINGS_WAIT_TIMEOUT,
		}
	}
}

#[derive(Debug, Default)]
pub struct AppBuilder {
	opts: AppBuilderOpts,
}

impl AppBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn listen(mut self, listen: impl Into<Box<str>>) -> Self {
		self.opts.listen = listen.into();
		self
	}

	pub fn token_secret(mut self, secret: impl Into<Box<str>>) -> Self {
		self.opts.token_secret = secret.into();
		self
	}

	pub fn settings_ttl(mut self, ttl: Duration) -> Self {
		self.opts.settings_ttl = ttl;
		self
	}

	pub fn settings_wait_timeout(mut self, timeout: Duration) -> Self {
		self.opts.settings_wait_timeout = timeout;
		self
	}

	pub fn build(self, settings_adapter: Arc<dyn SettingsAdapter>) -> App {
		let settings_cache = SettingsCache::new(
			settings_adapter.clone(),
			self.opts.settings_ttl,
			self.opts.settings_wait_timeout,
		);
		Arc::new(AppState { opts: self.opts, settings_adapter, settings_cache })
	}
}

// vim: ts=4
