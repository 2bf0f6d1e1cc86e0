use std::{env, sync::Arc};

use peerloop::PeerloopOpts;
use peerloop::settings::ResolvingAdapter;
use peerloop_settings_adapter_env::SettingsAdapterEnv;
use peerloop_settings_adapter_memory::SettingsAdapterMemory;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.init();

	// Admin-updatable in-process store layered over the env-var
	// fallback: env lists apply until settings are changed at runtime.
	let env_source = SettingsAdapterEnv::from_env();
	let settings_adapter = Arc::new(ResolvingAdapter::new(
		Arc::new(SettingsAdapterMemory::default()),
		env_source.snapshot().clone(),
	));

	let opts = PeerloopOpts {
		settings_adapter,
		listen: env::var("PEERLOOP_LISTEN").ok().map(Into::into),
		token_secret: env::var("PEERLOOP_TOKEN_SECRET").ok().map(Into::into),
	};

	if let Err(err) = peerloop::run(opts).await {
		eprintln!("server error: {}", err);
		std::process::exit(1);
	}
}

// vim: ts=4
