//! Environment-variable settings adapter.
//!
//! The legacy configuration path: comma-separated allow-lists read
//! once at startup into a static snapshot. Entries are trimmed and
//! empty entries filtered. The adapter is read-only; admin updates go
//! through a dynamic settings source instead.
//!
//! Variables:
//! - `PEERLOOP_IP_WHITELIST` — IP addresses / IPv4 CIDR ranges
//! - `PEERLOOP_EMAIL_WHITELIST` — specific emails (selects `specific` mode)
//! - `PEERLOOP_DOMAIN_WHITELIST` — `@domain` entries (selects `domain`
//!   mode when no specific emails are set)
//! - `PEERLOOP_MAINTENANCE` — `1`/`true` to start in maintenance mode
//! - `PEERLOOP_MAINTENANCE_MESSAGE` — operator message for 503 bodies
//! - `PEERLOOP_MAINTENANCE_BYPASS` — emails allowed during maintenance

use async_trait::async_trait;
use std::env;
use tracing::info;

use peerloop::error::{Error, PlResult};
use peerloop::settings::{
	EmailAllowList, EmailListMode, IpAllowList, MaintenanceSettings, SecuritySettingsSnapshot,
};
use peerloop::settings_adapter::SettingsAdapter;

#[derive(Debug)]
pub struct SettingsAdapterEnv {
	snapshot: SecuritySettingsSnapshot,
}

impl SettingsAdapterEnv {
	/// Build from the process environment.
	pub fn from_env() -> Self {
		let adapter = Self::from_vars(
			env::var("PEERLOOP_IP_WHITELIST").ok().as_deref(),
			env::var("PEERLOOP_EMAIL_WHITELIST").ok().as_deref(),
			env::var("PEERLOOP_DOMAIN_WHITELIST").ok().as_deref(),
			env::var("PEERLOOP_MAINTENANCE").ok().as_deref(),
			env::var("PEERLOOP_MAINTENANCE_MESSAGE").ok().as_deref(),
			env::var("PEERLOOP_MAINTENANCE_BYPASS").ok().as_deref(),
		);
		info!(
			"env settings source: ip_entries={} emails={} domains={} maintenance={}",
			adapter.snapshot.ip_allow_list.entries.len(),
			adapter.snapshot.email_allow_list.emails.len(),
			adapter.snapshot.email_allow_list.domains.len(),
			adapter.snapshot.maintenance.enabled,
		);
		adapter
	}

	/// Build from explicit values (also the testable core of `from_env`)
	pub fn from_vars(
		ip_whitelist: Option<&str>,
		email_whitelist: Option<&str>,
		domain_whitelist: Option<&str>,
		maintenance: Option<&str>,
		maintenance_message: Option<&str>,
		maintenance_bypass: Option<&str>,
	) -> Self {
		let ip_entries = split_list(ip_whitelist);
		let emails = split_list(email_whitelist);
		let domains = split_list(domain_whitelist);

		// A populated specific list takes precedence over the domain list
		let mode = if !emails.is_empty() {
			EmailListMode::Specific
		} else if !domains.is_empty() {
			EmailListMode::Domain
		} else {
			EmailListMode::Disabled
		};

		let snapshot = SecuritySettingsSnapshot {
			ip_allow_list: IpAllowList { enabled: !ip_entries.is_empty(), entries: ip_entries },
			email_allow_list: EmailAllowList { mode, domains, emails },
			maintenance: MaintenanceSettings {
				enabled: matches!(maintenance.map(str::trim), Some("1" | "true" | "TRUE" | "True")),
				message: maintenance_message.unwrap_or_default().into(),
				bypass_emails: split_list(maintenance_bypass).into_iter().collect(),
			},
		}
		.normalized();

		Self { snapshot }
	}

	pub fn snapshot(&self) -> &SecuritySettingsSnapshot {
		&self.snapshot
	}
}

fn split_list(value: Option<&str>) -> Vec<Box<str>> {
	value
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|e| !e.is_empty())
		.map(Box::from)
		.collect()
}

#[async_trait]
impl SettingsAdapter for SettingsAdapterEnv {
	async fn fetch_security_settings(&self) -> PlResult<SecuritySettingsSnapshot> {
		Ok(self.snapshot.clone())
	}

	async fn update_security_settings(&self, _snapshot: SecuritySettingsSnapshot) -> PlResult<()> {
		Err(Error::ReadOnly)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_list_parsing_trims_and_filters() {
		let adapter = SettingsAdapterEnv::from_vars(
			Some(" 10.0.0.1 , ,192.168.1.0/24,"),
			None,
			Some("Wix.com, @other.com"),
			Some("true"),
			Some("upgrading"),
			Some("Ops@Wix.com"),
		);
		let snapshot = adapter.snapshot();

		assert!(snapshot.ip_allow_list.enabled);
		assert_eq!(snapshot.ip_allow_list.entries, ["10.0.0.1", "192.168.1.0/24"].map(Box::<str>::from));
		assert_eq!(snapshot.email_allow_list.mode, EmailListMode::Domain);
		assert_eq!(snapshot.email_allow_list.domains, ["@wix.com", "@other.com"].map(Box::<str>::from));
		assert!(snapshot.maintenance.enabled);
		assert_eq!(&*snapshot.maintenance.message, "upgrading");
		assert!(snapshot.maintenance.bypass_emails.contains("ops@wix.com"));
	}

	#[test]
	fn test_specific_emails_take_precedence_over_domains() {
		let adapter = SettingsAdapterEnv::from_vars(
			None,
			Some("contractor@external.com"),
			Some("@wix.com"),
			None,
			None,
			None,
		);
		assert_eq!(adapter.snapshot().email_allow_list.mode, EmailListMode::Specific);
	}

	#[test]
	fn test_unset_is_permissive() {
		let adapter = SettingsAdapterEnv::from_vars(None, None, None, None, None, None);
		assert_eq!(adapter.snapshot(), &SecuritySettingsSnapshot::permissive());
	}

	#[tokio::test]
	async fn test_updates_rejected() {
		let adapter = SettingsAdapterEnv::from_vars(None, None, None, None, None, None);
		let res = adapter.update_security_settings(SecuritySettingsSnapshot::permissive()).await;
		assert!(matches!(res, Err(Error::ReadOnly)));
	}
}

// vim: ts=4
