//! Security settings snapshot consumed by the request gates.
//!
//! The snapshot is the unit the settings cache stores and every gate
//! reads. It is immutable once constructed and replaced wholesale on
//! refresh, so a single request always sees an internally consistent
//! view of the three setting groups.
//!
//! Entry normalization (trimming, lower-casing, `@` prefixes) happens
//! here at construction time, not in the gates' match loops, keeping
//! those loops allocation-free.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// IP allow-list settings. Entries are raw IPv4/IPv6 addresses or
/// IPv4 CIDR ranges, compared as strings or masked integers by the
/// IP gate.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IpAllowList {
	pub enabled: bool,
	#[serde(default)]
	pub entries: Vec<Box<str>>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailListMode {
	#[default]
	Disabled,
	Domain,
	Specific,
}

/// Email allow-list settings.
///
/// `Specific` mode is a hard override: when selected, the domain list
/// is ignored entirely for the allow decision. An admin who populates
/// the specific list is assumed to want an exhaustive, closed list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EmailAllowList {
	pub mode: EmailListMode,
	#[serde(default)]
	pub domains: Vec<Box<str>>,
	#[serde(default)]
	pub emails: Vec<Box<str>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MaintenanceSettings {
	pub enabled: bool,
	#[serde(default)]
	pub message: Box<str>,
	#[serde(rename = "bypassEmails", default)]
	pub bypass_emails: HashSet<Box<str>>,
}

/// Point-in-time copy of all gate-relevant security settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SecuritySettingsSnapshot {
	#[serde(rename = "ipAllowList", default)]
	pub ip_allow_list: IpAllowList,
	#[serde(rename = "emailAllowList", default)]
	pub email_allow_list: EmailAllowList,
	#[serde(default)]
	pub maintenance: MaintenanceSettings,
}

impl SecuritySettingsSnapshot {
	/// A snapshot with every gate disabled. Used when no settings
	/// source is configured at all.
	pub fn permissive() -> Self {
		Self::default()
	}

	/// Normalize all configured entries in place:
	/// - IP entries trimmed, empty entries dropped
	/// - emails lower-cased and trimmed
	/// - domains lower-cased, trimmed, and guaranteed to start with `@`
	/// - bypass emails lower-cased and trimmed
	pub fn normalized(mut self) -> Self {
		self.ip_allow_list.entries = self
			.ip_allow_list
			.entries
			.iter()
			.map(|e| e.trim())
			.filter(|e| !e.is_empty())
			.map(Box::from)
			.collect();
		self.email_allow_list.emails = self
			.email_allow_list
			.emails
			.iter()
			.map(|e| normalize_email(e))
			.filter(|e| !e.is_empty())
			.map(Box::from)
			.collect();
		self.email_allow_list.domains = self
			.email_allow_list
			.domains
			.iter()
			.map(|d| normalize_domain(d))
			.filter(|d| !d.is_empty() && *d != "@")
			.map(Box::from)
			.collect();
		self.maintenance.bypass_emails = self
			.maintenance
			.bypass_emails
			.iter()
			.map(|e| normalize_email(e))
			.filter(|e| !e.is_empty())
			.map(Box::from)
			.collect();
		self
	}
}

/// Lower-case and trim an email address
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

fn normalize_domain(domain: &str) -> String {
	let domain = domain.trim().to_lowercase();
	if domain.is_empty() || domain.starts_with('@') { domain } else { format!("@{}", domain) }
}

/// Domain portion of a normalized email, including the `@`.
/// A malformed email without an `@` yields the empty string, which
/// matches no domain entry.
pub fn email_domain(email: &str) -> &str {
	match email.find('@') {
		Some(pos) => &email[pos..],
		None => "",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalization() {
		let snapshot = SecuritySettingsSnapshot {
			ip_allow_list: IpAllowList {
				enabled: true,
				entries: vec![" 10.0.0.1 ".into(), "".into(), "192.168.1.0/24".into()],
			},
			email_allow_list: EmailAllowList {
				mode: EmailListMode::Specific,
				domains: vec!["Example.com".into(), " @Wix.com ".into(), "  ".into()],
				emails: vec![" Contractor@External.com ".into(), "".into()],
			},
			maintenance: MaintenanceSettings {
				enabled: false,
				message: "".into(),
				bypass_emails: [" ItayS@Wix.com ".into()].into(),
			},
		}
		.normalized();

		assert_eq!(snapshot.ip_allow_list.entries, ["10.0.0.1", "192.168.1.0/24"].map(Box::<str>::from));
		assert_eq!(snapshot.email_allow_list.emails, ["contractor@external.com"].map(Box::<str>::from));
		assert_eq!(snapshot.email_allow_list.domains, ["@example.com", "@wix.com"].map(Box::<str>::from));
		assert!(snapshot.maintenance.bypass_emails.contains("itays@wix.com"));
	}

	#[test]
	fn test_email_domain() {
		assert_eq!(email_domain("alice@wix.com"), "@wix.com");
		assert_eq!(email_domain("not-an-email"), "");
		assert_eq!(email_domain("@bare"), "@bare");
	}

	#[test]
	fn test_serde_wire_shape() {
		let json = serde_json::json!({
			"ipAllowList": { "enabled": true, "entries": ["1.2.3.4"] },
			"emailAllowList": { "mode": "domain", "domains": ["@wix.com"], "emails": [] },
			"maintenance": { "enabled": true, "message": "back soon", "bypassEmails": ["ops@wix.com"] },
		});
		let snapshot: SecuritySettingsSnapshot =
			serde_json::from_value(json).expect("snapshot should deserialize");
		assert!(snapshot.ip_allow_list.enabled);
		assert_eq!(snapshot.email_allow_list.mode, EmailListMode::Domain);
		assert!(snapshot.maintenance.bypass_emails.contains("ops@wix.com"));
	}

	#[test]
	fn test_missing_groups_default() {
		let snapshot: SecuritySettingsSnapshot =
			serde_json::from_value(serde_json::json!({})).expect("empty snapshot should deserialize");
		assert_eq!(snapshot, SecuritySettingsSnapshot::permissive());
	}
}

// vim: ts=4
