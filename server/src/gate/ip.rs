//! IP gate: authorizes requests by caller network address.
//!
//! Address resolution is proxy-aware: the left-most `x-forwarded-for`
//! entry wins (the original client in a reverse-proxy chain), then
//! `x-real-ip`, then the raw socket peer address. A request with no
//! resolvable address is treated as `"unknown"`, which matches no
//! allow-list entry.
//!
//! Matching supports exact addresses and IPv4 CIDR ranges. IPv6 CIDR
//! entries fall back to exact-string comparison - a known limitation
//! carried over from the original system (full prefix matching would
//! silently change decisions).

use axum::{
	body::Body,
	extract::{ConnectInfo, State},
	http::{Request, response::Response},
	middleware::Next,
};
use std::net::{Ipv4Addr, SocketAddr};

use peerloop_types::settings::IpAllowList;

use super::GateDecision;
use crate::prelude::*;

pub async fn ip_gate(
	State(app): State<App>,
	req: Request<Body>,
	next: Next,
) -> PlResult<Response<Body>> {
	let Some(snapshot) = super::snapshot_or_fail_open(&app.settings_cache, "ip").await else {
		return Ok(next.run(req).await);
	};

	if !snapshot.ip_allow_list.enabled {
		return Ok(next.run(req).await);
	}

	let addr = client_address(&req);
	let decision = decide(&addr, &snapshot.ip_allow_list);
	if decision.allowed {
		info!("ip gate allow: addr={} {} {} ({})", addr, req.method(), req.uri().path(), decision.reason);
		Ok(next.run(req).await)
	} else {
		warn!("ip gate deny: addr={} {} {} ({})", addr, req.method(), req.uri().path(), decision.reason);
		Err(Error::IpNotAllowed { addr: addr.into() })
	}
}

/// Resolve the caller address: left-most `x-forwarded-for` entry,
/// then `x-real-ip`, then the socket peer address, else `"unknown"`.
pub fn client_address<B>(req: &Request<B>) -> String {
	if let Some(forwarded) = req.headers().get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
		if let Some(first) = forwarded.split(',').next().map(str::trim).filter(|s| !s.is_empty()) {
			return first.to_string();
		}
	}
	if let Some(real_ip) = req.headers().get("x-real-ip").and_then(|h| h.to_str().ok()) {
		let real_ip = real_ip.trim();
		if !real_ip.is_empty() {
			return real_ip.to_string();
		}
	}
	if let Some(ConnectInfo(peer)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
		return peer.ip().to_string();
	}
	"unknown".to_string()
}

/// Allow-list decision for a resolved address.
///
/// With the list enabled, an address is authorized iff it matches at
/// least one entry; an enabled list with no entries therefore denies
/// every request (fail-closed).
pub fn decide(addr: &str, list: &IpAllowList) -> GateDecision {
	if !list.enabled {
		return GateDecision::allow("ip allow-list disabled");
	}
	for entry in &list.entries {
		if matches_entry(addr, entry) {
			return GateDecision::allow(format!("matched entry {}", entry));
		}
	}
	GateDecision::deny("no allow-list match")
}

/// Match a candidate address against a single allow-list entry.
pub fn matches_entry(candidate: &str, entry: &str) -> bool {
	let candidate = strip_mapped_prefix(candidate);
	let entry = strip_mapped_prefix(entry);

	let Some((base, prefix)) = entry.split_once('/') else {
		return candidate == entry;
	};

	match (parse_ipv4(base), prefix.parse::<u8>().ok().filter(|len| *len <= 32)) {
		(Some(base), Some(len)) => {
			let Some(candidate) = parse_ipv4(candidate) else {
				return false;
			};
			let mask = prefix_mask(len);
			candidate & mask == base & mask
		}
		_ if base.contains(':') => {
			// IPv6 CIDR is out of scope; exact comparison only
			candidate == entry
		}
		_ => {
			warn!("ignoring unparseable ip allow-list entry: {}", entry);
			false
		}
	}
}

/// Strip an IPv4-mapped IPv6 prefix so dual-stack peers cannot bypass
/// the filter.
fn strip_mapped_prefix(addr: &str) -> &str {
	addr.strip_prefix("::ffff:").unwrap_or(addr)
}

fn parse_ipv4(addr: &str) -> Option<u32> {
	addr.parse::<Ipv4Addr>().ok().map(u32::from)
}

fn prefix_mask(len: u8) -> u32 {
	if len == 0 { 0 } else { u32::MAX << (32 - u32::from(len)) }
}


// vim: ts=4
