//! Email gate: authorizes requests by authenticated caller email.
//!
//! Identity is established upstream; this gate trusts the `Auth`
//! extension and performs no authentication itself. A request without
//! an authenticated identity passes through untouched - email gating
//! is not an authentication mechanism.
//!
//! The two-source override hierarchy is intentional and exact: in
//! `specific` mode the domain list is never consulted, even when the
//! caller's domain would match. An admin who populates the specific
//! list wants an exhaustive, closed list.

use axum::{
	body::Body,
	extract::State,
	http::{Request, response::Response},
	middleware::Next,
};

use peerloop_types::settings::{EmailAllowList, EmailListMode, email_domain, normalize_email};

use super::GateDecision;
use crate::core::Auth;
use crate::prelude::*;

pub async fn email_gate(
	State(app): State<App>,
	req: Request<Body>,
	next: Next,
) -> PlResult<Response<Body>> {
	let Some(auth) = req.extensions().get::<Auth>() else {
		return Ok(next.run(req).await);
	};
	let email = normalize_email(&auth.email);

	let Some(snapshot) = super::snapshot_or_fail_open(&app.settings_cache, "email").await else {
		return Ok(next.run(req).await);
	};

	let decision = decide(&email, &snapshot.email_allow_list);
	if decision.allowed {
		info!("email gate allow: email={} {} {} ({})", email, req.method(), req.uri().path(), decision.reason);
		Ok(next.run(req).await)
	} else {
		warn!("email gate deny: email={} {} {} ({})", email, req.method(), req.uri().path(), decision.reason);
		Err(Error::EmailNotAllowed { email: email.into() })
	}
}

/// Allow-list decision for a normalized caller email.
///
/// List entries are normalized at snapshot construction, so the match
/// loop compares without allocating.
pub fn decide(email: &str, list: &EmailAllowList) -> GateDecision {
	match list.mode {
		EmailListMode::Disabled => GateDecision::allow("email allow-list disabled"),
		EmailListMode::Specific => {
			// hard override: the domain list is not consulted at all
			if list.emails.iter().any(|e| &**e == email) {
				GateDecision::allow("matched specific email")
			} else {
				GateDecision::deny("not in specific email list")
			}
		}
		EmailListMode::Domain => {
			let domain = email_domain(email);
			if !domain.is_empty() && list.domains.iter().any(|d| &**d == domain) {
				GateDecision::allow(format!("matched domain {}", domain))
			} else {
				GateDecision::deny("domain not in allow-list")
			}
		}
	}
}


// vim: ts=4
