//! Identity plumbing for the gates.
//!
//! Authentication itself happens upstream; this module only decodes an
//! already-issued bearer token and attaches the caller identity to the
//! request so the email and maintenance gates have an identity field
//! to read. `optional_auth` never rejects a request by itself.

const TOKEN_EXPIRE: u64 = 8; /* hours */

use axum::{
	body::Body,
	extract::State,
	http::{Request, header, response::Response},
	middleware::Next,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::time;

use crate::prelude::*;

/// Authenticated caller identity, populated by `optional_auth`
#[derive(Clone, Debug)]
pub struct Auth {
	pub email: Box<str>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct AuthToken {
	/// Caller email
	sub: Box<str>,
	exp: u64,
}

pub fn generate_access_token(secret: &str, email: &str) -> PlResult<Box<str>> {
	let expire = time::SystemTime::now()
		.duration_since(time::UNIX_EPOCH)
		.map_err(|_| Error::PermissionDenied)?
		.as_secs() + 3600 * TOKEN_EXPIRE;

	let token = jsonwebtoken::encode(
		&jsonwebtoken::Header::new(Algorithm::HS256),
		&AuthToken { sub: email.into(), exp: expire },
		&jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
	)
	.map_err(|_| Error::PermissionDenied)?
	.into();

	Ok(token)
}

fn validate_token(secret: &str, token: &str) -> PlResult<Auth> {
	let decoding_key = DecodingKey::from_secret(secret.as_bytes());

	let token_data = decode::<AuthToken>(token, &decoding_key, &Validation::new(Algorithm::HS256))
		.map_err(|_| Error::PermissionDenied)?;

	Ok(Auth { email: token_data.claims.sub })
}

pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> PlResult<Response<Body>> {
	if let Some(auth_header) =
		req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok())
	{
		if auth_header.starts_with("Bearer ") {
			let token = auth_header[7..].trim();
			if let Ok(auth) = validate_token(&app.opts.token_secret, token) {
				req.extensions_mut().insert(auth);
			}
		}
	}

	Ok(next.run(req).await)
}


// vim: ts=4
