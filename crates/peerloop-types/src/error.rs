//! Error types shared by the server and adapters.
//!
//! Gate rejections carry a stable `code` field and an ISO-8601
//! timestamp in their JSON bodies so clients can distinguish them from
//! generic errors. The maintenance rejection uses 503 rather than 403:
//! it signals a transient condition to HTTP-aware clients and lets
//! them retry later without re-authenticating.

use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::types::Timestamp;

pub type PlResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Caller address did not match the IP allow-list
	IpNotAllowed { addr: Box<str> },
	/// Authenticated caller email did not match the email allow-list
	EmailNotAllowed { email: Box<str> },
	/// Request blocked by an active maintenance window
	Maintenance { message: Box<str> },
	/// No settings snapshot could be obtained (fresh or stale)
	SettingsUnavailable(Box<str>),
	/// The settings source does not accept updates
	ReadOnly,
	NotFound,
	PermissionDenied,
	ValidationError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::IpNotAllowed { addr } => write!(f, "address {} is not whitelisted", addr),
			Error::EmailNotAllowed { email } => write!(f, "email {} is not whitelisted", email),
			Error::Maintenance { .. } => write!(f, "system maintenance in progress"),
			Error::SettingsUnavailable(msg) => write!(f, "security settings unavailable: {}", msg),
			Error::ReadOnly => write!(f, "settings source is read-only"),
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		match self {
			Error::IpNotAllowed { .. } => {
				let body = serde_json::json!({
					"error": "Forbidden",
					"code": "IP_NOT_WHITELISTED",
					"timestamp": Timestamp::now().to_iso(),
				});
				(StatusCode::FORBIDDEN, Json(body)).into_response()
			}
			Error::EmailNotAllowed { email } => {
				let body = serde_json::json!({
					"error": "Forbidden",
					"code": "EMAIL_NOT_WHITELISTED",
					"email": email,
					"timestamp": Timestamp::now().to_iso(),
				});
				(StatusCode::FORBIDDEN, Json(body)).into_response()
			}
			Error::Maintenance { message } => {
				let body = serde_json::json!({
					"success": false,
					"error": "Service temporarily unavailable - system maintenance in progress",
					"maintenance": true,
					"message": message,
				});
				(StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
			}
			Error::SettingsUnavailable(msg) => {
				let body = serde_json::json!({
					"error": "Internal Server Error",
					"code": "SETTINGS_UNAVAILABLE",
					"message": msg,
					"timestamp": Timestamp::now().to_iso(),
				});
				(StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
			}
			Error::ReadOnly => {
				let body = serde_json::json!({
					"error": "Conflict",
					"code": "SETTINGS_READ_ONLY",
					"timestamp": Timestamp::now().to_iso(),
				});
				(StatusCode::CONFLICT, Json(body)).into_response()
			}
			Error::NotFound => (StatusCode::NOT_FOUND, "not found").into_response(),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "forbidden").into_response(),
			Error::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
			_ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_gate_rejection_status_codes() {
		let res = Error::IpNotAllowed { addr: "1.2.3.4".into() }.into_response();
		assert_eq!(res.status(), StatusCode::FORBIDDEN);

		let res = Error::EmailNotAllowed { email: "a@b.com".into() }.into_response();
		assert_eq!(res.status(), StatusCode::FORBIDDEN);

		let res = Error::Maintenance { message: "back soon".into() }.into_response();
		assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
	}
}

// vim: ts=4
