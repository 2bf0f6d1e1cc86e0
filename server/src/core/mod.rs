//! Core subsystem. App state and identity plumbing for the gates.

pub mod app;
pub mod route_auth;

pub use crate::core::route_auth::Auth;

// vim: ts=4
