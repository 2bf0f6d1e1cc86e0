//! Shared types, the settings adapter trait, and error types for the
//! Peerloop feedback platform.
//!
//! This crate contains everything the server and the settings adapters
//! need to agree on: the security settings snapshot consumed by the
//! request gates, the adapter trait through which the backing settings
//! store is reached, and the error type rendered on gate rejections.

pub mod error;
pub mod prelude;
pub mod settings;
pub mod settings_adapter;
pub mod types;

// vim: ts=4
