//! Settings surface: admin/system endpoints and source resolution.

pub mod handler;
pub mod resolve;

pub use resolve::{ResolvingAdapter, resolve_settings};

// vim: ts=4
