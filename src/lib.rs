//! Manage arbitrary resources through four configurable HTTP calls.
//!
//! - [`call`] - the CRUD-over-HTTP engine
//! - [`resource`] - resource files and the create/read/update/delete lifecycle
//! - [`state`] - persisted resource state
//! - [`config`] - user configuration

pub mod call;
pub mod config;
pub mod error;
pub mod resource;
pub mod state;

pub use error::CallError;

/// Version injected at compile time via RESTCALL_VERSION env var (set by CI/CD),
/// or the package version for local builds.
pub const VERSION: &str = match option_env!("RESTCALL_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
