//! Resource adapter layer
//!
//! Sits between a host (the CLI, or any other orchestrator) and the call
//! engine. The engine only ever receives validated, typed descriptions.
//!
//! # Architecture
//!
//! - [`schema`] - declarative resource file format, defaults and validation
//! - [`lifecycle`] - create/read/update/delete over a [`ResourceSpec`]

pub mod lifecycle;
pub mod schema;

pub use lifecycle::ResourceState;
pub use schema::{CallBlock, FieldDef, ResourceSpec, CALL_FIELDS, RESOURCE_FIELDS};
