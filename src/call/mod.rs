//! Generic CRUD-over-HTTP execution
//!
//! # Module Structure
//!
//! - [`template`] - `{id}` substitution in path and body templates
//! - [`http`] - single request execution against a base endpoint
//! - [`query`] - path queries over JSON responses
//! - [`engine`] - the lifecycle pipeline tying the three together
//!
//! # Example
//!
//! ```ignore
//! use restcall::call::{CallDescription, CallEngine, HttpExecutor, OperationKind};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let engine = CallEngine::new(HttpExecutor::new()?);
//!     let create = CallDescription::for_operation(OperationKind::Create)
//!         .with_path("/api/objects")
//!         .with_body(r#"{"name":"test"}"#)
//!         .with_id_path("$.id");
//!     let result = engine
//!         .perform(OperationKind::Create, "http://localhost:8080", "", Some(&create))
//!         .await?;
//!     println!("created {}", result.identifier);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod http;
pub mod query;
pub mod template;

pub use engine::{CallDescription, CallEngine, CallResult, OperationKind};
pub use http::HttpExecutor;
pub use query::{JsonPath, PathQuery, QueryError};
