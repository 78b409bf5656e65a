//! CRUD Operation Engine
//!
//! Turns a [`CallDescription`] into one HTTP round trip and correlates the
//! response back to a resource identity. Each invocation is a linear pipeline:
//! resolve templates, validate, call, parse, extract the id, project the output.
//! The engine keeps no state between invocations.

use super::http::HttpExecutor;
use super::query::{JsonPath, PathQuery};
use super::template;
use crate::error::{CallError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Create,
        OperationKind::Read,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    /// HTTP method used when the configuration does not name one
    pub fn default_method(self) -> &'static str {
        match self {
            OperationKind::Create => "POST",
            OperationKind::Read => "GET",
            OperationKind::Update => "PUT",
            OperationKind::Delete => "DELETE",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Read => "read",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one lifecycle call.
///
/// `Default` is the unconfigured call: empty path, empty method (sent as GET),
/// no body, no headers and no queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallDescription {
    /// Path appended to the endpoint, may contain `{id}`
    pub path: String,
    pub method: String,
    /// Request body, may contain `{id}`
    pub body: String,
    pub headers: BTreeMap<String, String>,
    /// Query locating the identifier in the response
    pub id_path: Option<String>,
    /// Query narrowing the stored output
    pub output_path: Option<String>,
}

impl CallDescription {
    /// Description carrying the schema defaults for `kind`
    pub fn for_operation(kind: OperationKind) -> Self {
        Self {
            path: format!("/{}", template::ID_PLACEHOLDER),
            method: kind.default_method().to_string(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_id_path(mut self, query: impl Into<String>) -> Self {
        self.id_path = Some(query.into());
        self
    }

    pub fn with_output_path(mut self, query: impl Into<String>) -> Self {
        self.output_path = Some(query.into());
        self
    }

    fn id_query(&self) -> Option<&str> {
        self.id_path.as_deref().filter(|q| !q.is_empty())
    }

    fn output_query(&self) -> Option<&str> {
        self.output_path.as_deref().filter(|q| !q.is_empty())
    }
}

/// Outcome of one lifecycle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub identifier: String,
    /// Full response body
    pub raw_output: String,
    /// Serialised result of the output query, when one is configured
    pub projected_output: Option<String>,
}

impl CallResult {
    /// Output to persist: the projection if present, otherwise the raw body
    pub fn output(&self) -> &str {
        self.projected_output.as_deref().unwrap_or(&self.raw_output)
    }
}

/// Executes lifecycle calls with an injected HTTP executor and path query evaluator
#[derive(Clone)]
pub struct CallEngine<Q = JsonPath> {
    executor: HttpExecutor,
    query: Q,
}

impl CallEngine<JsonPath> {
    pub fn new(executor: HttpExecutor) -> Self {
        Self {
            executor,
            query: JsonPath,
        }
    }
}

impl<Q: PathQuery> CallEngine<Q> {
    /// Create an engine with a custom path query evaluator
    pub fn with_query(executor: HttpExecutor, query: Q) -> Self {
        Self { executor, query }
    }

    /// Run one lifecycle operation.
    ///
    /// `description` may be `None` when the operation is not configured; the
    /// unconfigured call is still issued. When `id_path` is set it takes
    /// precedence over `current_id`, even if both are non-empty.
    pub async fn perform(
        &self,
        kind: OperationKind,
        endpoint: &str,
        current_id: &str,
        description: Option<&CallDescription>,
    ) -> Result<CallResult> {
        let unconfigured = CallDescription::default();
        let description = description.unwrap_or(&unconfigured);

        let path = template::resolve(&description.path, current_id);
        let body = template::resolve(&description.body, current_id);

        let id_query = description.id_query();
        let output_query = description.output_query();

        if current_id.is_empty() && id_query.is_none() {
            return Err(CallError::configuration(format!(
                "both id and {}.id_path are empty. Please specify one",
                kind
            )));
        }

        tracing::info!("{} call: {} {}{}", kind, description.method, endpoint, path);

        let raw_output = self
            .executor
            .execute(endpoint, &path, &description.method, &body, &description.headers)
            .await?;

        let document = if id_query.is_some() || output_query.is_some() {
            Some(parse_object(&raw_output, kind)?)
        } else {
            None
        };

        let identifier = match (id_query, document.as_ref()) {
            (Some(query), Some(document)) => {
                let value = self.query.evaluate(query, document).map_err(|e| {
                    CallError::extraction(format!(
                        "error querying the id path for the {} operation. ID path: {}, error: {}",
                        kind, query, e
                    ))
                })?;
                let id = stringify(&value);
                if id.is_empty() {
                    return Err(CallError::configuration(format!(
                        "the id path {} returned an empty id for the {} operation",
                        query, kind
                    )));
                }
                id
            }
            _ if !current_id.is_empty() => current_id.to_string(),
            _ => {
                return Err(CallError::configuration(format!(
                    "both id and id_path are empty for the {} operation ({})",
                    kind, description.method
                )))
            }
        };

        let projected_output = match (output_query, document.as_ref()) {
            (Some(query), Some(document)) => {
                let value = self.query.evaluate(query, document).map_err(|e| {
                    CallError::extraction(format!(
                        "error querying the json path for the {} operation. JSON path: {}, error: {}",
                        kind, query, e
                    ))
                })?;
                let rendered = serde_json::to_string(&value).map_err(|e| {
                    CallError::extraction(format!(
                        "error converting JSON response to string. JSON path: {}, error: {}",
                        query, e
                    ))
                })?;
                Some(rendered)
            }
            _ => None,
        };

        tracing::debug!("{} call resolved id '{}'", kind, identifier);

        Ok(CallResult {
            identifier,
            raw_output,
            projected_output,
        })
    }
}

/// Parse a response body that must be a JSON object
fn parse_object(raw: &str, kind: OperationKind) -> Result<Value> {
    if raw.is_empty() {
        return Err(CallError::extraction(format!(
            "cannot parse the {} response: received empty body",
            kind
        )));
    }

    let map: Map<String, Value> = serde_json::from_str(raw).map_err(|e| {
        CallError::extraction(format!(
            "cannot parse the {} response as a JSON object: {}",
            kind, e
        ))
    })?;

    Ok(Value::Object(map))
}

/// Render an extracted identifier as plain text
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
