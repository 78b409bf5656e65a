//! Path queries over JSON documents
//!
//! The engine only depends on the [`PathQuery`] trait. [`JsonPath`] is the
//! default evaluator, backed by `serde_json_path` (RFC 9535 JSONPath):
//!
//! - `$.response.id`, `$['response']["id"]` - member access
//! - `$.items[0]`, `$.items[-1]` - indices, negative counts from the end
//! - `$.items[*].id`, `$..id` - wildcards and recursive descent
//! - `$.items[0:2]`, `$.items[0,2]` - slices and unions
//! - `$.items[?(@.name=='y')].id` - filters
//!
//! A query made only of member and index selectors yields the single value it
//! addresses. Any other query yields every match collected into an array.
//! Evaluation never mutates the document, and a query that matches nothing is
//! an error rather than `null`.

use serde_json::Value;
use serde_json_path::JsonPath as CompiledPath;
use thiserror::Error;

/// Failure to evaluate a path query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("invalid path query '{query}': {reason}")]
    Syntax { query: String, reason: String },

    #[error("path query '{0}' matched nothing")]
    NoMatch(String),
}

/// Capability to evaluate a query string against a parsed JSON document
pub trait PathQuery {
    fn evaluate(&self, query: &str, document: &Value) -> Result<Value, QueryError>;
}

/// Default JSONPath evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPath;

impl PathQuery for JsonPath {
    fn evaluate(&self, query: &str, document: &Value) -> Result<Value, QueryError> {
        let query = query.trim();
        let path = CompiledPath::parse(query).map_err(|e| QueryError::Syntax {
            query: query.to_string(),
            reason: e.to_string(),
        })?;

        let nodes = path.query(document).all();
        if nodes.is_empty() {
            return Err(QueryError::NoMatch(query.to_string()));
        }

        if is_definite(query) {
            return Ok(nodes[0].clone());
        }

        Ok(Value::Array(nodes.into_iter().cloned().collect()))
    }
}

/// Whether a query addresses at most one node: no wildcard, recursive
/// descent, slice, union or filter outside of quoted member names
pub fn is_definite(query: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut previous = '\0';
    let mut escaped = false;

    for ch in query.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '*' | '?' | ':' | ',' => return false,
            '.' if previous == '.' => return false,
            _ => {}
        }
        previous = ch;
    }

    true
}
