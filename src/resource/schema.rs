//! Resource Schema - declarative resource configuration
//!
//! A resource file (YAML or JSON) names an endpoint, an optional custom id and
//! up to four call blocks. Blocks are loosely typed as they come off disk and
//! are validated once into [`CallDescription`]s before the engine sees them.

use crate::call::{CallDescription, OperationKind};
use crate::error::CallError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Documentation for one configurable field
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldDef {
    pub name: &'static str,
    pub description: &'static str,
    pub default: Option<&'static str>,
    pub required: bool,
    /// Set by the tool rather than the user
    pub computed: bool,
}

const fn field(
    name: &'static str,
    description: &'static str,
    default: Option<&'static str>,
    required: bool,
    computed: bool,
) -> FieldDef {
    FieldDef {
        name,
        description,
        default,
        required,
        computed,
    }
}

/// Resource-level fields
pub const RESOURCE_FIELDS: &[FieldDef] = &[
    field(
        "endpoint",
        "Endpoint the calls are sent to, including the http(s) scheme and port number.",
        None,
        true,
        false,
    ),
    field(
        "custom_id",
        "An id to manage the resource. If not provided, id_path must be set in the create call.",
        None,
        false,
        false,
    ),
    field("create", "How to create the resource.", None, false, false),
    field("read", "How to read the resource.", None, false, false),
    field("update", "How to update the resource.", None, false, false),
    field("delete", "How to delete the resource.", None, false, false),
    field(
        "create_output",
        "Output captured when the resource was created.",
        None,
        false,
        true,
    ),
    field("raw_output", "Output of the last operation.", None, false, true),
];

/// Fields of a create/read/update/delete block
pub const CALL_FIELDS: &[FieldDef] = &[
    field(
        "path",
        "The path to call. It supports replacement of the tag {id}, for example /{id}.",
        Some("/{id}"),
        false,
        false,
    ),
    field(
        "http_method",
        "The HTTP method of the call.",
        Some("POST | GET | PUT | DELETE per operation"),
        false,
        false,
    ),
    field(
        "body",
        "The request body as a string, or a structure sent as JSON. It supports replacement of the tag {id}.",
        Some(""),
        false,
        false,
    ),
    field(
        "id_path",
        "Path query locating the id in a successful response, for example $.response.id.",
        None,
        false,
        false,
    ),
    field(
        "json_path",
        "Path query selecting the output to keep, for example $.objects[0].",
        None,
        false,
        false,
    ),
    field(
        "headers",
        "Map of headers sent with the call. Values must be strings.",
        None,
        false,
        false,
    ),
];

/// One call block as written in the resource file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallBlock {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    /// String body, or any other JSON value serialised on validation
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub id_path: Option<String>,
    #[serde(default)]
    pub json_path: Option<String>,
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
}

impl CallBlock {
    /// Validate this block into a typed description, filling in defaults for `kind`
    pub fn to_description(&self, kind: OperationKind) -> Result<CallDescription, CallError> {
        let mut description = CallDescription::for_operation(kind);

        if let Some(path) = &self.path {
            description.path = path.clone();
        }
        if let Some(method) = &self.http_method {
            description.method = method.clone();
        }

        description.body = match &self.body {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(body)) => body.clone(),
            Some(other) => serde_json::to_string(other).map_err(|e| {
                CallError::configuration(format!("{}.body cannot be encoded as JSON: {}", kind, e))
            })?,
        };

        description.id_path = self.id_path.clone().filter(|q| !q.is_empty());
        description.output_path = self.json_path.clone().filter(|q| !q.is_empty());
        description.headers = validate_headers(kind, self.headers.as_ref())?;

        Ok(description)
    }
}

/// Reject header values that are not strings
pub fn validate_headers(
    kind: OperationKind,
    headers: Option<&Map<String, Value>>,
) -> Result<BTreeMap<String, String>, CallError> {
    let mut validated = BTreeMap::new();

    for (name, value) in headers.into_iter().flatten() {
        match value {
            Value::String(value) => {
                validated.insert(name.clone(), value.clone());
            }
            other => {
                return Err(CallError::configuration(format!(
                    "{}.headers.{} must be a string, found {}",
                    kind, name, other
                )))
            }
        }
    }

    Ok(validated)
}

/// A resource file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    pub endpoint: String,
    /// String or number
    #[serde(default)]
    pub custom_id: Option<Value>,
    #[serde(default)]
    pub create: Option<CallBlock>,
    #[serde(default)]
    pub read: Option<CallBlock>,
    #[serde(default)]
    pub update: Option<CallBlock>,
    #[serde(default)]
    pub delete: Option<CallBlock>,
}

impl ResourceSpec {
    /// Load a resource file, JSON for `.json` and YAML otherwise
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resource file {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let spec = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .with_context(|| format!("Invalid resource file {}", path.display()))?;

        spec.validate()?;
        Ok(spec)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse resource YAML")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse resource JSON")
    }

    /// Check every field once so that lifecycle calls only fail on remote behaviour
    pub fn validate(&self) -> Result<(), CallError> {
        if self.endpoint.trim().is_empty() {
            return Err(CallError::configuration("endpoint must not be empty"));
        }
        self.custom_id()?;
        for kind in OperationKind::ALL {
            self.description(kind)?;
        }
        Ok(())
    }

    /// Externally supplied id, empty when not configured
    pub fn custom_id(&self) -> Result<String, CallError> {
        match &self.custom_id {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            Some(other) => Err(CallError::configuration(format!(
                "custom_id must be a string or a number, found {}",
                other
            ))),
        }
    }

    pub fn block(&self, kind: OperationKind) -> Option<&CallBlock> {
        match kind {
            OperationKind::Create => self.create.as_ref(),
            OperationKind::Read => self.read.as_ref(),
            OperationKind::Update => self.update.as_ref(),
            OperationKind::Delete => self.delete.as_ref(),
        }
    }

    /// Typed description for `kind`, `None` when the block is absent
    pub fn description(&self, kind: OperationKind) -> Result<Option<CallDescription>, CallError> {
        self.block(kind)
            .map(|block| block.to_description(kind))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
endpoint: http://localhost:8080
custom_id: 5678
create:
  path: /api/objects/{id}
  body:
    name: test
read:
  path: /api/objects/{id}
  json_path: $.response[0]
  headers:
    Authorization: Bearer abc
delete:
  path: /api/objects/{id}
"#;

    #[test]
    fn test_yaml_resource_parses() {
        let spec = ResourceSpec::from_yaml_str(YAML).unwrap();
        assert_eq!(spec.endpoint, "http://localhost:8080");
        assert_eq!(spec.custom_id().unwrap(), "5678");
        assert!(spec.update.is_none());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_block_defaults_per_operation() {
        let spec = ResourceSpec::from_yaml_str(YAML).unwrap();

        let create = spec.description(OperationKind::Create).unwrap().unwrap();
        assert_eq!(create.method, "POST");
        assert_eq!(create.body, r#"{"name":"test"}"#);

        let read = spec.description(OperationKind::Read).unwrap().unwrap();
        assert_eq!(read.method, "GET");
        assert_eq!(read.output_path.as_deref(), Some("$.response[0]"));
        assert_eq!(read.headers.get("Authorization").unwrap(), "Bearer abc");

        let delete = spec.description(OperationKind::Delete).unwrap().unwrap();
        assert_eq!(delete.method, "DELETE");
        assert!(delete.body.is_empty());

        assert!(spec.description(OperationKind::Update).unwrap().is_none());
    }

    #[test]
    fn test_empty_block_uses_schema_defaults() {
        let description = CallBlock::default()
            .to_description(OperationKind::Update)
            .unwrap();
        assert_eq!(description, CallDescription::for_operation(OperationKind::Update));
    }

    #[test]
    fn test_json_resource_parses() {
        let spec = ResourceSpec::from_json_str(
            r#"{"endpoint":"http://localhost:8080","create":{"id_path":"$.id","body":"{\"id\":\"{id}\"}"}}"#,
        )
        .unwrap();
        assert_eq!(spec.custom_id().unwrap(), "");
        let create = spec.description(OperationKind::Create).unwrap().unwrap();
        assert_eq!(create.id_path.as_deref(), Some("$.id"));
        assert_eq!(create.body, r#"{"id":"{id}"}"#);
    }

    #[test]
    fn test_non_string_header_rejected() {
        let spec = ResourceSpec::from_yaml_str(
            "endpoint: http://localhost\nread:\n  headers:\n    X-Retries: 3\n",
        )
        .unwrap();
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, CallError::Configuration(_)));
        assert!(err.to_string().contains("read.headers.X-Retries must be a string"));
    }

    #[test]
    fn test_invalid_custom_id_rejected() {
        let spec =
            ResourceSpec::from_yaml_str("endpoint: http://localhost\ncustom_id: [1]\n").unwrap();
        assert!(spec.custom_id().is_err());
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let spec = ResourceSpec::from_yaml_str("endpoint: ''\n").unwrap();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ResourceSpec::from_yaml_str("endpoint: http://x\nmethod: GET\n").is_err());
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        assert!(ResourceSpec::from_yaml_str("custom_id: a\n").is_err());
    }

    #[test]
    fn test_empty_queries_dropped() {
        let block = CallBlock {
            id_path: Some(String::new()),
            json_path: Some(String::new()),
            ..CallBlock::default()
        };
        let description = block.to_description(OperationKind::Read).unwrap();
        assert_eq!(description.id_path, None);
        assert_eq!(description.output_path, None);
    }

    #[test]
    fn test_schema_tables_cover_call_fields() {
        let names: Vec<_> = CALL_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["path", "http_method", "body", "id_path", "json_path", "headers"]
        );
        assert!(RESOURCE_FIELDS.iter().any(|f| f.name == "endpoint" && f.required));
    }
}
