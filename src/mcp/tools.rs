//! Tool catalogue and the uniform invocation wrapper.
//!
//! Every tool is a [`ToolDefinition`] (what `tools/list` reports) paired
//! with a handler function. [`invoke`] is the only place that turns a
//! handler outcome into a result payload:
//!
//! ```text
//! required args present? ──no──▶ {"success": false, "error": "<field> is required"}
//!         │yes
//!         ▼
//!   handler(gateway) ──Err──▶ {"success": false, "error": "<message>"}
//!         │Ok(payload)
//!         ▼
//! {"success": true, ...payload}
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::access::{AccessGateway, GatewayError};
use crate::mcp::handlers;

/// Payload fields merged into a successful result.
pub type Payload = Map<String, Value>;

/// Outcome of a tool handler.
pub type ToolOutcome = Result<Payload, ToolError>;

/// Signature shared by all tool handlers.
pub type ToolHandler = fn(&mut ToolContext<'_>, &ToolArguments<'_>) -> ToolOutcome;

/// Errors a tool handler can report.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required argument is absent or empty.
    #[error("{field} is required")]
    MissingArgument {
        /// Argument name.
        field: String,
    },

    /// An argument has the wrong JSON type.
    #[error("{field} must be {expected}")]
    WrongType {
        /// Argument name.
        field: String,
        /// Expected type, with article.
        expected: &'static str,
    },

    /// An argument could not be decoded.
    #[error("Invalid {field}: {message}")]
    InvalidArgument {
        /// Argument name.
        field: String,
        /// Decoder message.
        message: String,
    },

    /// The gateway operation failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ToolError {
    /// Creates a missing argument error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingArgument {
            field: field.into(),
        }
    }
}

/// What a handler may touch while it runs.
pub struct ToolContext<'a> {
    /// The process-wide gateway.
    pub gateway: &'a mut AccessGateway,
    /// Database opened by `connect_access` when no path is given.
    pub default_database: Option<&'a Path>,
}

/// Read access to a tool's `arguments` object.
#[derive(Debug, Clone, Copy)]
pub struct ToolArguments<'a> {
    value: &'a Value,
}

impl<'a> ToolArguments<'a> {
    /// Wraps an `arguments` value. Non-objects behave as empty objects.
    #[must_use]
    pub const fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Returns the argument unless it is absent or `null`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.value.get(field).filter(|v| !v.is_null())
    }

    /// Returns whether the argument is present and non-empty.
    ///
    /// Empty strings and empty arrays count as absent.
    #[must_use]
    pub fn is_present(&self, field: &str) -> bool {
        match self.get(field) {
            None => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// Returns a required argument of any type.
    ///
    /// # Errors
    ///
    /// Returns `MissingArgument` if it is absent.
    pub fn value(&self, field: &str) -> Result<&'a Value, ToolError> {
        self.get(field).ok_or_else(|| ToolError::missing(field))
    }

    /// Returns a required non-empty string argument.
    ///
    /// # Errors
    ///
    /// Returns `MissingArgument` or `WrongType`.
    pub fn str(&self, field: &str) -> Result<&'a str, ToolError> {
        match self.optional_str(field)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(ToolError::missing(field)),
        }
    }

    /// Returns an optional string argument. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns `WrongType` if the argument is present but not a string.
    pub fn optional_str(&self, field: &str) -> Result<Option<&'a str>, ToolError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ToolError::WrongType {
                field: field.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Decodes a required argument into `T`.
    ///
    /// # Errors
    ///
    /// Returns `MissingArgument` or `InvalidArgument`.
    pub fn parse<T: DeserializeOwned>(&self, field: &str) -> Result<T, ToolError> {
        let value = self.value(field)?;
        T::deserialize(value).map_err(|e| ToolError::InvalidArgument {
            field: field.to_string(),
            message: e.to_string(),
        })
    }
}

/// A tool definition for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
    /// Names of required arguments, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<&'static str>,
}

/// A tool definition with its handler.
pub struct Tool {
    /// What `tools/list` reports.
    pub definition: ToolDefinition,
    handler: ToolHandler,
}

impl Tool {
    /// Declares a tool. `properties` is the JSON Schema `properties` object.
    #[must_use]
    pub fn new(
        name: &'static str,
        description: &'static str,
        properties: Value,
        required: &[&'static str],
        handler: ToolHandler,
    ) -> Self {
        let mut input_schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            input_schema["required"] = json!(required);
        }

        Self {
            definition: ToolDefinition {
                name,
                description,
                input_schema,
                required: required.to_vec(),
            },
            handler,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.definition.name
    }

    /// Checks that every required argument is present and non-empty.
    fn check_required(&self, args: &ToolArguments<'_>) -> Result<(), ToolError> {
        self.definition
            .required
            .iter()
            .find(|field| !args.is_present(field))
            .map_or(Ok(()), |field| Err(ToolError::missing(*field)))
    }
}

/// The static tool catalogue, in declaration order.
pub struct ToolRegistry {
    tools: IndexMap<&'static str, Tool>,
}

impl ToolRegistry {
    /// Builds the catalogue of all database tools.
    #[must_use]
    pub fn new() -> Self {
        Self::from_tools(handlers::catalogue())
    }

    /// Builds a registry from explicit tools. Later duplicates replace earlier ones.
    #[must_use]
    pub fn from_tools(tools: Vec<Tool>) -> Self {
        Self {
            tools: tools.into_iter().map(|tool| (tool.name(), tool)).collect(),
        }
    }

    /// Looks a tool up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Returns all definitions in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|tool| &tool.definition)
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a tool and wraps the outcome as a result payload.
///
/// Never fails: every error becomes `{"success": false, "error": ...}`.
pub fn invoke(tool: &Tool, context: &mut ToolContext<'_>, arguments: &Value) -> Value {
    let args = ToolArguments::new(arguments);
    let outcome = tool
        .check_required(&args)
        .and_then(|()| (tool.handler)(context, &args));

    match outcome {
        Ok(payload) => {
            let mut result = Map::with_capacity(payload.len() + 1);
            result.insert("success".to_string(), Value::Bool(true));
            result.extend(payload);
            Value::Object(result)
        }
        Err(e) => {
            debug!(tool = tool.name(), error = %e, "Tool call failed");
            json!({
                "success": false,
                "error": e.to_string(),
            })
        }
    }
}

/// Turns a `json!` object literal into a payload.
///
/// Non-object values are placed under a `value` key.
#[must_use]
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}
