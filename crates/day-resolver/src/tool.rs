//! Tool-call contract for exposing the resolver to AI agents.
//!
//! A tool call carries one string argument, `date_input`, and answers with
//! one field, `date`: an ISO 8601 `YYYY-MM-DD` string, or `null` when the
//! phrase is not recognized. Presenting `null` to an end user (for example
//! as a clarification question) is the caller's job.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::clock::Clock;
use crate::error::ResolverError;
use crate::resolver::DateExpressionResolver;

/// Name under which the resolver is published as a tool.
pub const TOOL_NAME: &str = "get_date_from_input";

const TOOL_DESCRIPTION: &str = "Returns a date string (YYYY-MM-DD) for a natural language \
    day expression relative to today. Supported forms: \"today\", \"yesterday\", \
    \"tomorrow\", \"5 days ago\", \"in 3 days\", \"10 days before\", \"after 7 days\". \
    Returns null if the input is not recognized.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateToolRequest {
    /// Natural language date expression.
    pub date_input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateToolResponse {
    /// `YYYY-MM-DD`, or `None` when unrecognized.
    pub date: Option<String>,
}

/// Published tool metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// The resolver bound to a clock, ready to answer tool calls.
pub struct DateTool {
    resolver: DateExpressionResolver,
    clock: Box<dyn Clock + Send + Sync>,
}

impl DateTool {
    pub fn new<C>(resolver: DateExpressionResolver, clock: C) -> Self
    where
        C: Clock + Send + Sync + 'static,
    {
        Self {
            resolver,
            clock: Box::new(clock),
        }
    }

    pub fn resolver(&self) -> &DateExpressionResolver {
        &self.resolver
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "date_input": {
                        "type": "string",
                        "description": "Natural language date input, e.g. \"tomorrow\" or \"in 3 days\""
                    }
                },
                "required": ["date_input"]
            }),
        }
    }

    /// Resolve the request against today's date from the tool's clock.
    pub fn call(&self, request: &DateToolRequest) -> DateToolResponse {
        let today = self.clock.today();
        let resolved = self.resolver.resolve(&request.date_input, today);

        match &resolved {
            Some(r) => debug!(
                input = %request.date_input,
                %today,
                date = %r.date,
                rule = ?r.rule,
                "resolved date expression"
            ),
            None => debug!(
                input = %request.date_input,
                %today,
                "unrecognized date expression"
            ),
        }

        DateToolResponse {
            date: resolved.map(|r| r.to_iso_string()),
        }
    }

    /// Decode raw JSON tool arguments and resolve them.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidArguments`] if `arguments` is not an
    /// object with a string `date_input` field.
    pub fn call_json(&self, arguments: Value) -> Result<DateToolResponse, ResolverError> {
        let request: DateToolRequest = serde_json::from_value(arguments)
            .map_err(|e| ResolverError::InvalidArguments(e.to_string()))?;
        Ok(self.call(&request))
    }

    /// Route a named tool call to this tool.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::UnknownTool`] for any name other than
    /// [`TOOL_NAME`], or the errors of [`DateTool::call_json`].
    pub fn dispatch(&self, name: &str, arguments: Value) -> Result<DateToolResponse, ResolverError> {
        if name != TOOL_NAME {
            return Err(ResolverError::UnknownTool(name.to_string()));
        }
        self.call_json(arguments)
    }
}
