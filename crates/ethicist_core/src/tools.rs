//! Tool abstraction types: argument schemas, validation, definitions and the
//! result envelope returned to protocol clients.

use crate::error::EthicistError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ============================================================================
// Argument schema
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgKind {
    String,
    Enum(&'static [&'static str]),
    StringList,
    EnumList(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgDefault {
    Text(&'static str),
    List(&'static [&'static str]),
}

impl ArgDefault {
    fn to_value(self) -> ArgValue {
        match self {
            ArgDefault::Text(s) => ArgValue::Text(s.to_string()),
            ArgDefault::List(items) => {
                ArgValue::List(items.iter().map(|s| s.to_string()).collect())
            }
        }
    }

    fn to_json(self) -> Value {
        match self {
            ArgDefault::Text(s) => json!(s),
            ArgDefault::List(items) => json!(items),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArgField {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub default: Option<ArgDefault>,
}

impl ArgField {
    pub const fn required(name: &'static str, description: &'static str, kind: ArgKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str, kind: ArgKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: ArgDefault) -> Self {
        self.default = Some(default);
        self
    }

    fn json_schema(&self) -> Value {
        let mut prop = match self.kind {
            ArgKind::String => json!({ "type": "string" }),
            ArgKind::Enum(allowed) => json!({ "type": "string", "enum": allowed }),
            ArgKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            ArgKind::EnumList(allowed) => json!({
                "type": "array",
                "items": { "type": "string", "enum": allowed }
            }),
        };
        prop["description"] = json!(self.description);
        if let Some(default) = self.default {
            prop["default"] = default.to_json();
        }
        prop
    }

    fn validate(&self, value: &Value) -> Result<ArgValue, EthicistError> {
        match self.kind {
            ArgKind::String => {
                let s = self.expect_string(value)?;
                if self.required && s.trim().is_empty() {
                    return Err(EthicistError::invalid_argument(self.name, "must not be empty"));
                }
                Ok(ArgValue::Text(s.to_string()))
            }
            ArgKind::Enum(allowed) => {
                let s = self.expect_string(value)?;
                check_allowed(self.name, s, allowed)?;
                Ok(ArgValue::Text(s.to_string()))
            }
            ArgKind::StringList => Ok(ArgValue::List(self.expect_list(value, None)?)),
            ArgKind::EnumList(allowed) => Ok(ArgValue::List(self.expect_list(value, Some(allowed))?)),
        }
    }

    fn expect_string<'v>(&self, value: &'v Value) -> Result<&'v str, EthicistError> {
        value.as_str().ok_or_else(|| {
            EthicistError::invalid_argument(
                self.name,
                format!("expected a string, got {}", json_type(value)),
            )
        })
    }

    fn expect_list(
        &self,
        value: &Value,
        allowed: Option<&[&str]>,
    ) -> Result<Vec<String>, EthicistError> {
        let items = value.as_array().ok_or_else(|| {
            EthicistError::invalid_argument(
                self.name,
                format!("expected a list of strings, got {}", json_type(value)),
            )
        })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let s = item.as_str().ok_or_else(|| {
                    EthicistError::invalid_argument(
                        self.name,
                        format!("item {} must be a string, got {}", i, json_type(item)),
                    )
                })?;
                if let Some(allowed) = allowed {
                    check_allowed(self.name, s, allowed)?;
                }
                Ok(s.to_string())
            })
            .collect()
    }
}

fn check_allowed(field: &str, value: &str, allowed: &[&str]) -> Result<(), EthicistError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(EthicistError::invalid_argument(
            field,
            format!("'{}' is not one of: {}", value, allowed.join(", ")),
        ))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON Schema for tool input parameters, as advertised to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: Value,
    pub required: Vec<String>,
}

/// Ordered field list for one tool.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub fields: Vec<ArgField>,
}

impl ToolSchema {
    pub fn new(fields: Vec<ArgField>) -> Self {
        Self { fields }
    }

    pub fn input_schema(&self) -> ToolInputSchema {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Value::Object(properties),
            required: self
                .fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name.to_string())
                .collect(),
        }
    }

    /// Check an argument bag against the schema, applying defaults.
    ///
    /// `null` (or an absent bag) counts as an empty object, and a `null` field
    /// counts as absent. Fields the schema does not declare are ignored.
    pub fn validate(&self, input: &Value) -> Result<ToolArgs, EthicistError> {
        let empty = Map::new();
        let bag = match input {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(EthicistError::invalid_argument(
                    "arguments",
                    format!("expected an object, got {}", json_type(other)),
                ))
            }
        };

        for key in bag.keys() {
            if !self.fields.iter().any(|f| f.name == key.as_str()) {
                tracing::debug!("Ignoring undeclared argument: {}", key);
            }
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match bag.get(field.name).filter(|v| !v.is_null()) {
                Some(value) => values.push((field.name, field.validate(value)?)),
                None if field.required => {
                    return Err(EthicistError::invalid_argument(
                        field.name,
                        "missing required argument",
                    ))
                }
                None => {
                    if let Some(default) = field.default {
                        values.push((field.name, default.to_value()));
                    }
                }
            }
        }
        Ok(ToolArgs { values })
    }
}

// ============================================================================
// Validated arguments
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    List(Vec<String>),
}

/// Arguments that passed schema validation. Optional fields without a
/// default are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Vec<(&'static str, ArgValue)>,
}

impl ToolArgs {
    fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ArgValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text value, or the empty string when absent.
    pub fn text_or_empty(&self, name: &str) -> &str {
        self.text(name).unwrap_or_default()
    }

    pub fn list(&self, name: &str) -> &[String] {
        match self.get(name) {
            Some(ArgValue::List(items)) => items.as_slice(),
            _ => &[],
        }
    }
}

// ============================================================================
// Definitions and results
// ============================================================================

/// A tool: schema, role-setting system instruction, and pure renderers.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: ToolSchema,
    pub system_instruction: &'static str,
    /// Builds the user prompt from validated arguments.
    pub render: fn(&ToolArgs) -> String,
    /// Static reference material appended after the model's answer.
    pub reference: Option<fn(&ToolArgs) -> String>,
}

impl ToolDefinition {
    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.schema.input_schema(),
        }
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

/// Content envelope returned for a successful tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: String) -> Self {
        Self {
            content: vec![ContentBlock::Text { text }],
            is_error: false,
        }
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.content.push(ContentBlock::Text { text });
        self
    }

    /// All text blocks, joined by blank lines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|ContentBlock::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: &[&str] = &["red", "green"];

    fn schema() -> ToolSchema {
        ToolSchema::new(vec![
            ArgField::required("topic", "What to discuss", ArgKind::String),
            ArgField::optional("level", "Depth", ArgKind::Enum(&["low", "high"]))
                .with_default(ArgDefault::Text("low")),
            ArgField::optional("colors", "Palette", ArgKind::EnumList(COLORS))
                .with_default(ArgDefault::List(COLORS)),
            ArgField::optional("tags", "Free-form tags", ArgKind::StringList),
        ])
    }

    fn field_of(err: EthicistError) -> String {
        match err {
            EthicistError::InvalidArgument { field, .. } => field,
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_input_schema_keeps_declaration_order() {
        let schema = schema().input_schema();
        let keys: Vec<&str> = schema
            .properties
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["topic", "level", "colors", "tags"]);
    }

    #[test]
    fn test_defaults_applied_when_absent() {
        let args = schema().validate(&json!({"topic": "privacy"})).unwrap();
        assert_eq!(args.text("topic"), Some("privacy"));
        assert_eq!(args.text("level"), Some("low"));
        assert_eq!(args.list("colors"), &["red".to_string(), "green".to_string()]);
        assert!(args.list("tags").is_empty());
    }

    #[test]
    fn test_null_bag_and_null_field() {
        let err = schema().validate(&Value::Null).unwrap_err();
        assert_eq!(field_of(err), "topic");

        let args = schema()
            .validate(&json!({"topic": "x", "level": null}))
            .unwrap();
        assert_eq!(args.text("level"), Some("low"));
    }

    #[test]
    fn test_type_mismatches() {
        let s = schema();
        assert_eq!(field_of(s.validate(&json!({"topic": 3})).unwrap_err()), "topic");
        assert_eq!(
            field_of(s.validate(&json!({"topic": "x", "level": "extreme"})).unwrap_err()),
            "level"
        );
        assert_eq!(
            field_of(s.validate(&json!({"topic": "x", "tags": "a,b"})).unwrap_err()),
            "tags"
        );
        assert_eq!(
            field_of(s.validate(&json!({"topic": "x", "tags": ["a", 1]})).unwrap_err()),
            "tags"
        );
        assert_eq!(
            field_of(s.validate(&json!({"topic": "x", "colors": ["blue"]})).unwrap_err()),
            "colors"
        );
        assert_eq!(field_of(s.validate(&json!(["topic"])).unwrap_err()), "arguments");
    }

    #[test]
    fn test_blank_required_string_rejected() {
        let err = schema().validate(&json!({"topic": "   "})).unwrap_err();
        assert_eq!(
            err,
            EthicistError::invalid_argument("topic", "must not be empty")
        );
    }

    #[test]
    fn test_undeclared_fields_ignored_and_empty_list_kept() {
        let args = schema()
            .validate(&json!({"topic": "x", "colors": [], "extra": true}))
            .unwrap();
        assert!(args.list("colors").is_empty());
    }

    #[test]
    fn test_input_schema_shape() {
        let input = schema().input_schema();
        assert_eq!(input.schema_type, "object");
        assert_eq!(input.required, vec!["topic".to_string()]);
        assert_eq!(input.properties["level"]["enum"], json!(["low", "high"]));
        assert_eq!(input.properties["level"]["default"], json!("low"));
        assert_eq!(input.properties["colors"]["items"]["enum"], json!(["red", "green"]));
        assert_eq!(input.properties["tags"]["type"], "array");
        assert!(input.properties["tags"].get("default").is_none());
    }

    #[test]
    fn test_tool_result_envelope() {
        let result = ToolResult::text("answer".into()).with_text("reference".into());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({
                "content": [
                    {"type": "text", "text": "answer"},
                    {"type": "text", "text": "reference"}
                ],
                "isError": false
            })
        );
        assert_eq!(result.joined_text(), "answer\n\nreference");
    }
}
