//! Core types for the dynamic form engine
//!
//! A form definition is a pair of documents: a JSON-Schema-shaped object
//! describing the fields (`FormSchema`) and a sparse companion map of
//! rendering hints (`UiHintMap`). Both arrive as untrusted JSON from the
//! backend or from the Schema Studio's raw editors, so parsing comes in two
//! flavors: a fail-soft path for wire data (`FormSchema::from_value`) and a
//! strict joint parse for admin-authored text (`parse_definition`).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Draft URI stamped on every schema the builder produces.
pub const SCHEMA_DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Title used until the admin names the form.
pub const DEFAULT_FORM_TITLE: &str = "New Form";

// ============================================================================
// Field Type
// ============================================================================

/// The four primitive field types a form property can carry.
///
/// Deserialization is total: any tag outside the closed set classifies as
/// `String`, so a hand-authored schema with an exotic `type` degrades to a
/// plain text field instead of failing the whole form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
}

impl FieldType {
    pub fn classify(tag: &str) -> Self {
        match tag {
            "number" => FieldType::Number,
            "integer" => FieldType::Integer,
            "boolean" => FieldType::Boolean,
            // "string" and everything unrecognized
            _ => FieldType::String,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Number | FieldType::Integer)
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldType::classify(&tag))
    }
}

// ============================================================================
// Field Schema
// ============================================================================

/// One entry of a `FormSchema`'s `properties` map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Presence, not truthiness, is what matters here: `"default": null`
    /// must survive as `Some(Value::Null)` so initial-value derivation can
    /// honor it.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
}

impl FieldSchema {
    /// Enum options rendered as strings, the way the dropdown shows them.
    pub fn enum_strings(&self) -> Vec<String> {
        self.enum_values
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    pub fn has_enum(&self) -> bool {
        self.enum_values.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn is_email(&self) -> bool {
        self.format.as_deref() == Some("email")
    }

    pub fn is_date(&self) -> bool {
        self.format.as_deref() == Some("date")
    }
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)` instead of `None`.
fn deserialize_present<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

// ============================================================================
// Form Schema
// ============================================================================

/// The root schema document for one form.
///
/// `properties` keeps insertion order (display order); `required` is an
/// ordered subset of the property names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(rename = "type", default = "object_type")]
    pub root_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, FieldSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

fn object_type() -> String {
    "object".to_string()
}

impl Default for FormSchema {
    fn default() -> Self {
        Self {
            meta: None,
            root_type: object_type(),
            title: None,
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }
}

impl FormSchema {
    /// Fail-soft wire entry point: a structurally invalid schema (non-object
    /// root, properties of the wrong shape) degrades to an empty field set.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value::<FormSchema>(value.clone()) {
            Ok(schema) if schema.root_type == "object" => schema,
            Ok(schema) => {
                log::warn!("schema root type {:?} is not \"object\"", schema.root_type);
                FormSchema::default()
            }
            Err(err) => {
                log::warn!("malformed form schema: {err}");
                FormSchema::default()
            }
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Schema title when present, otherwise the caller's fallback (usually
    /// the screen title).
    pub fn display_title<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(fallback)
    }
}

// ============================================================================
// UI Hints
// ============================================================================

/// Widget override a hint can request. Classification is tolerant: an
/// unrecognized `ui:widget` string simply selects no override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Widget {
    Textarea,
    Password,
    Updown,
}

impl Widget {
    pub fn classify(tag: &str) -> Option<Self> {
        match tag {
            "textarea" => Some(Widget::Textarea),
            "password" => Some(Widget::Password),
            "updown" => Some(Widget::Updown),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UiOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

/// Per-field rendering hints. Every key is optional; unknown `ui:*` keys are
/// ignored on read (and therefore dropped on a builder round-trip).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UiHint {
    #[serde(rename = "ui:section", default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(rename = "ui:tooltip", default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(
        rename = "ui:placeholder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub placeholder: Option<String>,
    #[serde(rename = "ui:help", default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(rename = "ui:col", default, skip_serializing_if = "Option::is_none")]
    pub col: Option<i64>,
    #[serde(rename = "ui:widget", default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(rename = "ui:options", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<UiOptions>,
}

impl UiHint {
    pub fn widget_kind(&self) -> Option<Widget> {
        self.widget.as_deref().and_then(Widget::classify)
    }

    /// Column span out of 24. Defaults to half width; out-of-range hints fall
    /// back to the default rather than breaking the grid.
    pub fn col_span(&self) -> i64 {
        match self.col {
            Some(col) if (1..=24).contains(&col) => col,
            _ => 12,
        }
    }

    pub fn textarea_rows(&self) -> u32 {
        self.options.as_ref().and_then(|o| o.rows).unwrap_or(3)
    }
}

/// Field name -> hints, in hint-document order.
pub type UiHintMap = IndexMap<String, UiHint>;

/// Fail-soft hint parsing: a non-object document yields no hints, and each
/// malformed entry degrades to an empty hint instead of discarding the rest.
pub fn parse_ui_hints(value: &Value) -> UiHintMap {
    let Some(entries) = value.as_object() else {
        return UiHintMap::new();
    };
    entries
        .iter()
        .map(|(name, hint)| {
            let parsed = serde_json::from_value::<UiHint>(hint.clone()).unwrap_or_else(|err| {
                log::warn!("ignoring malformed ui hints for {name}: {err}");
                UiHint::default()
            });
            (name.clone(), parsed)
        })
        .collect()
}

// ============================================================================
// Joint parse
// ============================================================================

/// Errors from the strict parse path used by the Schema Studio's raw editors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Schema JSON error: {0}")]
    SchemaJson(String),
    #[error("UI Schema JSON error: {0}")]
    UiJson(String),
    #[error("schema root must be an object with type \"object\"")]
    NotAnObject,
    #[error("required field {0:?} is not defined in properties")]
    UnknownRequired(String),
}

/// Parse and validate the schema/hints pair together. The two text buffers
/// are only ever meaningful as a pair, so they are never validated
/// independently.
pub fn parse_definition(
    schema_text: &str,
    ui_text: &str,
) -> Result<(FormSchema, UiHintMap), ParseError> {
    let schema_value: Value = serde_json::from_str(schema_text)
        .map_err(|err| ParseError::SchemaJson(err.to_string()))?;
    let ui_value: Value =
        serde_json::from_str(ui_text).map_err(|err| ParseError::UiJson(err.to_string()))?;

    if !schema_value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    let schema: FormSchema = serde_json::from_value(schema_value)
        .map_err(|err| ParseError::SchemaJson(err.to_string()))?;
    if schema.root_type != "object" {
        return Err(ParseError::NotAnObject);
    }
    for name in &schema.required {
        if !schema.properties.contains_key(name) {
            return Err(ParseError::UnknownRequired(name.clone()));
        }
    }

    Ok((schema, parse_ui_hints(&ui_value)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_type_classifies_as_string() {
        let field: FieldSchema = serde_json::from_value(json!({ "type": "array" })).unwrap();
        assert_eq!(field.field_type, FieldType::String);
    }

    #[test]
    fn null_default_is_preserved() {
        let field: FieldSchema =
            serde_json::from_value(json!({ "type": "string", "default": null })).unwrap();
        assert_eq!(field.default, Some(Value::Null));

        let field: FieldSchema = serde_json::from_value(json!({ "type": "string" })).unwrap();
        assert_eq!(field.default, None);
    }

    #[test]
    fn properties_keep_declaration_order() {
        let schema = FormSchema::from_value(&json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "number" },
                "mid": { "type": "boolean" }
            }
        }));
        let names: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn malformed_schema_degrades_to_empty() {
        assert!(FormSchema::from_value(&json!("not an object"))
            .properties
            .is_empty());
        assert!(FormSchema::from_value(&json!({ "type": "array" }))
            .properties
            .is_empty());
        assert!(FormSchema::from_value(&json!({ "type": "object" }))
            .properties
            .is_empty());
    }

    #[test]
    fn hint_parsing_tolerates_garbage() {
        let hints = parse_ui_hints(&json!({
            "good": { "ui:section": "Contact", "ui:col": 8 },
            "bad": "not an object",
            "unknown_keys": { "ui:novel": true }
        }));
        assert_eq!(hints.len(), 3);
        assert_eq!(hints["good"].section.as_deref(), Some("Contact"));
        assert_eq!(hints["good"].col_span(), 8);
        assert_eq!(hints["bad"], UiHint::default());
        assert_eq!(hints["unknown_keys"], UiHint::default());

        assert!(parse_ui_hints(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn col_span_falls_back_when_out_of_range() {
        let hint = UiHint {
            col: Some(0),
            ..Default::default()
        };
        assert_eq!(hint.col_span(), 12);
        let hint = UiHint {
            col: Some(25),
            ..Default::default()
        };
        assert_eq!(hint.col_span(), 12);
        let hint = UiHint {
            col: Some(24),
            ..Default::default()
        };
        assert_eq!(hint.col_span(), 24);
    }

    #[test]
    fn widget_classification_is_tolerant() {
        let hint: UiHint = serde_json::from_value(json!({ "ui:widget": "hologram" })).unwrap();
        assert_eq!(hint.widget_kind(), None);
        let hint: UiHint = serde_json::from_value(json!({ "ui:widget": "textarea" })).unwrap();
        assert_eq!(hint.widget_kind(), Some(Widget::Textarea));
    }

    #[test]
    fn joint_parse_validates_required_subset() {
        let schema = r#"{ "type": "object", "properties": { "a": { "type": "string" } }, "required": ["missing"] }"#;
        match parse_definition(schema, "{}") {
            Err(ParseError::UnknownRequired(name)) => assert_eq!(name, "missing"),
            other => panic!("expected UnknownRequired, got {other:?}"),
        }
    }

    #[test]
    fn joint_parse_reports_each_buffer() {
        assert!(matches!(
            parse_definition("{ nope", "{}"),
            Err(ParseError::SchemaJson(_))
        ));
        assert!(matches!(
            parse_definition("{\"type\":\"object\"}", "{ nope"),
            Err(ParseError::UiJson(_))
        ));
        assert!(matches!(
            parse_definition("[1,2]", "{}"),
            Err(ParseError::NotAnObject)
        ));
    }
}
