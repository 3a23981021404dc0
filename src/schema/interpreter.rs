//! Schema interpreter
//!
//! Turns a `(FormSchema, UiHintMap)` pair into everything the form renderer
//! needs: initial values from schema defaults, an ordered validation rule
//! set per field, per-keystroke value coercion, and a sectioned render plan.
//!
//! Throughout this module "absent" (a missing map entry / `None`) is distinct
//! from empty or zero: an intentionally cleared field must neither re-acquire
//! its schema default nor pass a required check as "present but empty".

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::types::{FieldSchema, FieldType, FormSchema, UiHint, UiHintMap};

const EMAIL_SHAPE: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const ISO_DATE: &str = "%Y-%m-%d";

/// Compiled once; the pattern is a constant.
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_SHAPE).expect("EMAIL_SHAPE is a valid regex"))
}

// ============================================================================
// Initial values
// ============================================================================

/// Seed values from schema defaults. Presence of the `default` key triggers
/// inclusion, even for `null`, `false`, or `""`; fields without one stay
/// absent rather than getting a type-appropriate zero.
pub fn initial_values(schema: &FormSchema) -> HashMap<String, Value> {
    schema
        .properties
        .iter()
        .filter_map(|(name, field)| field.default.clone().map(|v| (name.clone(), v)))
        .collect()
}

// ============================================================================
// Validation rules
// ============================================================================

/// One validation constraint. Rules are evaluated in the order `rules_for`
/// emits them; the UI surfaces only the first failure per field.
#[derive(Clone, Debug)]
pub enum Rule {
    Required,
    MinLength(u64),
    MaxLength(u64),
    Email,
    Pattern { regex: Regex, message: String },
    Minimum(f64),
    Maximum(f64),
}

impl Rule {
    /// Whether `value` satisfies this rule. Every rule except `Required`
    /// passes on an absent value; requiredness is the only presence check.
    pub fn check(&self, value: Option<&Value>) -> bool {
        let present = match value {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        };
        match self {
            Rule::Required => present.is_some(),
            Rule::MinLength(min) => match present.and_then(Value::as_str) {
                Some(s) => s.chars().count() as u64 >= *min,
                None => true,
            },
            Rule::MaxLength(max) => match present.and_then(Value::as_str) {
                Some(s) => s.chars().count() as u64 <= *max,
                None => true,
            },
            Rule::Email => match present.and_then(Value::as_str) {
                Some(s) => email_regex().is_match(s),
                None => true,
            },
            Rule::Pattern { regex, .. } => match present.and_then(Value::as_str) {
                Some(s) => regex.is_match(s),
                None => true,
            },
            Rule::Minimum(min) => match present.and_then(Value::as_f64) {
                Some(n) => n >= *min,
                None => true,
            },
            Rule::Maximum(max) => match present.and_then(Value::as_f64) {
                Some(n) => n <= *max,
                None => true,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            Rule::Required => "Required".to_string(),
            Rule::MinLength(min) => format!("Min {min} characters"),
            Rule::MaxLength(max) => format!("Max {max} characters"),
            Rule::Email => "Please enter a valid email".to_string(),
            Rule::Pattern { message, .. } => message.clone(),
            Rule::Minimum(min) => format!("Minimum {min}"),
            Rule::Maximum(max) => format!("Maximum {max}"),
        }
    }
}

/// Derive the ordered rule set for one field: requiredness first, then
/// string constraints, then numeric bounds. An invalid `pattern` drops only
/// that one rule so a malformed admin-authored regex never breaks the form.
pub fn rules_for(name: &str, field: &FieldSchema, required: &[String]) -> Vec<Rule> {
    let mut rules = Vec::new();
    if required.iter().any(|r| r == name) {
        rules.push(Rule::Required);
    }
    match field.field_type {
        FieldType::String => {
            if let Some(min) = field.min_length {
                rules.push(Rule::MinLength(min));
            }
            if let Some(max) = field.max_length {
                rules.push(Rule::MaxLength(max));
            }
            if field.is_email() {
                rules.push(Rule::Email);
            }
            if let Some(pattern) = &field.pattern {
                match Regex::new(pattern) {
                    Ok(regex) => rules.push(Rule::Pattern {
                        regex,
                        message: field
                            .pattern_message
                            .clone()
                            .unwrap_or_else(|| "Invalid format".to_string()),
                    }),
                    Err(err) => {
                        log::warn!("dropping invalid pattern on field {name}: {err}");
                    }
                }
            }
        }
        FieldType::Number | FieldType::Integer => {
            if let Some(min) = field.minimum {
                rules.push(Rule::Minimum(min));
            }
            if let Some(max) = field.maximum {
                rules.push(Rule::Maximum(max));
            }
        }
        FieldType::Boolean => {}
    }
    rules
}

/// Message of the first failing rule, if any.
pub fn first_violation(rules: &[Rule], value: Option<&Value>) -> Option<String> {
    rules
        .iter()
        .find(|rule| !rule.check(value))
        .map(Rule::message)
}

/// Drop empty-string (and explicit null) entries so optional string fields
/// reported as `""` by their controls are simply omitted, and required
/// string fields submitted empty fail the required rule.
pub fn prune_empty(values: &HashMap<String, Value>) -> HashMap<String, Value> {
    values
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Null) && v.as_str() != Some(""))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Full-form validation against pruned values. Returns the first failing
/// message per field; an empty map means the submission may proceed.
pub fn validate(schema: &FormSchema, values: &HashMap<String, Value>) -> HashMap<String, String> {
    let pruned = prune_empty(values);
    let mut errors = HashMap::new();
    for (name, field) in &schema.properties {
        let rules = rules_for(name, field, &schema.required);
        if let Some(message) = first_violation(&rules, pruned.get(name)) {
            errors.insert(name.clone(), message);
        }
    }
    errors
}

// ============================================================================
// Coercion
// ============================================================================

/// Per-change normalization, independent of validation. `None` means absent.
pub fn coerce_on_change(field: &FieldSchema, raw: &Value) -> Option<Value> {
    match field.field_type {
        FieldType::Boolean => Some(Value::Bool(truthy(raw))),
        FieldType::Integer => coerce_numeric(raw, true),
        FieldType::Number => coerce_numeric(raw, false),
        FieldType::String if field.is_date() => coerce_date(raw),
        FieldType::String => match raw {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            other => Some(other.clone()),
        },
    }
}

/// Strip everything but digits, sign, and decimal point, then parse.
/// Integers truncate toward zero after the parse, so `"-3.9abc"` becomes
/// `-3`. An empty or unparsable remainder is absent, never zero.
fn coerce_numeric(raw: &Value, integer: bool) -> Option<Value> {
    let text = match raw {
        Value::Null => return None,
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    if stripped.is_empty() {
        return None;
    }
    let parsed = stripped.parse::<f64>().ok()?;
    if integer {
        Some(Value::from(parsed.trunc() as i64))
    } else {
        serde_json::Number::from_f64(parsed).map(Value::Number)
    }
}

/// A date field stores an ISO calendar date; anything the picker reports
/// that is not a valid `YYYY-MM-DD` becomes absent.
fn coerce_date(raw: &Value) -> Option<Value> {
    let text = raw.as_str()?;
    NaiveDate::parse_from_str(text, ISO_DATE)
        .ok()
        .map(|_| Value::String(text.to_string()))
}

/// JS-style truthiness, used only for boolean fields (which are never
/// absent once touched).
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ============================================================================
// Render plan
// ============================================================================

/// One field placed in the grid: its schema, its hints, and its span.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedField {
    pub name: String,
    pub schema: FieldSchema,
    pub hint: UiHint,
    pub required: bool,
}

impl PlannedField {
    pub fn label(&self) -> &str {
        self.schema.title.as_deref().unwrap_or(&self.name)
    }

    pub fn col_span(&self) -> i64 {
        self.hint.col_span()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    /// `None` for the implicit unnamed section.
    pub name: Option<String>,
    pub fields: Vec<PlannedField>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPlan {
    pub sections: Vec<Section>,
}

/// Partition fields into sections by `ui:section`. The implicit unnamed
/// section always renders first regardless of property declaration order;
/// named sections follow in first-appearance order, and property order is
/// preserved within each section.
pub fn plan(schema: &FormSchema, hints: &UiHintMap) -> RenderPlan {
    let mut unnamed: Vec<PlannedField> = Vec::new();
    let mut named: Vec<(String, Vec<PlannedField>)> = Vec::new();

    for (name, field) in &schema.properties {
        let hint = hints.get(name).cloned().unwrap_or_default();
        let section = hint.section.clone().filter(|s| !s.is_empty());
        let planned = PlannedField {
            name: name.clone(),
            schema: field.clone(),
            hint,
            required: schema.is_required(name),
        };
        match section {
            None => unnamed.push(planned),
            Some(section) => match named.iter_mut().find(|(n, _)| *n == section) {
                Some((_, fields)) => fields.push(planned),
                None => named.push((section, vec![planned])),
            },
        }
    }

    let mut sections = Vec::new();
    if !unnamed.is_empty() {
        sections.push(Section {
            name: None,
            fields: unnamed,
        });
    }
    sections.extend(named.into_iter().map(|(name, fields)| Section {
        name: Some(name),
        fields,
    }));
    RenderPlan { sections }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::parse_ui_hints;
    use serde_json::json;

    fn schema(value: Value) -> FormSchema {
        FormSchema::from_value(&value)
    }

    #[test]
    fn empty_properties_yield_no_fields_and_no_values() {
        let schema = schema(json!({ "type": "object", "properties": {} }));
        assert!(initial_values(&schema).is_empty());
        assert!(plan(&schema, &UiHintMap::new()).sections.is_empty());
    }

    #[test]
    fn defaults_are_included_by_presence_not_truthiness() {
        let schema = schema(json!({
            "type": "object",
            "properties": {
                "agree": { "type": "boolean", "default": false },
                "notes": { "type": "string", "default": "" },
                "extra": { "type": "string", "default": null },
                "blank": { "type": "string" }
            }
        }));
        let values = initial_values(&schema);
        assert_eq!(values.get("agree"), Some(&json!(false)));
        assert_eq!(values.get("notes"), Some(&json!("")));
        assert_eq!(values.get("extra"), Some(&Value::Null));
        assert!(!values.contains_key("blank"));
    }

    #[test]
    fn rule_order_is_required_then_string_then_numeric() {
        let field: FieldSchema = serde_json::from_value(json!({
            "type": "string",
            "minLength": 2,
            "maxLength": 10,
            "format": "email",
            "pattern": "^a"
        }))
        .unwrap();
        let rules = rules_for("email", &field, &["email".to_string()]);
        assert!(matches!(rules[0], Rule::Required));
        assert!(matches!(rules[1], Rule::MinLength(2)));
        assert!(matches!(rules[2], Rule::MaxLength(10)));
        assert!(matches!(rules[3], Rule::Email));
        assert!(matches!(rules[4], Rule::Pattern { .. }));
    }

    #[test]
    fn invalid_pattern_drops_only_that_rule() {
        let field: FieldSchema = serde_json::from_value(json!({
            "type": "string",
            "minLength": 2,
            "pattern": "([unclosed"
        }))
        .unwrap();
        let rules = rules_for("code", &field, &[]);
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0], Rule::MinLength(2)));
    }

    #[test]
    fn pattern_message_falls_back_to_default() {
        let field: FieldSchema = serde_json::from_value(json!({
            "type": "string",
            "pattern": "^[A-Z]+$"
        }))
        .unwrap();
        let rules = rules_for("code", &field, &[]);
        assert_eq!(
            first_violation(&rules, Some(&json!("abc"))),
            Some("Invalid format".to_string())
        );

        let field: FieldSchema = serde_json::from_value(json!({
            "type": "string",
            "pattern": "^[A-Z]+$",
            "patternMessage": "Capitals only"
        }))
        .unwrap();
        let rules = rules_for("code", &field, &[]);
        assert_eq!(
            first_violation(&rules, Some(&json!("abc"))),
            Some("Capitals only".to_string())
        );
    }

    #[test]
    fn email_regex_is_cached_and_matches_shape() {
        assert!(std::ptr::eq(email_regex(), email_regex()));

        let field: FieldSchema =
            serde_json::from_value(json!({ "type": "string", "format": "email" })).unwrap();
        let rules = rules_for("email", &field, &[]);
        assert_eq!(
            first_violation(&rules, Some(&json!("not-an-email"))),
            Some("Please enter a valid email".to_string())
        );
        assert_eq!(first_violation(&rules, Some(&json!("a@b.co"))), None);
    }

    #[test]
    fn required_email_submitted_empty_fails_required() {
        let schema = schema(json!({
            "type": "object",
            "properties": { "email": { "type": "string", "format": "email" } },
            "required": ["email"]
        }));
        let values = HashMap::from([("email".to_string(), json!(""))]);
        let errors = validate(&schema, &values);
        assert_eq!(errors.get("email"), Some(&"Required".to_string()));
    }

    #[test]
    fn numeric_bounds_apply_to_numbers_only() {
        let schema = schema(json!({
            "type": "object",
            "properties": { "age": { "type": "number", "minimum": 0.0, "maximum": 120.0 } }
        }));
        let errors = validate(&schema, &HashMap::from([("age".to_string(), json!(-1))]));
        assert_eq!(errors.get("age"), Some(&"Minimum 0".to_string()));

        let errors = validate(&schema, &HashMap::from([("age".to_string(), json!(130))]));
        assert_eq!(errors.get("age"), Some(&"Maximum 120".to_string()));

        assert!(validate(&schema, &HashMap::new()).is_empty());
    }

    #[test]
    fn integer_coercion_strips_parses_then_truncates() {
        let field: FieldSchema =
            serde_json::from_value(json!({ "type": "integer", "minimum": 0.0 })).unwrap();
        assert_eq!(coerce_on_change(&field, &json!("-3.9abc")), Some(json!(-3)));
        assert_eq!(coerce_on_change(&field, &json!("3.9")), Some(json!(3)));
        assert_eq!(coerce_on_change(&field, &json!("42")), Some(json!(42)));
        assert_eq!(coerce_on_change(&field, &json!("")), None);
        assert_eq!(coerce_on_change(&field, &Value::Null), None);
        assert_eq!(coerce_on_change(&field, &json!("abc")), None);
    }

    #[test]
    fn number_coercion_keeps_fractions() {
        let field: FieldSchema = serde_json::from_value(json!({ "type": "number" })).unwrap();
        assert_eq!(coerce_on_change(&field, &json!("3.5kg")), Some(json!(3.5)));
        assert_eq!(coerce_on_change(&field, &json!("1.2.3")), None);
    }

    #[test]
    fn boolean_coercion_is_never_absent() {
        let field: FieldSchema = serde_json::from_value(json!({ "type": "boolean" })).unwrap();
        assert_eq!(coerce_on_change(&field, &Value::Null), Some(json!(false)));
        assert_eq!(coerce_on_change(&field, &json!("")), Some(json!(false)));
        assert_eq!(coerce_on_change(&field, &json!("yes")), Some(json!(true)));
        assert_eq!(coerce_on_change(&field, &json!(0)), Some(json!(false)));
        assert_eq!(coerce_on_change(&field, &json!(true)), Some(json!(true)));
    }

    #[test]
    fn date_coercion_validates_iso_dates() {
        let field: FieldSchema =
            serde_json::from_value(json!({ "type": "string", "format": "date" })).unwrap();
        assert_eq!(
            coerce_on_change(&field, &json!("2024-02-29")),
            Some(json!("2024-02-29"))
        );
        assert_eq!(coerce_on_change(&field, &json!("2023-02-29")), None);
        assert_eq!(coerce_on_change(&field, &json!("yesterday")), None);
        assert_eq!(coerce_on_change(&field, &json!("")), None);
    }

    #[test]
    fn empty_string_becomes_absent_untrimmed_otherwise() {
        let field: FieldSchema = serde_json::from_value(json!({ "type": "string" })).unwrap();
        assert_eq!(coerce_on_change(&field, &json!("")), None);
        assert_eq!(
            coerce_on_change(&field, &json!("  padded  ")),
            Some(json!("  padded  "))
        );
    }

    #[test]
    fn unnamed_section_renders_first() {
        let schema = schema(json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "string" },
                "c": { "type": "string" },
                "d": { "type": "string" }
            }
        }));
        let hints = parse_ui_hints(&json!({
            "a": { "ui:section": "Details" },
            "c": { "ui:section": "Details" },
            "d": { "ui:section": "Extras" }
        }));
        let plan = plan(&schema, &hints);

        assert_eq!(plan.sections.len(), 3);
        assert_eq!(plan.sections[0].name, None);
        assert_eq!(plan.sections[0].fields[0].name, "b");
        assert_eq!(plan.sections[1].name.as_deref(), Some("Details"));
        let details: Vec<&str> = plan.sections[1]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(details, ["a", "c"]);
        assert_eq!(plan.sections[2].name.as_deref(), Some("Extras"));
    }

    #[test]
    fn planned_field_label_prefers_title_owned_by_caller() {
        let schema = schema(json!({
            "type": "object",
            "properties": {
                "full_name": { "type": "string", "title": "Full Name" },
                "nickname": { "type": "string" }
            },
            "required": ["full_name"]
        }));
        let plan = plan(&schema, &UiHintMap::new());
        let fields = &plan.sections[0].fields;

        // the renderer takes an owned copy of the label and then moves the
        // field's schema and hint into child props separately
        let label = fields[0].label().to_string();
        let (schema, hint) = (fields[0].schema.clone(), fields[0].hint.clone());
        assert_eq!(label, "Full Name");
        assert_eq!(schema.title.as_deref(), Some("Full Name"));
        assert_eq!(hint, UiHint::default());
        assert!(fields[0].required);

        assert_eq!(fields[1].label(), "nickname");
        assert!(!fields[1].required);
    }

    #[test]
    fn prune_drops_empty_strings_and_nulls() {
        let values = HashMap::from([
            ("keep".to_string(), json!("x")),
            ("empty".to_string(), json!("")),
            ("null".to_string(), Value::Null),
            ("zero".to_string(), json!(0)),
        ]);
        let pruned = prune_empty(&values);
        assert_eq!(pruned.len(), 2);
        assert!(pruned.contains_key("keep"));
        assert!(pruned.contains_key("zero"));
    }
}
