//! Builder / schema transformer
//!
//! The Schema Studio edits an ordered list of `FieldDescriptor`s, a
//! simplified human-friendly view of one form field each. This module owns
//! that model, the deterministic key slugging, the descriptor-list edit
//! session, and the bidirectional transform to and from the
//! `(FormSchema, UiHintMap)` pair the interpreter consumes.
//!
//! The transform is lossy by construction: constraints the descriptor model
//! cannot express (pattern, minLength, unrecognized hints) are dropped on a
//! round-trip. The raw-JSON editors remain the full-fidelity escape hatch.

use serde_json::Value;

use super::types::{
    FieldSchema, FieldType, FormSchema, UiHint, UiHintMap, UiOptions, Widget, DEFAULT_FORM_TITLE,
    SCHEMA_DRAFT,
};

// ============================================================================
// Descriptor model
// ============================================================================

/// The field types the visual builder offers, a superset of the schema
/// primitives: `Text`, `Email`, `Date`, and `Select` all serialize as
/// `string` plus a format, widget, or enum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DescriptorType {
    #[default]
    String,
    Text,
    Number,
    Integer,
    Boolean,
    Email,
    Date,
    Select,
}

impl DescriptorType {
    /// Quick-add palette order.
    pub const ALL: [DescriptorType; 8] = [
        DescriptorType::String,
        DescriptorType::Text,
        DescriptorType::Number,
        DescriptorType::Integer,
        DescriptorType::Boolean,
        DescriptorType::Email,
        DescriptorType::Date,
        DescriptorType::Select,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DescriptorType::String => "Short Text",
            DescriptorType::Text => "Long Text",
            DescriptorType::Number => "Number",
            DescriptorType::Integer => "Integer",
            DescriptorType::Boolean => "Yes/No",
            DescriptorType::Email => "Email",
            DescriptorType::Date => "Date",
            DescriptorType::Select => "Dropdown",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DescriptorType::String => "string",
            DescriptorType::Text => "text",
            DescriptorType::Number => "number",
            DescriptorType::Integer => "integer",
            DescriptorType::Boolean => "boolean",
            DescriptorType::Email => "email",
            DescriptorType::Date => "date",
            DescriptorType::Select => "select",
        }
    }

    pub fn classify(tag: &str) -> Self {
        match tag {
            "text" => DescriptorType::Text,
            "number" => DescriptorType::Number,
            "integer" => DescriptorType::Integer,
            "boolean" => DescriptorType::Boolean,
            "email" => DescriptorType::Email,
            "date" => DescriptorType::Date,
            "select" => DescriptorType::Select,
            _ => DescriptorType::String,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, DescriptorType::Number | DescriptorType::Integer)
    }
}

/// The builder's editable view of one field. Not persisted directly; it
/// exists only inside an edit session and in the transform below.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub field_type: DescriptorType,
    pub required: bool,
    pub placeholder: String,
    /// Only meaningful for `Select`.
    pub options: Vec<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

// ============================================================================
// Key slugging
// ============================================================================

/// Deterministic slug: lowercase, non-alphanumeric runs collapsed to `_`,
/// leading/trailing `_` trimmed, never starting with a digit. Empty input
/// falls back to `"field"`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut pending_sep = false;
    for ch in input.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch);
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        return "field".to_string();
    }
    match slug.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{slug}"),
        _ => slug,
    }
}

/// Slugify `base` and disambiguate against `used` with `_1`, `_2`, ….
/// Pure and deterministic; a base whose slug is already free comes back
/// unsuffixed.
pub fn unique_key(base: &str, used: &[String]) -> String {
    let slug = slugify(base);
    if !used.iter().any(|u| *u == slug) {
        return slug;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{slug}_{suffix}");
        if !used.iter().any(|u| *u == candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

// ============================================================================
// Descriptor list -> schema
// ============================================================================

/// Serialize an ordered descriptor list into the schema/hints pair.
/// Descriptors with an empty name cannot be serialized and are skipped.
pub fn to_schema(descriptors: &[FieldDescriptor], title: &str) -> (FormSchema, UiHintMap) {
    let mut schema = FormSchema {
        meta: Some(SCHEMA_DRAFT.to_string()),
        title: Some(if title.is_empty() {
            DEFAULT_FORM_TITLE.to_string()
        } else {
            title.to_string()
        }),
        ..Default::default()
    };
    let mut hints = UiHintMap::new();

    for descriptor in descriptors {
        if descriptor.name.is_empty() {
            continue;
        }
        let mut field = FieldSchema {
            title: Some(if descriptor.label.is_empty() {
                descriptor.name.clone()
            } else {
                descriptor.label.clone()
            }),
            ..Default::default()
        };
        let mut hint = UiHint::default();

        match descriptor.field_type {
            DescriptorType::String => {}
            DescriptorType::Text => {
                hint.widget = Some("textarea".to_string());
                hint.options = Some(UiOptions { rows: Some(3) });
            }
            DescriptorType::Number => {
                field.field_type = FieldType::Number;
                field.minimum = descriptor.min;
                field.maximum = descriptor.max;
            }
            DescriptorType::Integer => {
                field.field_type = FieldType::Integer;
                field.minimum = descriptor.min;
                field.maximum = descriptor.max;
            }
            DescriptorType::Boolean => {
                field.field_type = FieldType::Boolean;
            }
            DescriptorType::Email => {
                field.format = Some("email".to_string());
            }
            DescriptorType::Date => {
                field.format = Some("date".to_string());
            }
            DescriptorType::Select => {
                field.enum_values = Some(
                    descriptor
                        .options
                        .iter()
                        .filter(|o| !o.is_empty())
                        .map(|o| Value::String(o.clone()))
                        .collect(),
                );
            }
        }

        if !descriptor.placeholder.is_empty() {
            hint.placeholder = Some(descriptor.placeholder.clone());
        }
        if hint != UiHint::default() {
            hints.insert(descriptor.name.clone(), hint);
        }
        if descriptor.required {
            schema.required.push(descriptor.name.clone());
        }
        schema.properties.insert(descriptor.name.clone(), field);
    }

    (schema, hints)
}

// ============================================================================
// Schema -> descriptor list
// ============================================================================

/// Reconstruct an editable descriptor list from a stored definition, one
/// descriptor per property in declaration order. Best-effort: unsupported
/// types classify as plain strings, unmodeled constraints are dropped.
pub fn from_schema(schema: &FormSchema, hints: &UiHintMap) -> Vec<FieldDescriptor> {
    schema
        .properties
        .iter()
        .map(|(name, field)| {
            let hint = hints.get(name).cloned().unwrap_or_default();
            let mut descriptor = FieldDescriptor {
                name: name.clone(),
                label: field.title.clone().unwrap_or_else(|| name.clone()),
                required: schema.is_required(name),
                placeholder: hint.placeholder.clone().unwrap_or_default(),
                ..Default::default()
            };
            match field.field_type {
                FieldType::String => {
                    if field.is_email() {
                        descriptor.field_type = DescriptorType::Email;
                    } else if field.is_date() {
                        descriptor.field_type = DescriptorType::Date;
                    } else if field.has_enum() {
                        descriptor.field_type = DescriptorType::Select;
                        descriptor.options = field.enum_strings();
                    } else if hint.widget_kind() == Some(Widget::Textarea) {
                        descriptor.field_type = DescriptorType::Text;
                    }
                }
                FieldType::Number => {
                    descriptor.field_type = DescriptorType::Number;
                    descriptor.min = field.minimum;
                    descriptor.max = field.maximum;
                }
                FieldType::Integer => {
                    descriptor.field_type = DescriptorType::Integer;
                    descriptor.min = field.minimum;
                    descriptor.max = field.maximum;
                }
                FieldType::Boolean => {
                    descriptor.field_type = DescriptorType::Boolean;
                }
            }
            descriptor
        })
        .collect()
}

// ============================================================================
// Edit session
// ============================================================================

/// The descriptor-list edit session: an ordered list with add, update,
/// remove, and reorder. Key uniqueness is an invariant; collisions are
/// auto-resolved by suffixing and reported as a notice, never an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldList {
    fields: Vec<FieldDescriptor>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Quick-add: append a field of the given type, labeled after the type,
    /// with an auto-generated collision-free key.
    pub fn add(&mut self, field_type: DescriptorType) {
        let label = field_type.label();
        let used: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        let name = unique_key(label, &used);
        self.fields.push(FieldDescriptor {
            name,
            label: label.to_string(),
            field_type,
            ..Default::default()
        });
    }

    /// Replace the descriptor at `index`. If its key collides with another
    /// row the key is re-suffixed; the adjusted key comes back so the UI can
    /// tell the admin.
    pub fn update(&mut self, index: usize, mut descriptor: FieldDescriptor) -> Option<String> {
        if index >= self.fields.len() {
            return None;
        }
        let taken: Vec<String> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, f)| f.name.clone())
            .collect();
        let mut adjusted = None;
        if !descriptor.name.is_empty() && taken.iter().any(|t| *t == descriptor.name) {
            let unique = unique_key(&descriptor.name, &taken);
            adjusted = Some(unique.clone());
            descriptor.name = unique;
        }
        self.fields[index] = descriptor;
        adjusted
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.fields.len() {
            self.fields.remove(index);
        }
    }

    /// No-op on the first row.
    pub fn move_up(&mut self, index: usize) {
        if index > 0 && index < self.fields.len() {
            self.fields.swap(index - 1, index);
        }
    }

    /// No-op on the last row.
    pub fn move_down(&mut self, index: usize) {
        if index + 1 < self.fields.len() {
            self.fields.swap(index, index + 1);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("Full Name"), "full_name");
        assert_eq!(slugify("  --Total (kg)--  "), "total_kg");
        assert_eq!(slugify("9 lives"), "_9_lives");
        assert_eq!(slugify("!!!"), "field");
        assert_eq!(slugify(""), "field");
    }

    #[test]
    fn unique_key_is_idempotent_and_deterministic() {
        let used = vec!["full_name".to_string(), "full_name_1".to_string()];
        assert_eq!(unique_key("Full Name", &used), "full_name_2");
        assert_eq!(unique_key("Full Name", &used), "full_name_2");
        assert_eq!(unique_key("Email", &used), "email");
    }

    #[test]
    fn quick_add_same_label_suffixes() {
        let mut list = FieldList::new();
        list.add(DescriptorType::String);
        list.add(DescriptorType::String);
        assert_eq!(list.fields()[0].name, "short_text");
        assert_eq!(list.fields()[1].name, "short_text_1");
    }

    #[test]
    fn update_collision_is_adjusted_with_notice() {
        let mut list = FieldList::from_fields(vec![
            FieldDescriptor {
                name: "full_name".to_string(),
                label: "Full Name".to_string(),
                ..Default::default()
            },
            FieldDescriptor {
                name: "email".to_string(),
                label: "Email".to_string(),
                field_type: DescriptorType::Email,
                ..Default::default()
            },
        ]);
        let mut renamed = list.fields()[1].clone();
        renamed.name = "full_name".to_string();
        let notice = list.update(1, renamed);
        assert_eq!(notice.as_deref(), Some("full_name_1"));
        assert_eq!(list.fields()[1].name, "full_name_1");
    }

    #[test]
    fn move_is_a_noop_at_boundaries() {
        let mut list = FieldList::from_fields(vec![
            FieldDescriptor {
                name: "a".to_string(),
                ..Default::default()
            },
            FieldDescriptor {
                name: "b".to_string(),
                ..Default::default()
            },
            FieldDescriptor {
                name: "c".to_string(),
                ..Default::default()
            },
        ]);
        list.move_up(0);
        list.move_down(2);
        let names: Vec<&str> = list.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        list.move_up(2);
        let names: Vec<&str> = list.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "c", "b"]);
    }

    #[test]
    fn numeric_descriptor_serializes_bounds_and_title_fallback() {
        let descriptors = vec![FieldDescriptor {
            name: "age".to_string(),
            field_type: DescriptorType::Number,
            min: Some(0.0),
            max: Some(120.0),
            ..Default::default()
        }];
        let (schema, hints) = to_schema(&descriptors, "Vitals");
        let age = &schema.properties["age"];
        assert_eq!(age.field_type, FieldType::Number);
        assert_eq!(age.minimum, Some(0.0));
        assert_eq!(age.maximum, Some(120.0));
        assert_eq!(age.title.as_deref(), Some("age"));
        assert!(hints.is_empty());
        assert!(schema.required.is_empty());

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json.get("required"), None);
        assert_eq!(
            json["properties"]["age"],
            json!({ "type": "number", "title": "age", "minimum": 0.0, "maximum": 120.0 })
        );
    }

    #[test]
    fn unnamed_descriptors_are_skipped() {
        let descriptors = vec![
            FieldDescriptor {
                name: String::new(),
                label: "Ghost".to_string(),
                ..Default::default()
            },
            FieldDescriptor {
                name: "real".to_string(),
                ..Default::default()
            },
        ];
        let (schema, _) = to_schema(&descriptors, "T");
        assert_eq!(schema.properties.len(), 1);
        assert!(schema.properties.contains_key("real"));
    }

    #[test]
    fn text_descriptor_carries_widget_hints() {
        let descriptors = vec![FieldDescriptor {
            name: "notes".to_string(),
            label: "Notes".to_string(),
            field_type: DescriptorType::Text,
            placeholder: "Anything else?".to_string(),
            ..Default::default()
        }];
        let (_, hints) = to_schema(&descriptors, "T");
        let hint = &hints["notes"];
        assert_eq!(hint.widget.as_deref(), Some("textarea"));
        assert_eq!(hint.textarea_rows(), 3);
        assert_eq!(hint.placeholder.as_deref(), Some("Anything else?"));
    }

    #[test]
    fn lossless_descriptor_types_round_trip() {
        let descriptors = vec![
            FieldDescriptor {
                name: "full_name".to_string(),
                label: "Full Name".to_string(),
                required: true,
                ..Default::default()
            },
            FieldDescriptor {
                name: "age".to_string(),
                label: "Age".to_string(),
                field_type: DescriptorType::Integer,
                min: Some(0.0),
                max: Some(120.0),
                ..Default::default()
            },
            FieldDescriptor {
                name: "email".to_string(),
                label: "Email".to_string(),
                field_type: DescriptorType::Email,
                required: true,
                ..Default::default()
            },
            FieldDescriptor {
                name: "joined".to_string(),
                label: "Joined".to_string(),
                field_type: DescriptorType::Date,
                ..Default::default()
            },
            FieldDescriptor {
                name: "shift".to_string(),
                label: "Shift".to_string(),
                field_type: DescriptorType::Select,
                options: vec!["Day".to_string(), "Night".to_string()],
                ..Default::default()
            },
            FieldDescriptor {
                name: "active".to_string(),
                label: "Active".to_string(),
                field_type: DescriptorType::Boolean,
                ..Default::default()
            },
        ];
        let (schema, hints) = to_schema(&descriptors, "Roster");
        let reconstructed = from_schema(&schema, &hints);
        assert_eq!(reconstructed, descriptors);
        assert_eq!(
            schema.required,
            vec!["full_name".to_string(), "email".to_string()]
        );
    }

    #[test]
    fn unsupported_schema_shapes_classify_as_string() {
        let schema = FormSchema::from_value(&json!({
            "type": "object",
            "properties": {
                "weird": { "type": "array" },
                "constrained": { "type": "string", "pattern": "^x", "minLength": 2 }
            }
        }));
        let descriptors = from_schema(&schema, &UiHintMap::new());
        assert_eq!(descriptors[0].field_type, DescriptorType::String);
        // pattern and minLength are not modeled; a round-trip drops them
        let (round_tripped, _) = to_schema(&descriptors, "T");
        assert_eq!(round_tripped.properties["constrained"].pattern, None);
        assert_eq!(round_tripped.properties["constrained"].min_length, None);
    }
}
