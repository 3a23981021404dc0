//! Scalar field renderers
//!
//! One widget per field, picked from the field's type, format, enum, and
//! `ui:widget` hint. Every change handler routes the raw control value
//! through `interpreter::coerce_on_change`; a `None` result removes the
//! entry from the value map (absent), it never stores an empty or zero.

use std::collections::HashMap;

use leptos::prelude::*;
use leptos::web_sys;
use serde_json::Value;
use wasm_bindgen::JsCast;

use crate::schema::interpreter::coerce_on_change;
use crate::schema::{FieldSchema, UiHint, Widget};

const INPUT_CLASS: &str = "w-full px-3 py-2 text-sm border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-blue-500";

/// Renders the widget for one field and keeps `values` in sync.
#[component]
pub fn FormField(
    name: String,
    schema: FieldSchema,
    hint: UiHint,
    values: RwSignal<HashMap<String, Value>>,
) -> impl IntoView {
    let placeholder = hint
        .placeholder
        .clone()
        .or_else(|| schema.description.clone())
        .unwrap_or_default();

    if schema.field_type.is_numeric() {
        return view! {
            <NumberInput name=name schema=schema placeholder=placeholder values=values />
        }
        .into_any();
    }

    match schema.field_type {
        crate::schema::FieldType::Boolean => view! {
            <BooleanToggle name=name schema=schema values=values />
        }
        .into_any(),
        _ if schema.has_enum() => view! {
            <EnumSelect name=name schema=schema placeholder=placeholder values=values />
        }
        .into_any(),
        _ if schema.is_date() => view! {
            <DateInput name=name schema=schema values=values />
        }
        .into_any(),
        _ if hint.widget_kind() == Some(Widget::Textarea) => view! {
            <TextareaInput
                name=name
                schema=schema
                rows=hint.textarea_rows()
                placeholder=placeholder
                values=values
            />
        }
        .into_any(),
        _ => {
            let input_type = if schema.is_email() {
                "email"
            } else if hint.widget_kind() == Some(Widget::Password) {
                "password"
            } else {
                "text"
            };
            view! {
                <StringInput
                    name=name
                    schema=schema
                    input_type=input_type.to_string()
                    placeholder=placeholder
                    values=values
                />
            }
            .into_any()
        }
    }
}

fn apply(
    values: RwSignal<HashMap<String, Value>>,
    name: &str,
    schema: &FieldSchema,
    raw: Value,
) {
    let coerced = coerce_on_change(schema, &raw);
    let name = name.to_string();
    values.update(|v| match coerced {
        Some(value) => {
            v.insert(name, value);
        }
        None => {
            v.remove(&name);
        }
    });
}

#[component]
fn StringInput(
    name: String,
    schema: FieldSchema,
    input_type: String,
    placeholder: String,
    values: RwSignal<HashMap<String, Value>>,
) -> impl IntoView {
    let display_name = name.clone();
    let maxlength = schema.max_length.map(|n| n.to_string());

    let on_input = move |ev: web_sys::Event| {
        let target = ev.target().unwrap();
        let input: web_sys::HtmlInputElement = target.dyn_into().unwrap();
        apply(values, &name, &schema, Value::String(input.value()));
    };

    view! {
        <input
            type=input_type
            class=INPUT_CLASS
            placeholder=placeholder
            maxlength=maxlength
            prop:value=move || {
                values
                    .get()
                    .get(&display_name)
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .unwrap_or_default()
            }
            on:input=on_input
        />
    }
}

#[component]
fn TextareaInput(
    name: String,
    schema: FieldSchema,
    rows: u32,
    placeholder: String,
    values: RwSignal<HashMap<String, Value>>,
) -> impl IntoView {
    let display_name = name.clone();

    let on_input = move |ev: web_sys::Event| {
        let target = ev.target().unwrap();
        let area: web_sys::HtmlTextAreaElement = target.dyn_into().unwrap();
        apply(values, &name, &schema, Value::String(area.value()));
    };

    view! {
        <textarea
            class=INPUT_CLASS
            rows=rows.to_string()
            placeholder=placeholder
            prop:value=move || {
                values
                    .get()
                    .get(&display_name)
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .unwrap_or_default()
            }
            on:input=on_input
        ></textarea>
    }
}

#[component]
fn NumberInput(
    name: String,
    schema: FieldSchema,
    placeholder: String,
    values: RwSignal<HashMap<String, Value>>,
) -> impl IntoView {
    let display_name = name.clone();
    let step = if schema.field_type == crate::schema::FieldType::Integer {
        "1"
    } else {
        "any"
    };
    let min_attr = schema.minimum.map(|v| v.to_string());
    let max_attr = schema.maximum.map(|v| v.to_string());

    let on_input = move |ev: web_sys::Event| {
        let target = ev.target().unwrap();
        let input: web_sys::HtmlInputElement = target.dyn_into().unwrap();
        apply(values, &name, &schema, Value::String(input.value()));
    };

    view! {
        <input
            type="number"
            step=step
            min=min_attr
            max=max_attr
            class=INPUT_CLASS
            placeholder=placeholder
            prop:value=move || {
                values
                    .get()
                    .get(&display_name)
                    .and_then(|v| v.as_f64())
                    .map(|n| n.to_string())
                    .unwrap_or_default()
            }
            on:input=on_input
        />
    }
}

#[component]
fn DateInput(
    name: String,
    schema: FieldSchema,
    values: RwSignal<HashMap<String, Value>>,
) -> impl IntoView {
    let display_name = name.clone();

    let on_input = move |ev: web_sys::Event| {
        let target = ev.target().unwrap();
        let input: web_sys::HtmlInputElement = target.dyn_into().unwrap();
        apply(values, &name, &schema, Value::String(input.value()));
    };

    view! {
        <input
            type="date"
            class=INPUT_CLASS
            prop:value=move || {
                values
                    .get()
                    .get(&display_name)
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .unwrap_or_default()
            }
            on:input=on_input
        />
    }
}

#[component]
fn BooleanToggle(
    name: String,
    schema: FieldSchema,
    values: RwSignal<HashMap<String, Value>>,
) -> impl IntoView {
    let display_name = name.clone();

    let on_change = move |ev: web_sys::Event| {
        let target = ev.target().unwrap();
        let input: web_sys::HtmlInputElement = target.dyn_into().unwrap();
        apply(values, &name, &schema, Value::Bool(input.checked()));
    };

    view! {
        <label class="inline-flex items-center gap-2 text-sm text-gray-700">
            <input
                type="checkbox"
                class="h-4 w-4 rounded border-gray-300"
                prop:checked=move || {
                    values
                        .get()
                        .get(&display_name)
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false)
                }
                on:change=on_change
            />
            "Yes"
        </label>
    }
}

#[component]
fn EnumSelect(
    name: String,
    schema: FieldSchema,
    placeholder: String,
    values: RwSignal<HashMap<String, Value>>,
) -> impl IntoView {
    let display_name = name.clone();
    let options = schema.enum_strings();
    let empty_label = if placeholder.is_empty() {
        "-- Select --".to_string()
    } else {
        placeholder
    };

    let on_change = move |ev: web_sys::Event| {
        let target = ev.target().unwrap();
        let select: web_sys::HtmlSelectElement = target.dyn_into().unwrap();
        apply(values, &name, &schema, Value::String(select.value()));
    };

    view! {
        <select
            class=INPUT_CLASS
            prop:value=move || {
                values
                    .get()
                    .get(&display_name)
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .unwrap_or_default()
            }
            on:change=on_change
        >
            <option value="">{empty_label}</option>
            {options
                .into_iter()
                .map(|opt| {
                    let value = opt.clone();
                    view! { <option value=value>{opt}</option> }
                })
                .collect_view()}
        </select>
    }
}
