//! Recent submissions list
//!
//! Read-only cards for the latest submissions of a screen, newest first as
//! delivered by the backend. Each card summarizes the first few fields in
//! schema property order; expanding it shows every stored field. Values
//! outside the current schema keep their raw keys in the detail view.

use leptos::prelude::*;
use serde_json::Value;
use wasm_bindgen::JsValue;

use crate::schema::FormSchema;
use crate::types::Submission;

const SHOWN: usize = 10;
const SUMMARY_FIELDS: usize = 6;

#[component]
pub fn RecentSubmissions(schema: FormSchema, submissions: Vec<Submission>) -> impl IntoView {
    if submissions.is_empty() {
        return view! {
            <p class="text-sm text-gray-500 italic">"No submissions yet."</p>
        }
        .into_any();
    }

    let labels: Vec<(String, String)> = schema
        .properties
        .iter()
        .map(|(name, field)| {
            let label = field.title.clone().unwrap_or_else(|| name.clone());
            (name.clone(), label)
        })
        .collect();
    let labels = StoredValue::new(labels);

    view! {
        <div class="space-y-3">
            {submissions
                .into_iter()
                .take(SHOWN)
                .map(|submission| view! { <SubmissionCard submission=submission labels=labels /> })
                .collect_view()}
        </div>
    }
    .into_any()
}

#[component]
fn SubmissionCard(
    submission: Submission,
    labels: StoredValue<Vec<(String, String)>>,
) -> impl IntoView {
    let (expanded, set_expanded) = signal(false);

    let label_for = move |name: &str| {
        labels.with_value(|labels| {
            labels
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, l)| l.clone())
                .unwrap_or_else(|| name.to_string())
        })
    };

    // Summary keeps schema order; fields the schema no longer declares only
    // appear in the expanded view.
    let summary: Vec<(String, String)> = labels.with_value(|labels| {
        labels
            .iter()
            .filter_map(|(name, label)| {
                submission
                    .data
                    .get(name)
                    .map(|v| (label.clone(), display_value(v)))
            })
            .take(SUMMARY_FIELDS)
            .collect()
    });

    let all: Vec<(String, String)> = submission
        .data
        .iter()
        .map(|(name, value)| (label_for(name), display_value(value)))
        .collect();
    let has_more = all.len() > summary.len();

    let version = format!("v{}", submission.form_version);
    let when = format_timestamp(&submission.created_at);
    let by = submission.submitted_by.clone();

    view! {
        <div class="bg-white border border-gray-200 rounded-lg p-4">
            <div class="flex items-center justify-between mb-2">
                <div class="flex items-center gap-2 text-xs text-gray-400">
                    <span class="px-1.5 py-0.5 bg-gray-100 rounded font-mono">{version}</span>
                    <span>{when}</span>
                    {by.map(|name| view! { <span>{format!("by {name}")}</span> })}
                </div>
                {(has_more || expanded.get_untracked())
                    .then(|| {
                        view! {
                            <button
                                type="button"
                                class="text-xs text-blue-600 hover:text-blue-800"
                                on:click=move |_| set_expanded.update(|e| *e = !*e)
                            >
                                {move || if expanded.get() { "Show less" } else { "Show all" }}
                            </button>
                        }
                    })}
            </div>
            <dl class="grid grid-cols-2 md:grid-cols-3 gap-x-4 gap-y-2">
                {move || {
                    let rows = if expanded.get() { all.clone() } else { summary.clone() };
                    rows.into_iter()
                        .map(|(label, value)| {
                            view! {
                                <div>
                                    <dt class="text-xs text-gray-400">{label}</dt>
                                    <dd class="text-sm text-gray-800 break-words">{value}</dd>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </dl>
        </div>
    }
}

/// Browser-locale rendering of the stored ISO timestamp; an unparsable
/// value falls back to the raw string.
fn format_timestamp(iso: &str) -> String {
    let date = js_sys::Date::new(&JsValue::from_str(iso));
    if date.get_time().is_nan() {
        return iso.to_string();
    }
    String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
