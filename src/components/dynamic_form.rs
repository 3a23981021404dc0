//! Schema-driven form
//!
//! Renders a `RenderPlan` as sectioned rows on a 24-column grid, holds the
//! live value map, and validates on submit. Values are pruned before
//! validation so an emptied optional field submits as absent rather than
//! as an empty string.

use std::collections::HashMap;

use leptos::prelude::*;
use leptos::web_sys;
use serde_json::Value;

use crate::components::form_field::FormField;
use crate::schema::interpreter::{self, RenderPlan};
use crate::schema::{FormSchema, UiHintMap};

/// Interactive form for one published schema.
///
/// `on_submit` receives the pruned, validated value map in schema property
/// order. Bumping `reset_epoch` discards edits and restores the schema
/// defaults; the parent bumps it after a successful submission.
#[component]
pub fn DynamicForm(
    schema: FormSchema,
    hints: UiHintMap,
    on_submit: Callback<Value>,
    #[prop(into, optional)] submitting: Signal<bool>,
    #[prop(into, optional)] reset_epoch: Option<RwSignal<u32>>,
) -> impl IntoView {
    let values = RwSignal::new(interpreter::initial_values(&schema));
    let errors = RwSignal::new(HashMap::<String, String>::new());

    if let Some(epoch) = reset_epoch {
        let defaults_schema = schema.clone();
        Effect::new(move |prev: Option<u32>| {
            let current = epoch.get();
            if prev.is_some_and(|p| p != current) {
                values.set(interpreter::initial_values(&defaults_schema));
                errors.set(HashMap::new());
            }
            current
        });
    }

    let plan = interpreter::plan(&schema, &hints);
    let submit_schema = schema.clone();

    let handle_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let pruned = interpreter::prune_empty(&values.get_untracked());
        let found = interpreter::validate(&submit_schema, &pruned);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        errors.set(HashMap::new());

        // serde_json preserves insertion order, so walking the schema's
        // properties keeps the submitted document in declared field order.
        let mut ordered = serde_json::Map::new();
        for name in submit_schema.properties.keys() {
            if let Some(value) = pruned.get(name) {
                ordered.insert(name.clone(), value.clone());
            }
        }
        on_submit.run(Value::Object(ordered));
    };

    view! {
        <form class="space-y-6" on:submit=handle_submit novalidate=true>
            {render_sections(plan, values, errors)}
            <div class="pt-2">
                <button
                    type="submit"
                    class="px-4 py-2 bg-blue-600 text-white text-sm font-medium rounded-md hover:bg-blue-700 disabled:opacity-50"
                    disabled=move || submitting.get()
                >
                    {move || if submitting.get() { "Submitting..." } else { "Submit" }}
                </button>
            </div>
        </form>
    }
}

fn render_sections(
    plan: RenderPlan,
    values: RwSignal<HashMap<String, Value>>,
    errors: RwSignal<HashMap<String, String>>,
) -> impl IntoView {
    plan.sections
        .into_iter()
        .map(|section| {
            let heading = section.name.map(|title| {
                view! {
                    <h3 class="text-sm font-semibold text-gray-900 uppercase tracking-wide border-b border-gray-200 pb-2">
                        {title}
                    </h3>
                }
            });

            let fields = section
                .fields
                .into_iter()
                .map(|field| {
                    let span = field.col_span();
                    let style = format!("grid-column: span {span} / span {span}");
                    let name = field.name.clone();
                    let err_name = field.name.clone();
                    let label = field.label().to_string();
                    let required = field.required;
                    let tooltip = field.hint.tooltip.clone();
                    let help = field.hint.help.clone();

                    view! {
                        <div style=style class="space-y-1">
                            <label class="block text-sm font-medium text-gray-700">
                                {label}
                                {required
                                    .then(|| view! { <span class="text-red-500 ml-0.5">"*"</span> })}
                                {tooltip
                                    .map(|text| {
                                        view! {
                                            <span
                                                class="ml-1 text-gray-400 cursor-help"
                                                title=text
                                            >
                                                "\u{24D8}"
                                            </span>
                                        }
                                    })}
                            </label>
                            <FormField
                                name=name
                                schema=field.schema
                                hint=field.hint
                                values=values
                            />
                            {help
                                .map(|text| {
                                    view! { <p class="text-xs text-gray-500">{text}</p> }
                                })}
                            {move || {
                                errors
                                    .get()
                                    .get(&err_name)
                                    .cloned()
                                    .map(|msg| {
                                        view! { <p class="text-xs text-red-600">{msg}</p> }
                                    })
                            }}
                        </div>
                    }
                })
                .collect_view();

            view! {
                <div class="space-y-3">
                    {heading}
                    <div
                        class="gap-4"
                        style="display: grid; grid-template-columns: repeat(24, minmax(0, 1fr))"
                    >
                        {fields}
                    </div>
                </div>
            }
        })
        .collect_view()
}
