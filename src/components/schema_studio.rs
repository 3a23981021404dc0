//! Schema Studio
//!
//! Admin surface for authoring form definitions. Two editing modes over the
//! same definition: the visual builder (an ordered descriptor list with a
//! quick-add palette) and the advanced mode (raw schema/uiSchema JSON).
//! Switching builder to advanced serializes the list; switching back parses
//! strictly and refuses to leave advanced mode while the JSON is invalid.
//! The preview pane renders the live definition with the same form component
//! the data-entry page uses.

use leptos::prelude::*;
use serde_json::Value;

use crate::api;
use crate::components::dynamic_form::DynamicForm;
use crate::schema::builder::{
    from_schema, slugify, to_schema, DescriptorType, FieldDescriptor, FieldList,
};
use crate::schema::{parse_definition, parse_ui_hints, FormSchema};
use crate::session;
use crate::types::{Division, SaveDefinitionRequest, Screen};

const FIELD_CLASS: &str = "w-full px-2 py-1.5 text-sm border border-gray-300 rounded focus:outline-none focus:ring-1 focus:ring-blue-500";

/// Clone-mutate-writeback for one descriptor row. A key collision resolved
/// by the list surfaces as a notice.
fn edit_row(
    fields: RwSignal<FieldList>,
    notice: WriteSignal<Option<String>>,
    index: usize,
    mutate: impl FnOnce(&mut FieldDescriptor),
) {
    let Some(mut descriptor) = fields.get_untracked().fields().get(index).cloned() else {
        return;
    };
    mutate(&mut descriptor);
    let mut adjusted = None;
    fields.update(|list| {
        adjusted = list.update(index, descriptor);
    });
    if let Some(key) = adjusted {
        notice.set(Some(format!(
            "Field key was already taken, renamed to \"{key}\""
        )));
    }
}

#[component]
pub fn SchemaStudio() -> impl IntoView {
    let is_superadmin = session::current_user().is_some_and(|u| u.is_superadmin());
    if !is_superadmin {
        return view! {
            <div class="max-w-2xl mx-auto px-4 py-16 text-center">
                <p class="text-gray-600 font-medium">"Schema Studio is restricted"</p>
                <p class="text-sm text-gray-400 mt-1">
                    "Only superadmin accounts can author form definitions."
                </p>
            </div>
        }
        .into_any();
    }

    let (divisions, set_divisions) = signal(Vec::<Division>::new());
    let (screens, set_screens) = signal(Vec::<Screen>::new());
    let (selected_division, set_selected_division) = signal(String::new());
    let (selected_screen, set_selected_screen) = signal(String::new());

    let (form_title, set_form_title) = signal(String::new());
    let fields = RwSignal::new(FieldList::new());
    let (notice, set_notice) = signal(Option::<String>::None);

    let (advanced, set_advanced) = signal(false);
    let (schema_text, set_schema_text) = signal(String::from("{}"));
    let (ui_text, set_ui_text) = signal(String::from("{}"));

    let (error, set_error) = signal(Option::<String>::None);
    let (saved_version, set_saved_version) = signal(Option::<u32>::None);
    let (active_version, set_active_version) = signal(Option::<u32>::None);
    let (busy, set_busy) = signal(false);

    Effect::new(move |_| {
        wasm_bindgen_futures::spawn_local(async move {
            match api::list_divisions().await {
                Ok(list) => set_divisions.set(list),
                Err(e) => set_error.set(Some(e)),
            }
            match api::list_screens().await {
                Ok(list) => set_screens.set(list),
                Err(e) => set_error.set(Some(e)),
            }
        });
    });

    // Live definition feeding both the preview and the save path.
    let definition = Memo::new(move |_| {
        if advanced.get() {
            parse_definition(&schema_text.get(), &ui_text.get()).map_err(|e| e.to_string())
        } else {
            Ok(to_schema(fields.get().fields(), &form_title.get()))
        }
    });

    let load_active = move |_| {
        let division = selected_division.get_untracked();
        let screen = selected_screen.get_untracked();
        if division.is_empty() || screen.is_empty() {
            set_error.set(Some("Pick a division and a screen first".to_string()));
            return;
        }
        set_busy.set(true);
        set_error.set(None);
        set_saved_version.set(None);
        wasm_bindgen_futures::spawn_local(async move {
            match api::get_active_definition(&division, &screen).await {
                Ok(Some(active)) => {
                    let schema = FormSchema::from_value(&active.schema);
                    let hints = parse_ui_hints(&active.ui_schema);
                    set_form_title.set(schema.title.clone().unwrap_or_default());
                    fields.set(FieldList::from_fields(from_schema(&schema, &hints)));
                    set_schema_text
                        .set(serde_json::to_string_pretty(&active.schema).unwrap_or_default());
                    set_ui_text
                        .set(serde_json::to_string_pretty(&active.ui_schema).unwrap_or_default());
                    set_active_version.set(Some(active.version));
                    set_notice.set(None);
                }
                Ok(None) => {
                    set_active_version.set(None);
                    set_notice.set(Some("No active definition for this screen yet".to_string()));
                }
                Err(e) => set_error.set(Some(e)),
            }
            set_busy.set(false);
        });
    };

    let toggle_mode = move |_| {
        if advanced.get_untracked() {
            match parse_definition(&schema_text.get_untracked(), &ui_text.get_untracked()) {
                Ok((schema, hints)) => {
                    set_form_title.set(schema.title.clone().unwrap_or_default());
                    fields.set(FieldList::from_fields(from_schema(&schema, &hints)));
                    set_error.set(None);
                    set_advanced.set(false);
                }
                Err(e) => set_error.set(Some(format!("Fix the JSON before leaving: {e}"))),
            }
        } else {
            let (schema, hints) =
                to_schema(fields.get_untracked().fields(), &form_title.get_untracked());
            set_schema_text.set(serde_json::to_string_pretty(&schema).unwrap_or_default());
            set_ui_text.set(serde_json::to_string_pretty(&hints).unwrap_or_default());
            set_advanced.set(true);
        }
    };

    let save = move |_| {
        let division = selected_division.get_untracked();
        let screen = selected_screen.get_untracked();
        if division.is_empty() || screen.is_empty() {
            set_error.set(Some("Pick a division and a screen first".to_string()));
            return;
        }
        let (schema, hints) = match definition.get_untracked() {
            Ok(pair) => pair,
            Err(e) => {
                set_error.set(Some(e));
                return;
            }
        };
        let request = SaveDefinitionRequest {
            division_id: division,
            screen_id: screen,
            schema: serde_json::to_value(&schema).unwrap_or(Value::Null),
            ui_schema: serde_json::to_value(&hints).unwrap_or(Value::Null),
        };
        set_busy.set(true);
        set_error.set(None);
        wasm_bindgen_futures::spawn_local(async move {
            match api::save_definition(&request).await {
                Ok(saved) => {
                    set_saved_version.set(Some(saved.version));
                    set_active_version.set(Some(saved.version));
                }
                Err(e) => set_error.set(Some(e)),
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="max-w-7xl mx-auto px-4 py-8 space-y-6">
            <div class="flex items-end justify-between flex-wrap gap-4">
                <div>
                    <h1 class="text-2xl font-bold text-gray-900">"Schema Studio"</h1>
                    <p class="text-sm text-gray-500">
                        "Author the form for a division screen and publish it as a new version."
                    </p>
                </div>
                {move || {
                    active_version
                        .get()
                        .map(|v| {
                            view! {
                                <span class="text-xs text-gray-400">{format!("active: v{v}")}</span>
                            }
                        })
                }}
            </div>

            <div class="bg-white border border-gray-200 rounded-lg p-4 flex flex-wrap items-end gap-3">
                <div>
                    <label class="block text-xs font-medium text-gray-500 mb-1">"Division"</label>
                    <select
                        class=FIELD_CLASS
                        on:change=move |ev| set_selected_division.set(event_target_value(&ev))
                    >
                        <option value="">"-- Select --"</option>
                        {move || {
                            divisions
                                .get()
                                .into_iter()
                                .map(|d| {
                                    let label = format!("{} ({})", d.name, d.code);
                                    view! { <option value=d.id>{label}</option> }
                                })
                                .collect_view()
                        }}
                    </select>
                </div>
                <div>
                    <label class="block text-xs font-medium text-gray-500 mb-1">"Screen"</label>
                    <select
                        class=FIELD_CLASS
                        on:change=move |ev| set_selected_screen.set(event_target_value(&ev))
                    >
                        <option value="">"-- Select --"</option>
                        {move || {
                            screens
                                .get()
                                .into_iter()
                                .map(|s| view! { <option value=s.id>{s.title}</option> })
                                .collect_view()
                        }}
                    </select>
                </div>
                <button
                    type="button"
                    class="px-3 py-1.5 border border-gray-300 text-sm text-gray-700 rounded hover:bg-gray-50 disabled:opacity-50"
                    disabled=move || busy.get()
                    on:click=load_active
                >
                    "Load Active"
                </button>
                <button
                    type="button"
                    class="px-3 py-1.5 border border-gray-300 text-sm text-gray-700 rounded hover:bg-gray-50"
                    on:click=toggle_mode
                >
                    {move || if advanced.get() { "Visual Builder" } else { "Advanced JSON" }}
                </button>
                <button
                    type="button"
                    class="px-4 py-1.5 bg-blue-600 text-white text-sm font-medium rounded hover:bg-blue-700 disabled:opacity-50"
                    disabled=move || busy.get()
                    on:click=save
                >
                    "Save New Version"
                </button>
            </div>

            {move || {
                error
                    .get()
                    .map(|msg| {
                        view! {
                            <div class="bg-red-50 border border-red-200 text-red-700 text-sm rounded-md px-4 py-3">
                                {msg}
                            </div>
                        }
                    })
            }}
            {move || {
                saved_version
                    .get()
                    .map(|v| {
                        view! {
                            <div class="bg-green-50 border border-green-200 text-green-700 text-sm rounded-md px-4 py-3">
                                {format!("Published version {v}")}
                            </div>
                        }
                    })
            }}
            {move || {
                notice
                    .get()
                    .map(|msg| {
                        view! {
                            <div class="bg-yellow-50 border border-yellow-200 text-yellow-800 text-sm rounded-md px-4 py-3">
                                {msg}
                            </div>
                        }
                    })
            }}

            <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                <div class="space-y-4">
                    {move || {
                        if advanced.get() {
                            view! {
                                <AdvancedEditors
                                    schema_text=schema_text
                                    ui_text=ui_text
                                    set_schema_text=set_schema_text
                                    set_ui_text=set_ui_text
                                />
                            }
                                .into_any()
                        } else {
                            view! {
                                <BuilderPanel
                                    form_title=form_title
                                    set_form_title=set_form_title
                                    fields=fields
                                    set_notice=set_notice
                                />
                            }
                                .into_any()
                        }
                    }}
                </div>
                <div class="space-y-2">
                    <h2 class="text-lg font-semibold text-gray-900">"Preview"</h2>
                    <div class="bg-white border border-gray-200 rounded-lg p-6">
                        {move || match definition.get() {
                            Ok((schema, _)) if schema.properties.is_empty() => {
                                view! {
                                    <p class="text-sm text-gray-500 italic">
                                        "Add fields to see the form."
                                    </p>
                                }
                                    .into_any()
                            }
                            Ok((schema, hints)) => {
                                view! {
                                    <DynamicForm
                                        schema=schema
                                        hints=hints
                                        on_submit=Callback::new(|_: Value| {})
                                    />
                                }
                                    .into_any()
                            }
                            Err(e) => {
                                view! { <p class="text-sm text-red-600">{e}</p> }.into_any()
                            }
                        }}
                    </div>
                </div>
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn AdvancedEditors(
    schema_text: ReadSignal<String>,
    ui_text: ReadSignal<String>,
    set_schema_text: WriteSignal<String>,
    set_ui_text: WriteSignal<String>,
) -> impl IntoView {
    view! {
        <div class="space-y-4">
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Schema JSON"</label>
                <textarea
                    class="w-full px-3 py-2 text-xs font-mono border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-blue-500"
                    rows="16"
                    prop:value=move || schema_text.get()
                    on:input=move |ev| set_schema_text.set(event_target_value(&ev))
                ></textarea>
            </div>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"UI Schema JSON"</label>
                <textarea
                    class="w-full px-3 py-2 text-xs font-mono border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-blue-500"
                    rows="10"
                    prop:value=move || ui_text.get()
                    on:input=move |ev| set_ui_text.set(event_target_value(&ev))
                ></textarea>
            </div>
        </div>
    }
}

#[component]
fn BuilderPanel(
    form_title: ReadSignal<String>,
    set_form_title: WriteSignal<String>,
    fields: RwSignal<FieldList>,
    set_notice: WriteSignal<Option<String>>,
) -> impl IntoView {
    view! {
        <div class="space-y-4">
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Form title"</label>
                <input
                    type="text"
                    class=FIELD_CLASS
                    placeholder="New Form"
                    prop:value=move || form_title.get()
                    on:input=move |ev| set_form_title.set(event_target_value(&ev))
                />
            </div>

            <div class="flex flex-wrap gap-2">
                {DescriptorType::ALL
                    .into_iter()
                    .map(|field_type| {
                        view! {
                            <button
                                type="button"
                                class="px-2.5 py-1 text-xs border border-gray-300 text-gray-700 rounded-full hover:bg-gray-100"
                                on:click=move |_| fields.update(|list| list.add(field_type))
                            >
                                {format!("+ {}", field_type.label())}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>

            {move || {
                let list = fields.get();
                if list.is_empty() {
                    return view! {
                        <p class="text-sm text-gray-500 italic">
                            "No fields yet. Use the buttons above to add one."
                        </p>
                    }
                        .into_any();
                }
                let last = list.len() - 1;
                list.fields()
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(index, descriptor)| {
                        view! {
                            <FieldCard
                                index=index
                                last=last
                                descriptor=descriptor
                                fields=fields
                                set_notice=set_notice
                            />
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}

#[component]
fn FieldCard(
    index: usize,
    last: usize,
    descriptor: FieldDescriptor,
    fields: RwSignal<FieldList>,
    set_notice: WriteSignal<Option<String>>,
) -> impl IntoView {
    let type_tag = descriptor.field_type.as_str().to_string();
    let is_numeric = descriptor.field_type.is_numeric();
    let is_select = descriptor.field_type == DescriptorType::Select;
    let options_text = descriptor.options.join("\n");
    let min_text = descriptor.min.map(|v| v.to_string()).unwrap_or_default();
    let max_text = descriptor.max.map(|v| v.to_string()).unwrap_or_default();

    view! {
        <div class="bg-white border border-gray-200 rounded-lg p-4 space-y-3">
            <div class="flex items-center justify-between">
                <span class="text-xs font-mono text-gray-400">{descriptor.name.clone()}</span>
                <div class="flex gap-1">
                    <button
                        type="button"
                        class="px-2 py-0.5 text-xs border border-gray-200 rounded hover:bg-gray-50 disabled:opacity-30"
                        disabled=index == 0
                        on:click=move |_| fields.update(|list| list.move_up(index))
                    >
                        "\u{2191}"
                    </button>
                    <button
                        type="button"
                        class="px-2 py-0.5 text-xs border border-gray-200 rounded hover:bg-gray-50 disabled:opacity-30"
                        disabled=index == last
                        on:click=move |_| fields.update(|list| list.move_down(index))
                    >
                        "\u{2193}"
                    </button>
                    <button
                        type="button"
                        class="px-2 py-0.5 text-xs border border-red-200 text-red-600 rounded hover:bg-red-50"
                        on:click=move |_| fields.update(|list| list.remove(index))
                    >
                        "Remove"
                    </button>
                </div>
            </div>

            <div class="grid grid-cols-2 gap-3">
                <div>
                    <label class="block text-xs font-medium text-gray-500 mb-1">"Label"</label>
                    <input
                        type="text"
                        class=FIELD_CLASS
                        prop:value=descriptor.label.clone()
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            edit_row(fields, set_notice, index, |d| d.label = value);
                        }
                    />
                </div>
                <div>
                    <label class="block text-xs font-medium text-gray-500 mb-1">"Key"</label>
                    <input
                        type="text"
                        class=FIELD_CLASS
                        prop:value=descriptor.name.clone()
                        on:change=move |ev| {
                            let value = slugify(&event_target_value(&ev));
                            edit_row(fields, set_notice, index, |d| d.name = value);
                        }
                    />
                </div>
                <div>
                    <label class="block text-xs font-medium text-gray-500 mb-1">"Type"</label>
                    <select
                        class=FIELD_CLASS
                        prop:value=type_tag
                        on:change=move |ev| {
                            let value = DescriptorType::classify(&event_target_value(&ev));
                            edit_row(fields, set_notice, index, |d| d.field_type = value);
                        }
                    >
                        {DescriptorType::ALL
                            .into_iter()
                            .map(|t| {
                                view! { <option value=t.as_str()>{t.label()}</option> }
                            })
                            .collect_view()}
                    </select>
                </div>
                <div>
                    <label class="block text-xs font-medium text-gray-500 mb-1">
                        "Placeholder"
                    </label>
                    <input
                        type="text"
                        class=FIELD_CLASS
                        prop:value=descriptor.placeholder.clone()
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            edit_row(fields, set_notice, index, |d| d.placeholder = value);
                        }
                    />
                </div>
            </div>

            {is_numeric
                .then(|| {
                    let min_text = min_text.clone();
                    let max_text = max_text.clone();
                    view! {
                        <div class="grid grid-cols-2 gap-3">
                            <div>
                                <label class="block text-xs font-medium text-gray-500 mb-1">
                                    "Minimum"
                                </label>
                                <input
                                    type="number"
                                    class=FIELD_CLASS
                                    prop:value=min_text
                                    on:change=move |ev| {
                                        let value = event_target_value(&ev).parse::<f64>().ok();
                                        edit_row(fields, set_notice, index, |d| d.min = value);
                                    }
                                />
                            </div>
                            <div>
                                <label class="block text-xs font-medium text-gray-500 mb-1">
                                    "Maximum"
                                </label>
                                <input
                                    type="number"
                                    class=FIELD_CLASS
                                    prop:value=max_text
                                    on:change=move |ev| {
                                        let value = event_target_value(&ev).parse::<f64>().ok();
                                        edit_row(fields, set_notice, index, |d| d.max = value);
                                    }
                                />
                            </div>
                        </div>
                    }
                })}

            {is_select
                .then(|| {
                    let options_text = options_text.clone();
                    view! {
                        <div>
                            <label class="block text-xs font-medium text-gray-500 mb-1">
                                "Options (one per line)"
                            </label>
                            <textarea
                                class=FIELD_CLASS
                                rows="3"
                                prop:value=options_text
                                on:change=move |ev| {
                                    let value: Vec<String> = event_target_value(&ev)
                                        .lines()
                                        .map(|l| l.trim().to_string())
                                        .filter(|l| !l.is_empty())
                                        .collect();
                                    edit_row(fields, set_notice, index, |d| d.options = value);
                                }
                            ></textarea>
                        </div>
                    }
                })}

            <label class="inline-flex items-center gap-2 text-sm text-gray-700">
                <input
                    type="checkbox"
                    class="h-4 w-4 rounded border-gray-300"
                    prop:checked=descriptor.required
                    on:change=move |ev| {
                        let value = event_target_checked(&ev);
                        edit_row(fields, set_notice, index, |d| d.required = value);
                    }
                />
                "Required"
            </label>
        </div>
    }
}
