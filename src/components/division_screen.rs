//! Division screen page
//!
//! Resolves the `:division/:screen` route segments against the caller's
//! access grants (either segment may be an id or the human short code),
//! loads the active form definition plus recent submissions, and hosts the
//! dynamic form. A successful submit resets the form to its schema defaults
//! and reloads the submissions table.

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use serde_json::Value;

use crate::api;
use crate::components::dynamic_form::DynamicForm;
use crate::components::recent_submissions::RecentSubmissions;
use crate::schema::{parse_ui_hints, FormSchema, UiHintMap};
use crate::types::{Division, Screen, Submission};

#[derive(Clone)]
struct LoadedScreen {
    division: Division,
    screen: Screen,
    version: u32,
    schema: FormSchema,
    hints: UiHintMap,
}

fn division_matches(division: &Division, segment: &str) -> bool {
    division.id == segment
        || division.code.eq_ignore_ascii_case(segment)
        || division.name.eq_ignore_ascii_case(segment)
}

fn screen_matches(screen: &Screen, segment: &str) -> bool {
    screen.id == segment
        || screen.key.eq_ignore_ascii_case(segment)
        || screen.title.eq_ignore_ascii_case(segment)
}

async fn resolve_grant(
    division_segment: &str,
    screen_segment: &str,
) -> Result<(Division, Screen), String> {
    let grants = api::my_access().await?;
    let grant = grants
        .into_iter()
        .find(|g| division_matches(&g.division, division_segment))
        .ok_or_else(|| "You do not have access to this division".to_string())?;
    let screen = grant
        .screens
        .into_iter()
        .find(|s| screen_matches(s, screen_segment))
        .ok_or_else(|| "Screen not found in this division".to_string())?;
    Ok((grant.division, screen))
}

async fn load_screen(
    division_segment: String,
    screen_segment: String,
) -> Result<Option<LoadedScreen>, String> {
    let (division, screen) = resolve_grant(&division_segment, &screen_segment).await?;
    let Some(definition) = api::get_screen_definition(&division.id, &screen.id).await? else {
        return Ok(None);
    };
    // Wire path is fail-soft: a malformed stored schema degrades field by
    // field instead of blanking the page.
    let schema = FormSchema::from_value(&definition.schema);
    let hints = parse_ui_hints(&definition.ui_schema);
    Ok(Some(LoadedScreen {
        division,
        screen,
        version: definition.version,
        schema,
        hints,
    }))
}

#[component]
pub fn DivisionScreen() -> impl IntoView {
    let params = use_params_map();
    let division_param = move || params.read().get("division").unwrap_or_default();
    let screen_param = move || params.read().get("screen").unwrap_or_default();

    let (loaded, set_loaded) = signal(Option::<LoadedScreen>::None);
    let (missing, set_missing) = signal(false);
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);
    let (submissions, set_submissions) = signal(Vec::<Submission>::new());
    let (submitting, set_submitting) = signal(false);
    let (submitted_notice, set_submitted_notice) = signal(false);
    let reset_epoch = RwSignal::new(0u32);

    Effect::new(move |_| {
        let division = division_param();
        let screen = screen_param();
        set_loading.set(true);
        set_error.set(None);
        set_missing.set(false);
        set_loaded.set(None);
        wasm_bindgen_futures::spawn_local(async move {
            match load_screen(division, screen).await {
                Ok(Some(screen)) => {
                    match api::list_submissions(&screen.division.id, &screen.screen.id).await {
                        Ok(rows) => set_submissions.set(rows),
                        Err(e) => log::warn!("failed to load submissions: {e}"),
                    }
                    set_loaded.set(Some(screen));
                }
                Ok(None) => set_missing.set(true),
                Err(e) => set_error.set(Some(e)),
            }
            set_loading.set(false);
        });
    });

    let handle_submit = Callback::new(move |values: Value| {
        let Some(screen) = loaded.get_untracked() else {
            return;
        };
        set_submitting.set(true);
        set_submitted_notice.set(false);
        wasm_bindgen_futures::spawn_local(async move {
            let division_id = screen.division.id.clone();
            let screen_id = screen.screen.id.clone();
            match api::submit_values(&division_id, &screen_id, &values).await {
                Ok(()) => {
                    set_submitted_notice.set(true);
                    reset_epoch.update(|n| *n += 1);
                    match api::list_submissions(&division_id, &screen_id).await {
                        Ok(rows) => set_submissions.set(rows),
                        Err(e) => log::warn!("failed to reload submissions: {e}"),
                    }
                }
                Err(e) => set_error.set(Some(e)),
            }
            set_submitting.set(false);
        });
    });

    view! {
        <div class="max-w-4xl mx-auto px-4 py-8 space-y-8">
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
                submitted_notice
                    .get()
                    .then(|| {
                        view! {
                            <div class="bg-green-50 border border-green-200 text-green-700 text-sm rounded-md px-4 py-3">
                                "Submission saved."
                            </div>
                        }
                    })
            }}
            {move || {
                if loading.get() {
                    return view! { <p class="text-gray-500">"Loading..."</p> }.into_any();
                }
                if missing.get() {
                    return view! {
                        <div class="text-center py-16">
                            <p class="text-gray-600 font-medium">"No form published yet"</p>
                            <p class="text-sm text-gray-400 mt-1">
                                "An administrator needs to publish a form for this screen."
                            </p>
                        </div>
                    }
                    .into_any();
                }
                match loaded.get() {
                    Some(screen) => {
                        let title = screen.schema.display_title(&screen.screen.title).to_string();
                        let subtitle = format!(
                            "{} / {} (v{})",
                            screen.division.name, screen.screen.title, screen.version,
                        );
                        let table_schema = screen.schema.clone();
                        view! {
                            <div class="space-y-6">
                                <div>
                                    <h1 class="text-2xl font-bold text-gray-900">{title}</h1>
                                    <p class="text-sm text-gray-500">{subtitle}</p>
                                </div>
                                <div class="bg-white border border-gray-200 rounded-lg p-6">
                                    <DynamicForm
                                        schema=screen.schema
                                        hints=screen.hints
                                        on_submit=handle_submit
                                        submitting=submitting
                                        reset_epoch=reset_epoch
                                    />
                                </div>
                                <div class="space-y-2">
                                    <h2 class="text-lg font-semibold text-gray-900">
                                        "Recent Submissions"
                                    </h2>
                                    <RecentSubmissions
                                        schema=table_schema
                                        submissions=submissions.get()
                                    />
                                </div>
                            </div>
                        }
                        .into_any()
                    }
                    None => view! { <span></span> }.into_any(),
                }
            }}
        </div>
    }
}
