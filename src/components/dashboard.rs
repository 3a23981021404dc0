//! Dashboard
//!
//! Landing page after login: one card per division the user can access,
//! each listing its screens as links into the data-entry route.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::api;
use crate::session;

#[component]
pub fn Dashboard() -> impl IntoView {
    let grants = LocalResource::new(|| async move { api::my_access().await });
    let greeting = session::current_user()
        .map(|u| format!("Welcome back, {}", u.full_name))
        .unwrap_or_else(|| "Welcome".to_string());

    view! {
        <div class="max-w-5xl mx-auto px-4 py-8 space-y-6">
            <div>
                <h1 class="text-2xl font-bold text-gray-900">{greeting}</h1>
                <p class="text-sm text-gray-500">"Pick a screen to start entering data."</p>
            </div>
            <Suspense fallback=move || {
                view! { <p class="text-gray-500">"Loading your divisions..."</p> }
            }>
                {move || {
                    grants
                        .get()
                        .map(|result| match result {
                            Ok(grants) if grants.is_empty() => {
                                view! {
                                    <p class="text-sm text-gray-500 italic">
                                        "No divisions assigned to your account yet."
                                    </p>
                                }
                                .into_any()
                            }
                            Ok(grants) => {
                                view! {
                                    <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                                        {grants
                                            .into_iter()
                                            .map(|grant| {
                                                let code = grant.division.code.clone();
                                                let screens = grant
                                                    .screens
                                                    .into_iter()
                                                    .map(|screen| {
                                                        let href = format!(
                                                            "/division/{}/screen/{}",
                                                            code, screen.key,
                                                        );
                                                        view! {
                                                            <li>
                                                                <A
                                                                    href=href
                                                                    attr:class="text-sm text-blue-600 hover:text-blue-800 hover:underline"
                                                                >
                                                                    {screen.title}
                                                                </A>
                                                            </li>
                                                        }
                                                    })
                                                    .collect_view();
                                                view! {
                                                    <div class="bg-white border border-gray-200 rounded-lg p-5">
                                                        <h2 class="font-semibold text-gray-900">
                                                            {grant.division.name}
                                                        </h2>
                                                        <p class="text-xs text-gray-400 uppercase tracking-wide mb-3">
                                                            {grant.division.code}
                                                        </p>
                                                        <ul class="space-y-1">{screens}</ul>
                                                    </div>
                                                }
                                            })
                                            .collect_view()}
                                    </div>
                                }
                                .into_any()
                            }
                            Err(e) => {
                                view! {
                                    <div class="bg-red-50 border border-red-200 text-red-700 text-sm rounded-md px-4 py-3">
                                        {e}
                                    </div>
                                }
                                .into_any()
                            }
                        })
                }}
            </Suspense>
        </div>
    }
}
