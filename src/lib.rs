use leptos::prelude::*;
use leptos_router::components::{Outlet, ParentRoute, Redirect, Route, Router, Routes, A};
use leptos_router::hooks::use_navigate;
use leptos_router::path;

mod api;
mod components;
pub mod schema;
mod session;
mod types;

use components::dashboard::Dashboard;
use components::division_screen::DivisionScreen;
use components::login::Login;
use components::schema_studio::SchemaStudio;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <Routes fallback=|| "Not found.">
                <Route path=path!("/login") view=Login />
                <ParentRoute path=path!("") view=Shell>
                    <Route path=path!("/") view=Dashboard />
                    <Route path=path!("/division/:division/screen/:screen") view=DivisionScreen />
                    <Route path=path!("/studio") view=SchemaStudio />
                </ParentRoute>
            </Routes>
        </Router>
    }
}

/// Authenticated layout: sidebar plus the routed page. Unauthenticated
/// visitors are sent to the login page.
#[component]
fn Shell() -> impl IntoView {
    if !session::is_authenticated() {
        return view! { <Redirect path="/login" /> }.into_any();
    }

    // Refresh the cached user in the background so role changes take
    // effect without a fresh login.
    Effect::new(move |_| {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = session::fetch_current_user().await {
                log::warn!("session refresh failed: {e}");
            }
        });
    });

    let navigate = use_navigate();
    let user = session::current_user();
    let show_studio = user.as_ref().is_some_and(|u| u.is_superadmin());
    let user_line = user
        .map(|u| u.full_name)
        .unwrap_or_else(|| "Signed in".to_string());

    let handle_logout = move |_| {
        session::logout();
        navigate("/login", Default::default());
    };

    view! {
        <div class="flex h-screen bg-gray-100">
            // Sidebar
            <div class="w-64 bg-gray-800 text-white p-4 flex flex-col">
                <h1 class="text-2xl font-bold mb-8">"Data Portal"</h1>
                <nav class="space-y-1 flex-1">
                    <NavLink href="/" label="Dashboard" />
                    {show_studio
                        .then(|| {
                            view! {
                                <div class="border-t border-gray-700 my-4"></div>
                                <NavLink href="/studio" label="Schema Studio" />
                            }
                        })}
                </nav>
                <div class="text-xs text-gray-500 mt-4 space-y-2">
                    <p>{user_line}</p>
                    <button
                        type="button"
                        class="text-gray-400 hover:text-white underline"
                        on:click=handle_logout
                    >
                        "Sign out"
                    </button>
                </div>
            </div>

            // Main Content
            <div class="flex-1 overflow-y-auto">
                <Outlet />
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn NavLink(href: &'static str, label: &'static str) -> impl IntoView {
    view! {
        <A href=href attr:class="block p-2 hover:bg-gray-700 rounded transition-colors">
            {label}
        </A>
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(App);
}
