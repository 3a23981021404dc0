//! Login / registration page

use leptos::prelude::*;
use leptos::web_sys;
use leptos_router::hooks::use_navigate;

use crate::session;

const FIELD_CLASS: &str = "w-full px-3 py-2 text-sm border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-blue-500";

#[component]
pub fn Login() -> impl IntoView {
    let navigate = use_navigate();

    let (registering, set_registering) = signal(false);
    let (full_name, set_full_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal(Option::<String>::None);
    let (busy, set_busy) = signal(false);

    let handle_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let navigate = navigate.clone();
        let is_register = registering.get_untracked();
        let full_name = full_name.get_untracked();
        let email = email.get_untracked();
        let password = password.get_untracked();
        set_busy.set(true);
        set_error.set(None);
        wasm_bindgen_futures::spawn_local(async move {
            let result = if is_register {
                session::register(&full_name, &email, &password).await
            } else {
                session::login(&email, &password).await
            };
            match result {
                Ok(_) => navigate("/", Default::default()),
                Err(e) => {
                    set_error.set(Some(e));
                    set_busy.set(false);
                }
            }
        });
    };

    view! {
        <div class="min-h-screen flex items-center justify-center bg-gray-50 px-4">
            <div class="w-full max-w-sm bg-white border border-gray-200 rounded-lg p-6 space-y-4">
                <h1 class="text-xl font-bold text-gray-900 text-center">
                    {move || if registering.get() { "Create account" } else { "Sign in" }}
                </h1>
                {move || {
                    error
                        .get()
                        .map(|msg| {
                            view! {
                                <div class="bg-red-50 border border-red-200 text-red-700 text-sm rounded-md px-3 py-2">
                                    {msg}
                                </div>
                            }
                        })
                }}
                <form class="space-y-3" on:submit=handle_submit>
                    <Show when=move || registering.get()>
                        <div>
                            <label class="block text-sm font-medium text-gray-700 mb-1">
                                "Full name"
                            </label>
                            <input
                                type="text"
                                class=FIELD_CLASS
                                prop:value=move || full_name.get()
                                on:input=move |ev| set_full_name.set(event_target_value(&ev))
                            />
                        </div>
                    </Show>
                    <div>
                        <label class="block text-sm font-medium text-gray-700 mb-1">"Email"</label>
                        <input
                            type="email"
                            class=FIELD_CLASS
                            prop:value=move || email.get()
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                    </div>
                    <div>
                        <label class="block text-sm font-medium text-gray-700 mb-1">
                            "Password"
                        </label>
                        <input
                            type="password"
                            class=FIELD_CLASS
                            prop:value=move || password.get()
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                        />
                    </div>
                    <button
                        type="submit"
                        class="w-full px-4 py-2 bg-blue-600 text-white text-sm font-medium rounded-md hover:bg-blue-700 disabled:opacity-50"
                        disabled=move || busy.get()
                    >
                        {move || {
                            if busy.get() {
                                "Please wait..."
                            } else if registering.get() {
                                "Register"
                            } else {
                                "Sign in"
                            }
                        }}
                    </button>
                </form>
                <button
                    type="button"
                    class="w-full text-sm text-blue-600 hover:text-blue-800"
                    on:click=move |_| {
                        set_error.set(None);
                        set_registering.update(|r| *r = !*r);
                    }
                >
                    {move || {
                        if registering.get() {
                            "Already have an account? Sign in"
                        } else {
                            "Need an account? Register"
                        }
                    }}
                </button>
            </div>
        </div>
    }
}
