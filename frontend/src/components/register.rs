//! 注册页
//!
//! 表单字段整合为 `RegisterForm`，提交前由核心库统一校验。

use crate::components::ui::{Alert, FieldError, Notice, TextField};
use crate::context::{use_page_lifetime, use_store};
use crate::web::router::Link;
use campusconnect::forms::{FieldErrors, validate_registration};
use campusconnect::store::Settled;
use campusconnect_shared::Role;
use campusconnect_shared::protocol::RegisterRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 注册表单状态
#[derive(Clone, Copy)]
struct RegisterForm {
    name: RwSignal<String>,
    email: RwSignal<String>,
    phone: RwSignal<String>,
    password: RwSignal<String>,
    password2: RwSignal<String>,
    role: RwSignal<Role>,
    guest_code: RwSignal<String>,
}

impl RegisterForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            phone: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            password2: RwSignal::new(String::new()),
            role: RwSignal::new(Role::Student),
            guest_code: RwSignal::new(String::new()),
        }
    }

    fn to_request(self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.get_untracked(),
            email: self.email.get_untracked(),
            password: self.password.get_untracked(),
            password2: self.password2.get_untracked(),
            phone: Some(self.phone.get_untracked()),
            role: self.role.get_untracked(),
            guest_code: Some(self.guest_code.get_untracked()),
        }
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = store.app_dispatcher();
    let page = use_page_lifetime();
    let form = RegisterForm::new();
    let errors = RwSignal::new(FieldErrors::default());
    let notice = RwSignal::new(Option::<Notice>::None);
    let (is_submitting, set_is_submitting) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        notice.set(None);

        let req = match validate_registration(&form.to_request()) {
            Ok(req) => {
                errors.set(FieldErrors::default());
                req
            }
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        set_is_submitting.set(true);
        let dispatcher = dispatcher.clone();
        let page = page.clone();
        let auth = store.auth;
        spawn_local(async move {
            if let Settled::Rejected(msg) = dispatcher.register(&auth, req).await
                && page.is_alive()
            {
                notice.set(Some(Notice::error(msg)));
                set_is_submitting.set(false);
            }
        });
    };

    let guest_code_error = Signal::derive(move || {
        errors.with(|e| e.get("guest_code").map(str::to_string))
    });

    view! {
        <div class="max-w-lg mx-auto">
            <div class="card bg-base-100 shadow-2xl">
                <form class="card-body" on:submit=on_submit>
                    <h1 class="card-title text-2xl">"Create an account"</h1>
                    <Alert notice=notice />

                    <TextField id="name" label="Full name" value=form.name errors=errors />
                    <TextField id="email" label="Email" kind="email" value=form.email errors=errors />
                    <TextField id="phone" label="Phone (optional)" kind="tel" value=form.phone errors=errors />
                    <TextField id="password" label="Password" kind="password" value=form.password errors=errors />
                    <TextField
                        id="password2"
                        label="Confirm password"
                        kind="password"
                        value=form.password2
                        errors=errors
                    />

                    <div class="form-control">
                        <label class="label" for="role">
                            <span class="label-text">"Account type"</span>
                        </label>
                        <select
                            id="role"
                            class="select select-bordered w-full"
                            on:change=move |ev| {
                                let role = Role::from_value(&event_target_value(&ev)).unwrap_or_default();
                                form.role.set(role);
                            }
                        >
                            <option value="student" selected=move || form.role.get() == Role::Student>
                                "Student"
                            </option>
                            <option value="guest" selected=move || form.role.get() == Role::Guest>
                                "Guest"
                            </option>
                        </select>
                    </div>

                    <Show when=move || form.role.get() == Role::Guest>
                        <div class="form-control">
                            <label class="label" for="guest_code">
                                <span class="label-text">"Guest code"</span>
                            </label>
                            <input
                                id="guest_code"
                                type="text"
                                class="input input-bordered w-full"
                                on:input=move |ev| form.guest_code.set(event_target_value(&ev))
                                prop:value=move || form.guest_code.get()
                            />
                            <FieldError message=guest_code_error />
                        </div>
                    </Show>

                    <div class="form-control mt-6">
                        <button class="btn btn-primary" disabled=move || is_submitting.get()>
                            {move || if is_submitting.get() {
                                view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                            } else {
                                "Register".into_any()
                            }}
                        </button>
                    </div>
                    <p class="text-center text-sm mt-2">
                        "Already registered? "
                        <Link to="/login" class="link link-primary">"Sign in"</Link>
                    </p>
                </form>
            </div>
        </div>
    }
}
