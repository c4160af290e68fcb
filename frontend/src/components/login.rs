use crate::components::ui::{Alert, Notice};
use crate::context::{use_page_lifetime, use_store};
use crate::web::router::Link;
use campusconnect::store::Settled;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 登录页
///
/// 登录成功后不在这里跳转，路由守卫会把已登录用户送回登录前的页面。
#[component]
pub fn LoginPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = store.app_dispatcher();
    let page = use_page_lifetime();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let notice = RwSignal::new(Option::<Notice>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get().trim().is_empty() || password.get().is_empty() {
            notice.set(Some(Notice::error("Please fill in all fields")));
            return;
        }

        set_is_submitting.set(true);
        notice.set(None);

        let dispatcher = dispatcher.clone();
        let page = page.clone();
        let auth = store.auth;
        spawn_local(async move {
            let settled = dispatcher
                .login(&auth, &email.get_untracked(), &password.get_untracked())
                .await;
            match settled {
                Settled::Fulfilled(signed) => {
                    log::info!("[Auth] signed in as {}", signed.user.email);
                }
                Settled::Rejected(msg) if page.is_alive() => {
                    notice.set(Some(Notice::error(msg)));
                    set_is_submitting.set(false);
                }
                Settled::Rejected(_) | Settled::Discarded => {}
            }
        });
    };

    view! {
        <div class="hero py-12">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Welcome back"</h1>
                    <p class="text-base-content/70">"Sign in to manage your event registrations"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Alert notice=notice />

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="you@university.edu"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            "No account yet? "
                            <Link to="/register" class="link link-primary">"Register"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
