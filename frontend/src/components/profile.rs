use crate::components::ui::{Alert, Card, Notice, RoleBadge, TextField, local_datetime};
use crate::context::{use_page_lifetime, use_store};
use campusconnect::forms::{FieldErrors, validate_profile};
use campusconnect_shared::{ProfileUpdate, User};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 个人资料
///
/// 进入页面先拉取最新资料，再用它填充表单。
/// 请求写入 auth 切片，不随页面卸载丢弃；页面自己的表单和提示只在页面仍在时更新。
#[component]
pub fn ProfilePage() -> impl IntoView {
    let store = use_store();
    let dispatcher = store.app_dispatcher();
    let page = use_page_lifetime();
    let auth = store.auth.0;

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let notice = RwSignal::new(Option::<Notice>::None);
    let (is_saving, set_is_saving) = signal(false);

    let fill = move |user: &User| {
        name.set(user.name.clone());
        email.set(user.email.clone());
        phone.set(user.phone.clone().unwrap_or_default());
    };

    if let Some(user) = auth.with_untracked(|a| a.user.clone()) {
        fill(&user);
    }
    {
        let dispatcher = dispatcher.clone();
        let page = page.clone();
        spawn_local(async move {
            if let Some(user) = dispatcher.fetch_profile(&store.auth).await.ok()
                && page.is_alive()
            {
                fill(&user);
            }
        });
    }

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let update = ProfileUpdate {
            name: name.get_untracked(),
            email: email.get_untracked(),
            phone: Some(phone.get_untracked()),
        };
        let update = match validate_profile(&update) {
            Ok(update) => {
                errors.set(FieldErrors::default());
                update
            }
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        set_is_saving.set(true);
        let dispatcher = dispatcher.clone();
        let page = page.clone();
        spawn_local(async move {
            let settled = dispatcher.update_profile(&store.auth, update).await;
            if !page.is_alive() {
                return;
            }
            if let Some(n) = Notice::from_settled(&settled, "Profile updated.") {
                notice.set(Some(n));
                set_is_saving.set(false);
            }
        });
    };

    let account = move || {
        auth.with(|a| a.user.clone()).map(|user| {
            view! {
                <div class="flex flex-wrap gap-4 text-sm">
                    <span>"Role: "<RoleBadge role=user.role /></span>
                    <span>"Member since: "{local_datetime(user.created_at.as_ref())}</span>
                    {user.guest_code.clone().map(|c| view! { <span>"Guest code: "<code>{c}</code></span> })}
                </div>
            }
        })
    };

    view! {
        <div class="max-w-lg mx-auto">
            <Card title="My profile">
                <Alert notice=notice />
                {account}
                <form class="space-y-2" on:submit=on_submit>
                    <TextField id="name" label="Full name" value=name errors=errors />
                    <TextField id="email" label="Email" kind="email" value=email errors=errors />
                    <TextField id="phone" label="Phone" kind="tel" value=phone errors=errors />
                    <div class="card-actions justify-end mt-4">
                        <button class="btn btn-primary" disabled=move || is_saving.get()>"Save changes"</button>
                    </div>
                </form>
            </Card>
        </div>
    }
}
