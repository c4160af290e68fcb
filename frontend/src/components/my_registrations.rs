//! 我的报名
//!
//! 按即将开始 / 已结束 / 已签到 / 已取消分组展示。

use crate::components::ui::{Alert, Loading, Notice, StatusBadge, confirm, local_datetime};
use crate::context::{AppDispatcher, use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use campusconnect::query::group_registrations;
use campusconnect_shared::Registration;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
fn RegistrationRow(
    registration: Registration,
    /// 仅即将开始的报名可取消、出示二维码
    #[prop(optional)]
    actionable: bool,
    dispatcher: AppDispatcher,
    notice: RwSignal<Option<Notice>>,
) -> impl IntoView {
    let store = use_store();
    let id = registration.id;
    let event_link = registration
        .event
        .as_ref()
        .map(|e| AppRoute::EventDetail(e.id).to_path());
    let start = local_datetime(registration.event_start().as_ref());
    let location = registration
        .event
        .as_ref()
        .map(|e| e.location.clone())
        .unwrap_or_default();
    let name = registration.event_name().to_string();

    let cancel = move |_| {
        if !confirm("Cancel this registration?") {
            return;
        }
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            let settled = dispatcher.cancel_registration(&store.registrations, id).await;
            notice.set(Notice::from_settled(&settled, "Registration cancelled."));
        });
    };

    view! {
        <tr>
            <td>
                {match event_link {
                    Some(to) => view! { <Link to=to class="link link-hover font-medium">{name}</Link> }.into_any(),
                    None => view! { <span class="font-medium">{name}</span> }.into_any(),
                }}
            </td>
            <td>{start}</td>
            <td>{location}</td>
            <td><StatusBadge status=registration.status.clone() /></td>
            <td class="flex gap-2 justify-end">
                <Show when=move || actionable>
                    <Link to=AppRoute::RegistrationQrCode(id).to_path() class="btn btn-outline btn-xs">
                        "QR code"
                    </Link>
                    <button class="btn btn-error btn-xs" on:click=cancel.clone()>"Cancel"</button>
                </Show>
            </td>
        </tr>
    }
}

#[component]
fn RegistrationSection(
    #[prop(into)] title: String,
    items: Vec<Registration>,
    #[prop(optional)] actionable: bool,
    dispatcher: AppDispatcher,
    notice: RwSignal<Option<Notice>>,
) -> impl IntoView {
    if items.is_empty() {
        return ().into_any();
    }
    let count = items.len();

    view! {
        <section class="space-y-2">
            <h2 class="text-xl font-semibold">{format!("{} ({})", title, count)}</h2>
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table">
                    <thead>
                        <tr><th>"Event"</th><th>"Starts"</th><th>"Location"</th><th>"Status"</th><th></th></tr>
                    </thead>
                    <tbody>
                        {items
                            .into_iter()
                            .map(|registration| view! {
                                <RegistrationRow
                                    registration=registration
                                    actionable=actionable
                                    dispatcher=dispatcher.clone()
                                    notice=notice
                                />
                            })
                            .collect_view()}
                    </tbody>
                </table>
            </div>
        </section>
    }
    .into_any()
}

#[component]
pub fn MyRegistrationsPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let registrations = store.registrations.0;
    let notice = RwSignal::new(Option::<Notice>::None);

    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            dispatcher.get_my_registrations(&store.registrations).await;
        });
    }

    let groups = move || registrations.with(|s| group_registrations(&s.items, chrono::Utc::now()));

    view! {
        <h1 class="text-3xl font-bold">"My Registrations"</h1>
        <Alert notice=notice />
        {move || registrations.with(|s| s.error.clone()).map(|e| view! {
            <div role="alert" class="alert alert-error">{e}</div>
        })}
        {move || {
            if registrations.with(|s| s.is_loading && s.items.is_empty()) {
                return view! { <Loading text="Loading your registrations..." /> }.into_any();
            }
            let groups = groups();
            if groups.is_empty() {
                return view! {
                    <div class="text-center py-8 space-y-4">
                        <p class="text-base-content/60">"You have not registered for any events yet."</p>
                        <Link to="/events" class="btn btn-primary">"Browse events"</Link>
                    </div>
                }
                .into_any();
            }
            view! {
                <RegistrationSection title="Upcoming" items=groups.upcoming actionable=true dispatcher=dispatcher.clone() notice=notice />
                <RegistrationSection title="Past" items=groups.past dispatcher=dispatcher.clone() notice=notice />
                <RegistrationSection title="Checked in" items=groups.checked_in dispatcher=dispatcher.clone() notice=notice />
                <RegistrationSection title="Cancelled" items=groups.cancelled dispatcher=dispatcher.clone() notice=notice />
            }
            .into_any()
        }}
    }
}
