use crate::components::layout::AdminNav;
use crate::components::ui::{Alert, Loading, Notice, StatusBadge, confirm, local_datetime};
use crate::context::{AppDispatcher, AppStore, use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use campusconnect::query::filter_items;
use campusconnect_shared::protocol::RegistrationTransition;
use campusconnect_shared::{Id, Registration, RegistrationStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 对单条报名执行审批动作
fn transition(
    dispatcher: AppDispatcher,
    store: AppStore,
    id: Id,
    action: RegistrationTransition,
    notice: RwSignal<Option<Notice>>,
) {
    if action == RegistrationTransition::Cancel && !confirm("Cancel this registration?") {
        return;
    }
    spawn_local(async move {
        let cell = &store.registrations;
        let (settled, message) = match action {
            RegistrationTransition::Approve => {
                (dispatcher.approve_registration(cell, id).await, "Registration approved.")
            }
            RegistrationTransition::Reject => {
                (dispatcher.reject_registration(cell, id).await, "Registration rejected.")
            }
            RegistrationTransition::Cancel => {
                (dispatcher.cancel_registration(cell, id).await, "Registration cancelled.")
            }
        };
        notice.set(Notice::from_settled(&settled, message));
    });
}

#[component]
fn AttendeeRow(
    registration: Registration,
    dispatcher: AppDispatcher,
    notice: RwSignal<Option<Notice>>,
) -> impl IntoView {
    let store = use_store();
    let id = registration.id;
    let status = registration.status.clone();
    let pending = status == RegistrationStatus::Pending;
    let cancellable = matches!(
        status,
        RegistrationStatus::Registered | RegistrationStatus::Approved | RegistrationStatus::Pending
    );
    let act = move |action: RegistrationTransition| {
        let dispatcher = dispatcher.clone();
        move |_| transition(dispatcher.clone(), store, id, action, notice)
    };

    view! {
        <tr>
            <td>{registration.user_name().to_string()}</td>
            <td>{registration.user_email().to_string()}</td>
            <td><StatusBadge status=status /></td>
            <td>{local_datetime(registration.created_at.as_ref())}</td>
            <td>{local_datetime(registration.checked_in_at.as_ref())}</td>
            <td class="flex gap-1 justify-end">
                {pending.then(|| view! {
                    <button class="btn btn-success btn-xs" on:click=act(RegistrationTransition::Approve)>"Approve"</button>
                    <button class="btn btn-warning btn-xs" on:click=act(RegistrationTransition::Reject)>"Reject"</button>
                })}
                {cancellable.then(|| view! {
                    <button class="btn btn-error btn-xs" on:click=act(RegistrationTransition::Cancel)>"Cancel"</button>
                })}
            </td>
        </tr>
    }
}

/// 某个活动的报名名单
#[component]
pub fn AdminEventAttendeesPage(id: Id) -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let registrations = store.registrations.0;
    let events = store.events.0;
    let term = RwSignal::new(String::new());
    let notice = RwSignal::new(Option::<Notice>::None);

    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            futures::join!(
                dispatcher.get_event(&store.events, id),
                dispatcher.get_registrations_by_event(&store.registrations, id),
            );
        });
    }

    let event_name = move || {
        events.with(|s| {
            s.current
                .as_ref()
                .filter(|e| e.id == id)
                .map(|e| e.name.clone())
        })
    };
    let visible = move || {
        registrations.with(|s| {
            term.with(|t| filter_items(&s.items, t).into_iter().cloned().collect::<Vec<_>>())
        })
    };
    let checked_in = move || {
        registrations.with(|s| {
            s.items
                .iter()
                .filter(|r| r.status == RegistrationStatus::CheckedIn)
                .count()
        })
    };

    view! {
        <AdminNav />
        <div class="flex flex-wrap gap-4 justify-between items-center">
            <div>
                <h1 class="text-3xl font-bold">"Attendees"</h1>
                <Link to=AppRoute::AdminEventDetail(id).to_path() class="link">
                    {move || event_name().unwrap_or_else(|| format!("Event #{}", id))}
                </Link>
            </div>
            <input
                type="search"
                placeholder="Search attendees..."
                class="input input-bordered"
                on:input=move |ev| term.set(event_target_value(&ev))
                prop:value=move || term.get()
            />
        </div>
        <Alert notice=notice />
        {move || registrations.with(|s| s.error.clone()).map(|e| view! {
            <div role="alert" class="alert alert-error">{e}</div>
        })}
        <p class="text-sm text-base-content/70">
            {move || format!(
                "{} registrations, {} checked in",
                registrations.with(|s| s.items.len()),
                checked_in(),
            )}
        </p>

        <Show
            when=move || !registrations.with(|s| s.is_loading && s.items.is_empty())
            fallback=|| view! { <Loading /> }
        >
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Name"</th><th>"Email"</th><th>"Status"</th>
                            <th>"Registered"</th><th>"Checked in"</th><th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=visible
                            key=|r| (r.id, r.status.as_str().to_string())
                            let:registration
                        >
                            <AttendeeRow registration=registration dispatcher=dispatcher.clone() notice=notice />
                        </For>
                    </tbody>
                </table>
            </div>
        </Show>
    }
}
