use crate::components::layout::AdminNav;
use crate::components::ui::{Alert, Loading, Notice, StatusBadge, confirm, local_datetime};
use crate::context::{use_dispatcher, use_store};
use campusconnect::query::{ListQuery, RegistrationSort, SortKey, filter_by_status};
use campusconnect_shared::{Id, RegistrationStatus};
use campusconnect_shared::protocol::ListAdminRegistrationsRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 全部报名
///
/// 一次取回，状态筛选、搜索和排序都在本地完成。
#[component]
pub fn AdminRegistrationsPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let registrations = store.registrations.0;
    let query = RwSignal::new(ListQuery::<RegistrationSort>::default());
    let status = RwSignal::new(Option::<RegistrationStatus>::None);
    let notice = RwSignal::new(Option::<Notice>::None);

    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            dispatcher
                .get_admin_registrations(&store.registrations, ListAdminRegistrationsRequest::default())
                .await;
        });
    }

    let visible = move || {
        registrations.with(|s| {
            let by_status: Vec<_> = status.with(|st| {
                filter_by_status(&s.items, st.as_ref()).into_iter().cloned().collect()
            });
            query.with(|q| q.apply(&by_status))
        })
    };

    let cancel = move |id: Id| {
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
        <AdminNav />
        <div class="flex flex-wrap gap-4 justify-between items-center">
            <h1 class="text-3xl font-bold">"Registrations"</h1>
            <div class="flex flex-wrap gap-2">
                <input
                    type="search"
                    placeholder="Search user or event..."
                    class="input input-bordered"
                    on:input=move |ev| query.update(|q| q.term = event_target_value(&ev))
                    prop:value=move || query.with(|q| q.term.clone())
                />
                <select
                    class="select select-bordered"
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        status.set((!value.is_empty()).then(|| RegistrationStatus::from(value)));
                    }
                >
                    <option value="">"All statuses"</option>
                    {RegistrationStatus::KNOWN
                        .iter()
                        .map(|s| view! { <option value=s.as_str().to_string()>{s.label().to_string()}</option> })
                        .collect_view()}
                </select>
                <select
                    class="select select-bordered"
                    on:change=move |ev| {
                        if let Some(key) = RegistrationSort::from_value(&event_target_value(&ev)) {
                            query.update(|q| q.sort_by(key));
                        }
                    }
                >
                    <option value="created_at">"Registered"</option>
                    <option value="event_name">"Event"</option>
                    <option value="status">"Status"</option>
                </select>
                <button class="btn btn-ghost" on:click=move |_| query.update(|q| q.direction = q.direction.toggled())>
                    {move || query.with(|q| q.direction.arrow())}
                </button>
            </div>
        </div>
        <Alert notice=notice />
        {move || registrations.with(|s| s.error.clone()).map(|e| view! {
            <div role="alert" class="alert alert-error">{e}</div>
        })}

        <Show
            when=move || !registrations.with(|s| s.is_loading && s.items.is_empty())
            fallback=|| view! { <Loading /> }
        >
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"User"</th><th>"Event"</th><th>"Status"</th>
                            <th>"Registered"</th><th>"Checked in"</th><th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For each=visible key=|r| (r.id, r.status.as_str().to_string()) let:reg>
                            {
                                let id = reg.id;
                                let cancel = cancel.clone();
                                let cancellable = matches!(
                                    reg.status,
                                    RegistrationStatus::Registered | RegistrationStatus::Approved | RegistrationStatus::Pending
                                );
                                view! {
                                    <tr>
                                        <td>
                                            <div>{reg.user_name().to_string()}</div>
                                            <div class="text-xs text-base-content/60">{reg.user_email().to_string()}</div>
                                        </td>
                                        <td>{reg.event_name().to_string()}</td>
                                        <td><StatusBadge status=reg.status.clone() /></td>
                                        <td>{local_datetime(reg.created_at.as_ref())}</td>
                                        <td>{local_datetime(reg.checked_in_at.as_ref())}</td>
                                        <td>
                                            {cancellable.then(|| view! {
                                                <button class="btn btn-error btn-xs" on:click=move |_| cancel(id)>"Cancel"</button>
                                            })}
                                        </td>
                                    </tr>
                                }
                            }
                        </For>
                    </tbody>
                </table>
            </div>
        </Show>
    }
}
