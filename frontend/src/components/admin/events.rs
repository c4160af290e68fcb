//! 管理端活动列表与详情

use crate::components::layout::AdminNav;
use crate::components::ui::{Alert, Card, Loading, Notice, confirm, local_datetime};
use crate::context::{AppDispatcher, Slice, use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use campusconnect::query::{EventSort, ListQuery};
use campusconnect::store::EventsState;
use campusconnect_shared::Id;
use campusconnect_shared::protocol::ListEventsRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 删除前确认，成功后执行 `after`
fn delete_event(
    dispatcher: AppDispatcher,
    events: Slice<EventsState>,
    id: Id,
    notice: RwSignal<Option<Notice>>,
    after: impl FnOnce() + 'static,
) {
    if !confirm("Delete this event? Registrations for it will be removed as well.") {
        return;
    }
    spawn_local(async move {
        let settled = dispatcher.delete_event(&events, id).await;
        let done = settled.is_fulfilled();
        notice.set(Notice::from_settled(&settled, "Event deleted."));
        if done {
            after();
        }
    });
}

#[component]
pub fn AdminEventsPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let events = store.events.0;
    let query = RwSignal::new(ListQuery::<EventSort>::default());
    let notice = RwSignal::new(Option::<Notice>::None);

    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            dispatcher
                .get_events(&store.events, ListEventsRequest::default())
                .await;
        });
    }

    let visible = move || events.with(|s| query.with(|q| q.apply(&s.items)));
    let header = move |key: EventSort, label: &'static str| {
        view! {
            <th class="cursor-pointer select-none" on:click=move |_| query.update(|q| q.sort_by(key))>
                {label}
                {move || query.with(|q| (q.sort == key).then(|| format!(" {}", q.direction.arrow())))}
            </th>
        }
    };

    view! {
        <AdminNav />
        <div class="flex flex-wrap gap-4 justify-between items-center">
            <h1 class="text-3xl font-bold">"Manage Events"</h1>
            <div class="flex gap-2">
                <input
                    type="search"
                    placeholder="Search events..."
                    class="input input-bordered"
                    on:input=move |ev| query.update(|q| q.term = event_target_value(&ev))
                    prop:value=move || query.with(|q| q.term.clone())
                />
                <Link to=AppRoute::AdminEventNew.to_path() class="btn btn-primary">"New event"</Link>
            </div>
        </div>
        <Alert notice=notice />
        {move || events.with(|s| s.error.clone()).map(|e| view! {
            <div role="alert" class="alert alert-error">{e}</div>
        })}

        <Show
            when=move || !events.with(|s| s.is_loading && s.items.is_empty())
            fallback=|| view! { <Loading /> }
        >
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table">
                    <thead>
                        <tr>
                            {header(EventSort::Name, "Name")}
                            {header(EventSort::StartTime, "Starts")}
                            {header(EventSort::Location, "Location")}
                            <th>"Registrations"</th>
                            <th>"Active"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For each=visible key=|e| (e.id, e.name.clone(), e.active) let:event>
                            {
                                let id = event.id;
                                let dispatcher = dispatcher.clone();
                                let count = match (event.registration_count, event.capacity) {
                                    (Some(n), Some(cap)) => format!("{} / {}", n, cap),
                                    (Some(n), None) => n.to_string(),
                                    (None, _) => "-".to_string(),
                                };
                                view! {
                                    <tr>
                                        <td>
                                            <Link to=AppRoute::AdminEventDetail(id).to_path() class="link link-hover">
                                                {event.name.clone()}
                                            </Link>
                                        </td>
                                        <td>{local_datetime(Some(&event.start_time))}</td>
                                        <td>{event.location.clone()}</td>
                                        <td>{count}</td>
                                        <td>{if event.active { "Yes" } else { "No" }}</td>
                                        <td class="flex gap-1 justify-end">
                                            <Link to=AppRoute::AdminEventEdit(id).to_path() class="btn btn-xs">"Edit"</Link>
                                            <Link to=AppRoute::AdminEventAttendees(id).to_path() class="btn btn-xs">"Attendees"</Link>
                                            <button
                                                class="btn btn-error btn-xs"
                                                on:click=move |_| delete_event(dispatcher.clone(), store.events, id, notice, || {})
                                            >
                                                "Delete"
                                            </button>
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

#[component]
pub fn AdminEventDetailPage(id: Id) -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let router = use_router();
    let events = store.events.0;
    let notice = RwSignal::new(Option::<Notice>::None);

    events.update(|s| s.clear_current());
    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            dispatcher.get_event(&store.events, id).await;
        });
    }

    let on_delete = move |_| {
        delete_event(dispatcher.clone(), store.events, id, notice, move || {
            router.navigate_to(&AppRoute::AdminEvents);
        });
    };

    view! {
        <AdminNav />
        <Alert notice=notice />
        {move || match events.with(|s| s.current.clone().filter(|e| e.id == id)) {
            None if events.with(|s| s.is_loading) => view! { <Loading /> }.into_any(),
            None => view! {
                <div role="alert" class="alert alert-error">
                    {events.with(|s| s.error.clone()).unwrap_or_else(|| "Event not found.".to_string())}
                </div>
            }.into_any(),
            Some(event) => {
                let on_delete = on_delete.clone();
                view! {
                    <Card title=event.name.clone()>
                        <div class="grid md:grid-cols-2 gap-2 text-sm">
                            <p><b>"Starts: "</b>{local_datetime(Some(&event.start_time))}</p>
                            <p><b>"Ends: "</b>{local_datetime(Some(&event.end_time))}</p>
                            <p><b>"Location: "</b>{event.location.clone()}</p>
                            <p><b>"Registration deadline: "</b>{local_datetime(event.registration_deadline.as_ref())}</p>
                            <p><b>"Capacity: "</b>{event.capacity.map(|c| c.to_string()).unwrap_or_else(|| "Unlimited".to_string())}</p>
                            <p><b>"Registrations: "</b>{event.registration_count.unwrap_or(0)}</p>
                            <p><b>"Active: "</b>{if event.active { "Yes" } else { "No" }}</p>
                        </div>
                        <p class="whitespace-pre-line">{event.description.clone().unwrap_or_default()}</p>
                        <div class="card-actions justify-end">
                            <Link to=AppRoute::AdminEventAttendees(id).to_path() class="btn btn-outline">"Attendees"</Link>
                            <Link to=AppRoute::AdminEventEdit(id).to_path() class="btn btn-primary">"Edit"</Link>
                            <button class="btn btn-error" on:click=on_delete>"Delete"</button>
                        </div>
                    </Card>
                }.into_any()
            }
        }}
    }
}
