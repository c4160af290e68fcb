//! 活动列表与详情（公开页面）

use crate::components::ui::{
    Alert, Card, Loading, Notice, StatusBadge, confirm, local_datetime, local_time,
};
use crate::context::{use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use campusconnect::query::{EventSort, ListQuery, SortKey};
use campusconnect_shared::date;
use campusconnect_shared::protocol::ListEventsRequest;
use campusconnect_shared::{Event, Id, RegistrationStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 名额描述
fn spots_label(event: &Event) -> String {
    match (event.capacity, event.available_spots) {
        (None, _) => "Unlimited spots".to_string(),
        (Some(_), _) if event.is_full => "Full".to_string(),
        (Some(cap), Some(left)) => format!("{} of {} spots left", left, cap),
        (Some(cap), None) => format!("Capacity {}", cap),
    }
}

#[component]
pub fn EventCard(event: Event) -> impl IntoView {
    let route = AppRoute::EventDetail(event.id).to_path();
    let spots = spots_label(&event);
    let image = event.background_image.clone();
    let is_past = event.is_past;

    view! {
        <div class="card bg-base-100 shadow-xl">
            {image.map(|src| view! {
                <figure class="h-40 overflow-hidden"><img src=src alt="" class="w-full object-cover" /></figure>
            })}
            <div class="card-body">
                <h2 class="card-title">
                    {event.name.clone()}
                    <Show when=move || is_past>
                        <span class="badge badge-ghost">"Past"</span>
                    </Show>
                </h2>
                <p class="text-sm text-base-content/70">{local_datetime(Some(&event.start_time))}</p>
                <p class="text-sm">{event.location.clone()}</p>
                <p class="text-xs text-base-content/60">{spots}</p>
                <div class="card-actions justify-end">
                    <Link to=route class="btn btn-primary btn-sm">"View details"</Link>
                </div>
            </div>
        </div>
    }
}

/// 活动列表
///
/// 搜索与排序只作用于当前页。
#[component]
pub fn EventListPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let events = store.events.0;
    let query = RwSignal::new(ListQuery::<EventSort>::default());
    let page = RwSignal::new(1u64);

    Effect::new(move |_| {
        let request = ListEventsRequest {
            page: page.get(),
            ..Default::default()
        };
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            dispatcher.get_events(&store.events, request).await;
        });
    });

    let visible = move || events.with(|s| query.with(|q| q.apply(&s.items)));
    let total_pages = move || events.with(|s| s.total_pages);

    view! {
        <div class="flex flex-col md:flex-row gap-4 justify-between items-center">
            <h1 class="text-3xl font-bold">"Events"</h1>
            <div class="flex gap-2">
                <input
                    type="search"
                    placeholder="Search events..."
                    class="input input-bordered"
                    on:input=move |ev| query.update(|q| q.term = event_target_value(&ev))
                    prop:value=move || query.with(|q| q.term.clone())
                />
                <select
                    class="select select-bordered"
                    on:change=move |ev| {
                        if let Some(key) = EventSort::from_value(&event_target_value(&ev)) {
                            query.update(|q| q.sort_by(key));
                        }
                    }
                >
                    <option value="start_time">"Date"</option>
                    <option value="name">"Name"</option>
                    <option value="location">"Location"</option>
                </select>
                <button class="btn btn-ghost" on:click=move |_| query.update(|q| q.direction = q.direction.toggled())>
                    {move || query.with(|q| q.direction.arrow())}
                </button>
            </div>
        </div>

        {move || events.with(|s| s.error.clone()).map(|e| view! {
            <div role="alert" class="alert alert-error">{e}</div>
        })}

        <Show
            when=move || !events.with(|s| s.is_loading)
            fallback=|| view! { <Loading text="Loading events..." /> }
        >
            <Show
                when=move || !visible().is_empty()
                fallback=|| view! { <p class="text-center py-8 text-base-content/60">"No events found."</p> }
            >
                <div class="grid gap-6 md:grid-cols-2 lg:grid-cols-3">
                    <For each=visible key=|e| e.id let:event>
                        <EventCard event=event />
                    </For>
                </div>
            </Show>
        </Show>

        <Show when=move || { total_pages() > 1 }>
            <div class="join flex justify-center">
                <button
                    class="join-item btn"
                    disabled=move || page.get() <= 1
                    on:click=move |_| page.update(|p| *p = p.saturating_sub(1).max(1))
                >
                    "«"
                </button>
                <button class="join-item btn btn-disabled">
                    {move || format!("Page {} of {}", page.get(), total_pages())}
                </button>
                <button
                    class="join-item btn"
                    disabled=move || page.get() >= total_pages()
                    on:click=move |_| page.update(|p| *p += 1)
                >
                    "»"
                </button>
            </div>
        </Show>
    }
}

/// 活动详情，登录用户可以报名或取消报名
#[component]
pub fn EventDetailPage(id: Id) -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let router = use_router();
    let events = store.events.0;
    let registrations = store.registrations.0;
    let auth = store.auth.0;
    let notice = RwSignal::new(Option::<Notice>::None);
    let (is_busy, set_is_busy) = signal(false);

    events.update(|s| s.clear_current());
    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            dispatcher.get_event(&store.events, id).await;
            if auth.with_untracked(|a| a.is_authenticated) {
                dispatcher.get_my_registrations(&store.registrations).await;
            }
        });
    }

    let event = move || events.with(|s| s.current.clone().filter(|e| e.id == id));
    // 当前用户对此活动的有效报名
    let my_registration = move || {
        registrations.with(|s| {
            s.items
                .iter()
                .find(|r| {
                    r.event.as_ref().is_some_and(|e| e.id == id)
                        && r.status != RegistrationStatus::Cancelled
                })
                .cloned()
        })
    };

    let register = {
        let dispatcher = dispatcher.clone();
        move |_| {
            if !auth.with_untracked(|a| a.is_authenticated) {
                router.navigate_to(&AppRoute::Login);
                return;
            }
            set_is_busy.set(true);
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                let settled = dispatcher.register_for_event(&store.registrations, id).await;
                if settled.is_fulfilled() {
                    // 刷新剩余名额
                    dispatcher.get_event(&store.events, id).await;
                }
                notice.set(Notice::from_settled(&settled, "You are registered for this event."));
                set_is_busy.set(false);
            });
        }
    };

    let cancel = move |registration_id: Id| {
        if !confirm("Cancel your registration for this event?") {
            return;
        }
        set_is_busy.set(true);
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            let settled = dispatcher
                .cancel_registration(&store.registrations, registration_id)
                .await;
            notice.set(Notice::from_settled(&settled, "Your registration was cancelled."));
            set_is_busy.set(false);
        });
    };

    view! {
        <Alert notice=notice />
        {move || match event() {
            None if events.with(|s| s.is_loading) => view! { <Loading text="Loading event..." /> }.into_any(),
            None => view! {
                <div role="alert" class="alert alert-error">
                    {events.with(|s| s.error.clone()).unwrap_or_else(|| "Event not found.".to_string())}
                </div>
            }.into_any(),
            Some(event) => {
                let register = register.clone();
                let cancel = cancel.clone();
                let can_register = !event.is_past && !event.is_full && event.active;
                view! {
                    <Card title=event.name.clone()>
                        {event.background_image.clone().map(|src| view! {
                            <img src=src alt="" class="rounded-box w-full max-h-72 object-cover" />
                        })}
                        <p class="text-lg font-medium">{local_time(Some(&event.start_time), date::FORMAT_FULL)}</p>
                        <div class="grid md:grid-cols-2 gap-2 text-sm">
                            <p><b>"Starts: "</b>{local_datetime(Some(&event.start_time))}</p>
                            <p><b>"Ends: "</b>{local_datetime(Some(&event.end_time))}</p>
                            <p><b>"Location: "</b>{event.location.clone()}</p>
                            <p><b>"Registration deadline: "</b>{local_datetime(event.registration_deadline.as_ref())}</p>
                            <p><b>"Availability: "</b>{spots_label(&event)}</p>
                        </div>
                        <p class="whitespace-pre-line">{event.description.clone().unwrap_or_default()}</p>

                        <div class="card-actions justify-end items-center gap-2">
                            {move || match my_registration() {
                                Some(reg) => {
                                    let cancel = cancel.clone();
                                    let reg_id = reg.id;
                                    let qr = AppRoute::RegistrationQrCode(reg.id).to_path();
                                    view! {
                                        <StatusBadge status=reg.status.clone() />
                                        <Link to=qr class="btn btn-outline btn-sm">"Show QR code"</Link>
                                        <button
                                            class="btn btn-error btn-sm"
                                            disabled=move || is_busy.get()
                                            on:click=move |_| cancel(reg_id)
                                        >
                                            "Cancel registration"
                                        </button>
                                    }.into_any()
                                }
                                None if can_register => view! {
                                    <button
                                        class="btn btn-primary"
                                        disabled=move || is_busy.get()
                                        on:click=register.clone()
                                    >
                                        "Register"
                                    </button>
                                }.into_any(),
                                None => view! {
                                    <span class="text-base-content/60">"Registration is closed."</span>
                                }.into_any(),
                            }}
                        </div>
                    </Card>
                }.into_any()
            }
        }}
    }
}
