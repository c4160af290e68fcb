use crate::components::events::EventCard;
use crate::components::ui::Loading;
use crate::context::{use_dispatcher, use_store};
use crate::web::router::Link;
use campusconnect_shared::protocol::ListEventsRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 首页：简介 + 即将开始的活动
#[component]
pub fn HomePage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let events = store.events.0;
    let is_authenticated = move || store.auth.0.with(|a| a.is_authenticated);

    spawn_local(async move {
        let request = ListEventsRequest {
            upcoming: true,
            ..Default::default()
        };
        dispatcher.get_events(&store.events, request).await;
    });

    // 顺序以服务端返回为准
    let upcoming = move || events.with(|s| s.items.clone());

    view! {
        <div class="hero bg-base-100 rounded-box shadow py-12">
            <div class="hero-content text-center">
                <div class="max-w-xl">
                    <h1 class="text-4xl font-bold">"CampusConnect"</h1>
                    <p class="py-6 text-base-content/70">
                        "Discover campus events, register in seconds and check in with your QR code."
                    </p>
                    <div class="flex gap-2 justify-center">
                        <Link to="/events" class="btn btn-primary">"Browse events"</Link>
                        <Show when=move || !is_authenticated()>
                            <Link to="/register" class="btn btn-outline">"Create an account"</Link>
                        </Show>
                    </div>
                </div>
            </div>
        </div>

        <h2 class="text-2xl font-bold">"Upcoming events"</h2>
        <Show
            when=move || !events.with(|s| s.is_loading)
            fallback=|| view! { <Loading /> }
        >
            {move || events.with(|s| s.error.clone()).map(|e| view! {
                <div role="alert" class="alert alert-error">{e}</div>
            })}
            <Show
                when=move || !upcoming().is_empty()
                fallback=|| view! { <p class="text-base-content/60">"No upcoming events right now."</p> }
            >
                <div class="grid gap-6 md:grid-cols-2 lg:grid-cols-3">
                    <For each=upcoming key=|e| e.id let:event>
                        <EventCard event=event />
                    </For>
                </div>
            </Show>
        </Show>
    }
}
