use crate::components::layout::AdminNav;
use crate::components::ui::{Card, Loading, StatusBadge, local_datetime};
use crate::context::{use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use campusconnect::query::DashboardStats;
use campusconnect::store::Settled;
use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
fn StatCard(#[prop(into)] title: String, value: usize) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{title}</div>
            <div class="stat-value">{value}</div>
        </div>
    }
}

/// 管理端首页：统计数字 + 最近的活动与报名
#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let stats = RwSignal::new(Option::<DashboardStats>::None);
    let error = RwSignal::new(Option::<String>::None);

    spawn_local(async move {
        let settled = dispatcher
            .load_dashboard(&store.events, &store.users, &store.registrations, Utc::now())
            .await;
        match settled {
            Settled::Fulfilled(s) => stats.set(Some(s)),
            Settled::Rejected(msg) => error.set(Some(msg)),
            Settled::Discarded => {}
        }
    });

    view! {
        <AdminNav />
        <h1 class="text-3xl font-bold">"Admin Dashboard"</h1>
        {move || error.get().map(|e| view! { <div role="alert" class="alert alert-error">{e}</div> })}
        {move || match stats.get() {
            None if error.with(Option::is_none) => view! { <Loading text="Loading statistics..." /> }.into_any(),
            None => ().into_any(),
            Some(s) => view! {
                <div class="stats stats-vertical md:stats-horizontal shadow w-full bg-base-100">
                    <StatCard title="Events" value=s.total_events />
                    <StatCard title="Upcoming" value=s.upcoming_events />
                    <StatCard title="Users" value=s.total_users />
                    <StatCard title="Registrations" value=s.total_registrations />
                    <StatCard title="Checked in" value=s.checked_in />
                </div>

                <div class="grid md:grid-cols-2 gap-6">
                    <Card title="Recent events">
                        <ul class="divide-y">
                            {s.recent_events.into_iter().map(|event| view! {
                                <li class="py-2 flex justify-between">
                                    <Link to=AppRoute::AdminEventDetail(event.id).to_path() class="link link-hover">
                                        {event.name.clone()}
                                    </Link>
                                    <span class="text-sm text-base-content/60">{local_datetime(Some(&event.start_time))}</span>
                                </li>
                            }).collect_view()}
                        </ul>
                    </Card>
                    <Card title="Recent registrations">
                        <ul class="divide-y">
                            {s.recent_registrations.into_iter().map(|reg| view! {
                                <li class="py-2 flex justify-between gap-2">
                                    <span>{format!("{} → {}", reg.user_name(), reg.event_name())}</span>
                                    <StatusBadge status=reg.status.clone() />
                                </li>
                            }).collect_view()}
                        </ul>
                    </Card>
                </div>
            }.into_any(),
        }}
    }
}
