use crate::context::{use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;

/// 导航链接，当前页面高亮
#[component]
fn NavLink(route: AppRoute, #[prop(into)] label: String) -> impl IntoView {
    let router = use_router();
    let path = route.to_path();
    let href = path.clone();
    let active_route = route.clone();
    let class = move || {
        if router.current_route() == active_route {
            "active"
        } else {
            ""
        }
    };

    view! {
        <li>
            <a
                href=href
                class=class
                on:click=move |ev: web_sys::MouseEvent| {
                    ev.prevent_default();
                    router.navigate(&path);
                }
            >
                {label}
            </a>
        </li>
    }
}

#[component]
pub fn Navbar() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let auth = store.auth.0;

    let is_authenticated = move || auth.with(|a| a.is_authenticated);
    let is_admin = move || auth.with(|a| a.is_admin());
    let user_name = move || {
        auth.with(|a| a.user.as_ref().map(|u| u.name.clone()))
            .unwrap_or_default()
    };

    let on_logout = move |_| {
        log::info!("[Auth] logout");
        dispatcher.logout(&store.auth);
    };

    view! {
        <div class="navbar bg-base-100 shadow-md px-4">
            <div class="flex-1 gap-2">
                <Link to="/" class="btn btn-ghost text-xl">"CampusConnect"</Link>
                <ul class="menu menu-horizontal px-1 hidden md:flex">
                    <NavLink route=AppRoute::Events label="Events" />
                    <Show when=is_authenticated>
                        <NavLink route=AppRoute::MyRegistrations label="My Registrations" />
                        <NavLink route=AppRoute::ConfirmAttendance label="Confirm Attendance" />
                    </Show>
                    <Show when=is_admin>
                        <NavLink route=AppRoute::AdminDashboard label="Admin" />
                    </Show>
                </ul>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=is_authenticated
                    fallback=|| view! {
                        <Link to="/login" class="btn btn-ghost btn-sm">"Login"</Link>
                        <Link to="/register" class="btn btn-primary btn-sm">"Register"</Link>
                    }
                >
                    <Link to="/profile" class="btn btn-ghost btn-sm">{user_name}</Link>
                    <button class="btn btn-outline btn-error btn-sm" on:click=on_logout.clone()>
                        "Logout"
                    </button>
                </Show>
            </div>
        </div>
    }
}

/// 管理端子导航
#[component]
pub fn AdminNav() -> impl IntoView {
    view! {
        <ul class="menu menu-horizontal bg-base-100 rounded-box shadow mb-6">
            <NavLink route=AppRoute::AdminDashboard label="Dashboard" />
            <NavLink route=AppRoute::AdminEvents label="Events" />
            <NavLink route=AppRoute::AdminUsers label="Users" />
            <NavLink route=AppRoute::AdminRegistrations label="Registrations" />
            <NavLink route=AppRoute::AdminCheckIn label="Check-in" />
        </ul>
    }
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <Navbar />
            <main class="max-w-6xl mx-auto p-4 md:p-8 space-y-6">{children()}</main>
        </div>
    }
}
