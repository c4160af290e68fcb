//! CampusConnect 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `context`: API 客户端与四个状态切片
//! - `components`: UI 组件层
//!
//! 请求、校验、筛选排序等业务逻辑都在 `campusconnect` 核心库中，这里只负责渲染。

mod components {
    pub mod admin;
    pub mod attendance;
    pub mod events;
    pub mod home;
    pub mod layout;
    pub mod login;
    pub mod my_registrations;
    pub mod profile;
    pub mod qr_code;
    pub mod register;
    pub mod ui;
}
mod context;

use crate::components::admin::attendees::AdminEventAttendeesPage;
use crate::components::admin::check_in::AdminCheckInPage;
use crate::components::admin::dashboard::AdminDashboardPage;
use crate::components::admin::event_form::AdminEventFormPage;
use crate::components::admin::events::{AdminEventDetailPage, AdminEventsPage};
use crate::components::admin::registrations::AdminRegistrationsPage;
use crate::components::admin::users::{AdminUserDetailPage, AdminUsersPage};
use crate::components::attendance::ConfirmAttendancePage;
use crate::components::events::{EventDetailPage, EventListPage};
use crate::components::home::HomePage;
use crate::components::layout::Layout;
use crate::components::login::LoginPage;
use crate::components::my_registrations::MyRegistrationsPage;
use crate::components::profile::ProfilePage;
use crate::components::qr_code::QrCodePage;
use crate::components::register::RegisterPage;
use crate::context::provide_store;

use campusconnect::ClientConfig;
use leptos::prelude::*;
use leptos::task::spawn_local;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装（fetch、localStorage、History、定时器、console），
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod logger;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    pub use http::FetchTransport;
    pub use storage::LocalStorage;
    pub use timer::Interval;
}

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 初始化日志，应在挂载前调用
pub fn init_logging(config: &ClientConfig) {
    web::logger::init(config.log_level);
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Events => view! { <EventListPage /> }.into_any(),
        AppRoute::EventDetail(id) => view! { <EventDetailPage id=id /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::MyRegistrations => view! { <MyRegistrationsPage /> }.into_any(),
        AppRoute::RegistrationQrCode(id) => view! { <QrCodePage id=id /> }.into_any(),
        AppRoute::ConfirmAttendance => view! { <ConfirmAttendancePage /> }.into_any(),
        AppRoute::AdminDashboard => view! { <AdminDashboardPage /> }.into_any(),
        AppRoute::AdminEvents => view! { <AdminEventsPage /> }.into_any(),
        AppRoute::AdminEventNew => view! { <AdminEventFormPage /> }.into_any(),
        AppRoute::AdminEventDetail(id) => view! { <AdminEventDetailPage id=id /> }.into_any(),
        AppRoute::AdminEventEdit(id) => view! { <AdminEventFormPage id=id /> }.into_any(),
        AppRoute::AdminEventAttendees(id) => view! { <AdminEventAttendeesPage id=id /> }.into_any(),
        AppRoute::AdminUsers => view! { <AdminUsersPage /> }.into_any(),
        AppRoute::AdminUserDetail(id) => view! { <AdminUserDetailPage id=id /> }.into_any(),
        AppRoute::AdminRegistrations => view! { <AdminRegistrationsPage /> }.into_any(),
        AppRoute::AdminCheckIn => view! { <AdminCheckInPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="text-center py-16">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <Link to="/" class="btn btn-primary mt-6">"Back to home"</Link>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建 API 客户端与状态切片，从 LocalStorage 恢复会话
    let store = provide_store(ClientConfig::from_build_env());

    // 2. 已登录时向服务端确认会话，确认完成前守卫显示加载占位
    if store.auth.0.with_untracked(|a| a.is_hydrating) {
        let dispatcher = store.app_dispatcher();
        spawn_local(async move {
            if let Some(err) = dispatcher.resolve_session(&store.auth).await.error() {
                log::warn!("[Auth] failed to refresh profile: {}", err);
            }
        });
    }

    // 3. 认证状态以只读信号注入路由服务
    let auth = Signal::from(store.auth.0.read_only());

    view! {
        <Router auth=auth>
            <Layout>
                <RouterOutlet matcher=route_matcher />
            </Layout>
        </Router>
    }
}
