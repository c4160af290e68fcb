//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程，验证规则来自 `campusconnect::guard`。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;
use crate::components::ui::Loading;
use campusconnect::guard::{self, GuardDecision, LOGIN_PATH};
use campusconnect::store::AuthState;

/// 获取当前浏览器路径（含查询串）
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| {
            let location = w.location();
            let path = location.pathname().ok()?;
            let search = location.search().unwrap_or_default();
            Some(format!("{}{}", path, search))
        })
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 当前位置：解析后的路由和原始路径
#[derive(Debug, Clone, PartialEq)]
struct Location {
    route: AppRoute,
    path: String,
}

impl Location {
    fn parse(path: &str) -> Self {
        Self {
            route: AppRoute::from_path(path),
            path: path.to_string(),
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证状态信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    location: RwSignal<Location>,
    /// 登录前被拦下的路径，登录后回到这里
    return_to: RwSignal<Option<String>>,
    /// 认证状态（注入的信号，实现解耦）
    auth: Signal<AuthState>,
}

impl RouterService {
    fn new(auth: Signal<AuthState>) -> Self {
        Self {
            location: RwSignal::new(Location::parse(&current_path())),
            return_to: RwSignal::new(None),
            auth,
        }
    }

    /// 当前路由（响应式）
    pub fn current_route(&self) -> AppRoute {
        self.location.with(|l| l.route.clone())
    }

    /// 当前路径（响应式）
    pub fn current_path(&self) -> String {
        self.location.with(|l| l.path.clone())
    }

    /// 导航到站内路径，守卫在 `setup_guard` 中统一执行
    pub fn navigate(&self, path: &str) {
        if self.location.with_untracked(|l| l.path == path) {
            return;
        }
        push_history_state(path);
        self.location.set(Location::parse(path));
    }

    pub fn navigate_to(&self, route: &AppRoute) {
        self.navigate(&route.to_path());
    }

    fn redirect(&self, path: &str) {
        replace_history_state(path);
        self.location.set(Location::parse(path));
    }

    fn decision(&self, auth: &AuthState, location: &Location) -> GuardDecision {
        self.return_to.with_untracked(|return_to| {
            guard::decide(
                location.route.access(),
                auth,
                &location.path,
                return_to.as_deref(),
            )
        })
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let location = self.location;

        let closure = Closure::<dyn Fn()>::new(move || {
            location.set(Location::parse(&current_path()));
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 位置或认证状态变化时执行守卫并重定向
    fn setup_guard(&self) {
        let router = *self;

        Effect::new(move |_| {
            let auth = router.auth.get();
            let location = router.location.get();

            match router.decision(&auth, &location) {
                GuardDecision::Allow | GuardDecision::Loading => {}
                GuardDecision::RedirectToLogin { from } => {
                    log::info!("[Router] {} requires login, redirecting", from);
                    router.return_to.set(Some(from));
                    router.redirect(LOGIN_PATH);
                }
                GuardDecision::Redirect(target) => {
                    log::info!("[Router] {} not allowed here, redirecting to {}", location.path, target);
                    router.return_to.set(None);
                    router.redirect(&target);
                }
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(auth: Signal<AuthState>) -> RouterService {
    let router = RouterService::new(auth);

    router.init_popstate_listener();
    router.setup_guard();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    auth: Signal<AuthState>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(auth);

    children()
}

/// 路由出口组件
///
/// 守卫允许时渲染对应页面；认证状态未定或即将重定向时显示占位。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    // 只在路由或放行结果变化时重建页面，认证状态的其他字段变化不触发重新挂载
    let resolved = Memo::new(move |_| {
        let auth = router.auth.get();
        let location = router.location.get();
        match router.decision(&auth, &location) {
            GuardDecision::Allow => Some(location.route),
            _ => None,
        }
    });

    move || match resolved.get() {
        Some(route) => matcher(route),
        None => view! { <Loading /> }.into_any(),
    }
}

/// 站内链接，点击时走路由服务而不是整页刷新
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    #[prop(optional, into)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
