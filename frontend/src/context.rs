//! 全局状态上下文
//!
//! 四个切片都以 `RwSignal` 存放，通过 Context 在组件间共享：
//! - `Slice`: 让信号可以作为核心库 `dispatch` 的容器
//! - `AppStore`: API 客户端 + 四个切片
//! - `use_dispatcher`: 绑定到当前组件生命周期的动作入口
//!
//! auth 切片的动作（登录、注册、资料）一律走 `AppStore::app_dispatcher`，
//! 会话状态不应随发起页面一起被丢弃。

use crate::web::{FetchTransport, LocalStorage};
use campusconnect::session::LogoutReason;
use campusconnect::store::{
    AuthState, Dispatcher, EventsState, Lifetime, LifetimeToken, RegistrationsState, StateCell,
    UsersState,
};
use campusconnect::{ApiClient, ClientConfig};
use leptos::prelude::*;

pub type Client = ApiClient<FetchTransport, LocalStorage>;
pub type AppDispatcher = Dispatcher<FetchTransport, LocalStorage>;

/// 信号形式的切片
pub struct Slice<S: 'static>(pub RwSignal<S>);

impl<S: 'static> Clone for Slice<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: 'static> Copy for Slice<S> {}

impl<S: Send + Sync + 'static> Slice<S> {
    fn new(value: S) -> Self {
        Self(RwSignal::new(value))
    }
}

impl<S: Send + Sync + 'static> StateCell<S> for Slice<S> {
    fn update(&self, f: impl FnOnce(&mut S)) {
        self.0.update(f);
    }

    fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.0.with_untracked(f)
    }
}

/// 应用级状态
///
/// 客户端放在 `StoredValue` 中，整个结构体可以 `Copy` 进闭包和异步块。
#[derive(Clone, Copy)]
pub struct AppStore {
    pub client: StoredValue<Client>,
    pub auth: Slice<AuthState>,
    pub events: Slice<EventsState>,
    pub registrations: Slice<RegistrationsState>,
    pub users: Slice<UsersState>,
}

impl AppStore {
    /// 创建客户端并从 LocalStorage 恢复会话
    ///
    /// 登出回调只清空 auth 切片，跳转由路由服务监听认证状态完成。
    pub fn new(config: ClientConfig) -> Self {
        let auth = Slice::new(AuthState::default());
        let transport = FetchTransport::new(config.timeout);

        let client = ApiClient::new(config, transport, LocalStorage, move |reason| {
            if reason == LogoutReason::SessionExpired {
                log::warn!("[Auth] session expired, signing out");
            }
            auth.0.update(AuthState::sign_out);
        });

        auth.0.set(AuthState::hydrate(client.session()));

        Self {
            client: StoredValue::new(client),
            auth,
            events: Slice::new(EventsState::default()),
            registrations: Slice::new(RegistrationsState::default()),
            users: Slice::new(UsersState::default()),
        }
    }

    /// 不随页面卸载失效的动作入口，用于应用级任务
    pub fn app_dispatcher(&self) -> AppDispatcher {
        Dispatcher::new(self.client.get_value(), LifetimeToken::detached())
    }
}

pub fn provide_store(config: ClientConfig) -> AppStore {
    let store = AppStore::new(config);
    provide_context(store);
    store
}

/// 从 Context 获取全局状态
pub fn use_store() -> AppStore {
    use_context::<AppStore>().expect("AppStore should be provided")
}

/// 当前组件的生命周期令牌，组件卸载时失效
pub fn use_page_lifetime() -> LifetimeToken {
    let lifetime = Lifetime::new();
    let token = lifetime.token();
    on_cleanup(move || lifetime.end());
    token
}

/// 绑定到当前组件的动作入口
///
/// 组件卸载时生命周期结束，之后到达的响应不会写入切片。
pub fn use_dispatcher() -> AppDispatcher {
    let store = use_store();
    Dispatcher::new(store.client.get_value(), use_page_lifetime())
}
