//! 客户端状态管理
//!
//! 四个切片（auth / events / registrations / users），每个异步动作都经历
//! pending -> fulfilled | rejected 三个阶段：
//! - `StateCell`: 切片的存放方式（测试里是 `Rc<RefCell<_>>`，前端是信号）
//! - `Lifecycle`: 三个阶段对切片的通用修改
//! - `dispatch`: 驱动一次动作，页面卸载后到达的结果直接丢弃
//! - `Dispatcher`: 所有动作的入口，按领域拆分在子模块中

mod aliases;
mod auth;
mod dashboard;
mod events;
mod lifetime;
mod registrations;
mod state;
mod users;

pub use aliases::LegacyActions;
pub use auth::SignedIn;
pub use lifetime::{Lifetime, LifetimeToken};
pub use registrations::QrCodeImage;
pub use state::{
    AuthState, EventsState, Identified, RegistrationsState, ResourceState, UsersState,
};

use crate::client::ApiClient;
use crate::error::{ApiError, format_api_error};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

/// 切片的存放容器
pub trait StateCell<S> {
    fn update(&self, f: impl FnOnce(&mut S));
    fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R;
}

impl<S> StateCell<S> for Rc<RefCell<S>> {
    fn update(&self, f: impl FnOnce(&mut S)) {
        f(&mut self.borrow_mut());
    }

    fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.borrow())
    }
}

/// 请求生命周期对切片的修改
pub trait Lifecycle {
    fn on_pending(&mut self);
    fn on_fulfilled(&mut self);
    fn on_rejected(&mut self, error: String);
    /// 结果被丢弃时撤销 pending 的标记
    fn on_discarded(&mut self);
}

/// 一次动作的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<P> {
    Fulfilled(P),
    /// 已格式化的错误文本
    Rejected(String),
    /// 页面已卸载，结果未写入切片
    Discarded,
}

impl<P> Settled<P> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settled::Fulfilled(_))
    }

    pub fn ok(self) -> Option<P> {
        match self {
            Settled::Fulfilled(p) => Some(p),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Settled::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// 驱动一次异步动作
///
/// 令牌失效时既不写入 fulfilled 也不写入 rejected，只清除 pending 留下的加载标记。
pub async fn dispatch<S, C, P, Fut>(
    cell: &C,
    lifetime: &LifetimeToken,
    action: &str,
    fut: Fut,
    fulfill: impl FnOnce(&mut S, &P),
) -> Settled<P>
where
    S: Lifecycle,
    C: StateCell<S>,
    Fut: Future<Output = Result<P, ApiError>>,
{
    if !lifetime.is_alive() {
        return Settled::Discarded;
    }
    cell.update(|s| s.on_pending());

    let result = fut.await;

    if !lifetime.is_alive() {
        log::debug!("[Store] {}: page gone, result discarded", action);
        cell.update(|s| s.on_discarded());
        return Settled::Discarded;
    }

    match result {
        Ok(payload) => {
            cell.update(|s| {
                fulfill(s, &payload);
                s.on_fulfilled();
            });
            Settled::Fulfilled(payload)
        }
        Err(e) => {
            log::error!("[Store] {} failed: {}", action, e);
            let message = format_api_error(&e);
            cell.update(|s| s.on_rejected(message.clone()));
            Settled::Rejected(message)
        }
    }
}

/// 动作入口：客户端 + 发起页面的生命周期
pub struct Dispatcher<T, S> {
    client: ApiClient<T, S>,
    lifetime: LifetimeToken,
}

impl<T, S> Clone for Dispatcher<T, S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            lifetime: self.lifetime.clone(),
        }
    }
}

impl<T, S> Dispatcher<T, S> {
    pub fn new(client: ApiClient<T, S>, lifetime: LifetimeToken) -> Self {
        Self { client, lifetime }
    }

    pub fn client(&self) -> &ApiClient<T, S> {
        &self.client
    }

    pub fn lifetime(&self) -> &LifetimeToken {
        &self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        value: u32,
        is_loading: bool,
        error: Option<String>,
    }

    impl Lifecycle for Counter {
        fn on_pending(&mut self) {
            self.is_loading = true;
        }
        fn on_fulfilled(&mut self) {
            self.is_loading = false;
        }
        fn on_rejected(&mut self, error: String) {
            self.is_loading = false;
            self.error = Some(error);
        }
        fn on_discarded(&mut self) {
            self.is_loading = false;
        }
    }

    #[tokio::test]
    async fn stale_results_are_discarded() {
        let cell = Rc::new(RefCell::new(Counter::default()));
        let lifetime = Lifetime::new();
        let token = lifetime.token();

        let fut = async {
            lifetime.end();
            Ok::<u32, ApiError>(5)
        };
        let settled = dispatch(&cell, &token, "count", fut, |s: &mut Counter, p| s.value = *p).await;

        assert_eq!(settled, Settled::Discarded);
        assert_eq!(cell.borrow().value, 0);
        assert!(cell.borrow().error.is_none());
        assert!(!cell.borrow().is_loading);
    }

    #[tokio::test]
    async fn rejection_stores_the_display_message() {
        let cell = Rc::new(RefCell::new(Counter::default()));
        let token = LifetimeToken::detached();

        let fut = async { Err::<u32, _>(ApiError::Network("offline".into())) };
        let settled = dispatch(&cell, &token, "count", fut, |s: &mut Counter, p| s.value = *p).await;

        assert_eq!(
            settled.error(),
            Some("Network error. Please check your connection.")
        );
        assert!(!cell.borrow().is_loading);
        assert_eq!(
            cell.borrow().error.as_deref(),
            Some("Network error. Please check your connection.")
        );
    }
}
