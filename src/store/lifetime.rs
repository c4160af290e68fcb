use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 页面生命周期
///
/// 页面卸载时调用 `end`（或直接 drop），之后返回的异步结果全部丢弃。
#[derive(Debug)]
pub struct Lifetime {
    alive: Arc<AtomicBool>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn token(&self) -> LifetimeToken {
        LifetimeToken {
            alive: Arc::clone(&self.alive),
        }
    }

    pub fn end(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.end();
    }
}

/// 生命周期令牌，随异步请求一起传递
#[derive(Debug, Clone)]
pub struct LifetimeToken {
    alive: Arc<AtomicBool>,
}

impl LifetimeToken {
    /// 不绑定任何页面、永不过期的令牌
    pub fn detached() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_go_stale_when_the_lifetime_ends() {
        let lifetime = Lifetime::new();
        let token = lifetime.token();
        assert!(token.is_alive());
        drop(lifetime);
        assert!(!token.is_alive());
        assert!(LifetimeToken::detached().is_alive());
    }
}
