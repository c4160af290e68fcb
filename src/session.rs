use crate::config::StorageKeys;
use crate::storage::{KeyValueStore, Storage};
use campusconnect_shared::User;

// =========================================================
// 会话存储 (Session Store)
// =========================================================

/// 持久化的登录会话：访问令牌、刷新令牌、用户对象
///
/// 存储失败只记录日志，不影响内存中的登录状态。
pub struct SessionStore<S> {
    storage: Storage<S>,
    keys: StorageKeys,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backend: S, keys: StorageKeys) -> Self {
        Self {
            storage: Storage::new(backend, keys.prefix.clone()),
            keys,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage
            .get_string(&self.keys.token)
            .filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage
            .get_string(&self.keys.refresh_token)
            .filter(|t| !t.is_empty())
    }

    /// 缓存的用户；内容损坏时视为不存在
    pub fn user(&self) -> Option<User> {
        match self.storage.get_json(&self.keys.user) {
            Ok(user) => user,
            Err(e) => {
                log::warn!("[Session] Ignoring cached user: {}", e);
                None
            }
        }
    }

    pub fn set_access_token(&self, token: &str) {
        if let Err(e) = self.storage.set_string(&self.keys.token, token) {
            log::error!("[Session] Failed to persist access token: {}", e);
        }
    }

    /// `None` 表示后端没有下发刷新令牌，删除旧值
    pub fn set_refresh_token(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => self.storage.set_string(&self.keys.refresh_token, token),
            None => self.storage.remove(&self.keys.refresh_token),
        };
        if let Err(e) = result {
            log::error!("[Session] Failed to persist refresh token: {}", e);
        }
    }

    pub fn set_user(&self, user: &User) {
        if let Err(e) = self.storage.set_json(&self.keys.user, user) {
            log::error!("[Session] Failed to persist user: {}", e);
        }
    }

    /// 登录/注册成功后一次性写入
    pub fn save(&self, access: &str, refresh: Option<&str>, user: &User) {
        self.set_user(user);
        self.set_access_token(access);
        self.set_refresh_token(refresh);
    }

    /// 删除三个会话键
    pub fn clear(&self) {
        for key in [&self.keys.user, &self.keys.token, &self.keys.refresh_token] {
            if let Err(e) = self.storage.remove(key) {
                log::error!("[Session] Failed to remove {}: {}", key, e);
            }
        }
    }
}

// =========================================================
// 登出通知 (Logout Handler)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// 用户主动登出
    Explicit,
    /// 令牌刷新失败，被动登出
    SessionExpired,
}

/// 登出回调，在客户端构造时注入
pub trait LogoutHandler: Send + Sync {
    fn on_logout(&self, reason: LogoutReason);
}

impl<F> LogoutHandler for F
where
    F: Fn(LogoutReason) + Send + Sync,
{
    fn on_logout(&self, reason: LogoutReason) {
        self(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use campusconnect_shared::Role;
    use std::sync::Arc;

    fn jane() -> User {
        User {
            id: 1,
            name: "Jane".into(),
            email: "jane@uni.edu".into(),
            phone: None,
            role: Role::Student,
            guest_code: None,
            is_active: true,
            created_at: None,
        }
    }

    #[test]
    fn clear_removes_all_three_keys() {
        let backend = Arc::new(MemoryStore::new());
        let session = SessionStore::new(backend.clone(), StorageKeys::default());
        session.save("a1", Some("r1"), &jane());

        assert_eq!(session.access_token().as_deref(), Some("a1"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
        assert_eq!(session.user().map(|u| u.name), Some("Jane".to_string()));

        session.clear();
        assert!(backend.keys().is_empty());
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn corrupt_user_is_ignored() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("campusconnect_user", "{not json");
        let session = SessionStore::new(backend, StorageKeys::default());
        assert_eq!(session.user(), None);
    }
}
