use super::Lifecycle;
use crate::session::SessionStore;
use crate::storage::KeyValueStore;
use campusconnect_shared::{Event, Id, Page, Registration, User};

/// 有主键的远程资源
pub trait Identified {
    fn id(&self) -> Id;
}

impl Identified for Event {
    fn id(&self) -> Id {
        self.id
    }
}

impl Identified for Registration {
    fn id(&self) -> Id {
        self.id
    }
}

impl Identified for User {
    fn id(&self) -> Id {
        self.id
    }
}

// =========================================================
// 资源切片 (Resource Slice)
// =========================================================

/// 列表 + 详情 + 请求状态
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub items: Vec<T>,
    pub current: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub success: bool,
    pub total_pages: u64,
    pub current_page: u64,
}

pub type EventsState = ResourceState<Event>;
pub type RegistrationsState = ResourceState<Registration>;
pub type UsersState = ResourceState<User>;

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            is_loading: false,
            error: None,
            success: false,
            total_pages: 1,
            current_page: 1,
        }
    }
}

impl<T: Identified + Clone> ResourceState<T> {
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn set_page(&mut self, page: Page<T>) {
        self.items = page.items;
        self.total_pages = page.total_pages.max(1);
        self.current_page = page.current_page;
    }

    pub fn set_current(&mut self, item: T) {
        self.current = Some(item);
    }

    pub fn find(&self, id: Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// 替换同 id 的条目（含详情），不存在则追加到列表
    pub fn upsert(&mut self, item: T) {
        self.replace_current(&item);
        match self.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// 只替换已存在的条目
    pub fn replace(&mut self, item: T) {
        self.replace_current(&item);
        if let Some(existing) = self.items.iter_mut().find(|i| i.id() == item.id()) {
            *existing = item;
        }
    }

    fn replace_current(&mut self, item: &T) {
        if self.current.as_ref().is_some_and(|c| c.id() == item.id()) {
            self.current = Some(item.clone());
        }
    }

    /// 对同 id 的列表条目和详情执行修改
    pub fn modify(&mut self, id: Id, mut f: impl FnMut(&mut T)) {
        self.items.iter_mut().filter(|i| i.id() == id).for_each(&mut f);
        if let Some(current) = self.current.as_mut().filter(|c| c.id() == id) {
            f(current);
        }
    }

    pub fn remove(&mut self, id: Id) {
        self.items.retain(|item| item.id() != id);
        if self.current.as_ref().is_some_and(|c| c.id() == id) {
            self.current = None;
        }
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }
}

impl<T> ResourceState<T> {
    /// 清除提示状态，数据保留
    pub fn reset(&mut self) {
        self.is_loading = false;
        self.error = None;
        self.success = false;
    }
}

impl<T> Lifecycle for ResourceState<T> {
    fn on_pending(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.success = false;
    }

    fn on_fulfilled(&mut self) {
        self.is_loading = false;
        self.success = true;
    }

    fn on_rejected(&mut self, error: String) {
        self.is_loading = false;
        self.error = Some(error);
    }

    fn on_discarded(&mut self) {
        self.is_loading = false;
    }
}

// =========================================================
// 认证切片 (Auth Slice)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    /// 启动时恢复的会话尚未向服务端确认，路由守卫在此期间不做跳转
    pub is_hydrating: bool,
    pub error: Option<String>,
    pub success: bool,
}

impl AuthState {
    /// 启动时从持久化会话恢复；有令牌即视为已登录，并等待资料确认
    pub fn hydrate<S: KeyValueStore>(session: &SessionStore<S>) -> Self {
        let token = session.access_token();
        Self {
            is_authenticated: token.is_some(),
            is_hydrating: token.is_some(),
            user: session.user(),
            token,
            ..Self::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn sign_in(&mut self, user: User, token: String) {
        self.user = Some(user);
        self.token = Some(token);
        self.is_authenticated = true;
    }

    pub fn sign_out(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        self.is_loading = false;
        self.is_hydrating = false;
    }

    pub fn finish_hydration(&mut self) {
        self.is_hydrating = false;
    }

    pub fn reset(&mut self) {
        self.is_loading = false;
        self.error = None;
        self.success = false;
    }
}

impl Lifecycle for AuthState {
    fn on_pending(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.success = false;
    }

    fn on_fulfilled(&mut self) {
        self.is_loading = false;
        self.success = true;
    }

    fn on_rejected(&mut self, error: String) {
        self.is_loading = false;
        self.error = Some(error);
    }

    fn on_discarded(&mut self) {
        self.is_loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKeys;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn user(id: Id, name: &str) -> User {
        serde_json::from_value(json!({"id": id, "name": name})).unwrap()
    }

    #[test]
    fn upsert_replaces_list_entry_and_detail() {
        let mut state = UsersState::default();
        state.set_items(vec![user(1, "A"), user(2, "B")]);
        state.set_current(user(2, "B"));

        state.upsert(user(2, "B2"));
        state.upsert(user(3, "C"));
        state.replace(user(9, "ghost"));

        assert_eq!(state.items.len(), 3);
        assert_eq!(state.find(2).map(|u| u.name.as_str()), Some("B2"));
        assert_eq!(state.current.as_ref().map(|u| u.name.as_str()), Some("B2"));
        assert!(state.find(9).is_none());

        state.remove(2);
        assert!(state.current.is_none());
        assert_eq!(state.items.len(), 2);
    }

    #[test]
    fn hydrate_uses_token_presence() {
        let session = SessionStore::new(MemoryStore::new(), StorageKeys::default());
        assert!(!AuthState::hydrate(&session).is_authenticated);

        session.save("tok", None, &user(1, "Jane"));
        let state = AuthState::hydrate(&session);
        assert!(state.is_authenticated);
        assert_eq!(state.user.map(|u| u.name), Some("Jane".to_string()));
        assert!(!state.is_loading);
        assert!(state.is_hydrating);
    }
}
