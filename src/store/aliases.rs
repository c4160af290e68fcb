//! 旧动作名
//!
//! 早期页面使用 `fetch*` 命名，这里只做转发，行为与新名完全一致。

use super::{Dispatcher, EventsState, RegistrationsState, Settled, StateCell, UsersState};
use crate::request::HttpTransport;
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use campusconnect_shared::protocol::{ListAdminRegistrationsRequest, ListEventsRequest};
use campusconnect_shared::{Event, Id, Page, Registration, User};

#[async_trait(?Send)]
pub trait LegacyActions {
    async fn fetch_events<C: StateCell<EventsState>>(
        &self,
        cell: &C,
        query: ListEventsRequest,
    ) -> Settled<Page<Event>>;

    async fn fetch_event_by_id<C: StateCell<EventsState>>(&self, cell: &C, id: Id)
    -> Settled<Event>;

    async fn fetch_user_registrations<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
    ) -> Settled<Vec<Registration>>;

    async fn fetch_registrations<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        filter: ListAdminRegistrationsRequest,
    ) -> Settled<Vec<Registration>>;

    async fn fetch_users<C: StateCell<UsersState>>(&self, cell: &C) -> Settled<Vec<User>>;

    async fn fetch_user_by_id<C: StateCell<UsersState>>(&self, cell: &C, id: Id) -> Settled<User>;
}

#[async_trait(?Send)]
impl<T: HttpTransport, S: KeyValueStore> LegacyActions for Dispatcher<T, S> {
    async fn fetch_events<C: StateCell<EventsState>>(
        &self,
        cell: &C,
        query: ListEventsRequest,
    ) -> Settled<Page<Event>> {
        self.get_events(cell, query).await
    }

    async fn fetch_event_by_id<C: StateCell<EventsState>>(
        &self,
        cell: &C,
        id: Id,
    ) -> Settled<Event> {
        self.get_event(cell, id).await
    }

    async fn fetch_user_registrations<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
    ) -> Settled<Vec<Registration>> {
        self.get_my_registrations(cell).await
    }

    async fn fetch_registrations<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        filter: ListAdminRegistrationsRequest,
    ) -> Settled<Vec<Registration>> {
        self.get_admin_registrations(cell, filter).await
    }

    async fn fetch_users<C: StateCell<UsersState>>(&self, cell: &C) -> Settled<Vec<User>> {
        self.get_users(cell).await
    }

    async fn fetch_user_by_id<C: StateCell<UsersState>>(&self, cell: &C, id: Id) -> Settled<User> {
        self.get_user(cell, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::TestContext;
    use crate::request::HttpMethod;
    use crate::store::LifetimeToken;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[tokio::test]
    async fn test_legacy_names_hit_the_same_endpoints() {
        let ctx = TestContext::new();
        ctx.sign_in("a1", Some("r1"));
        ctx.transport.mock_response(
            HttpMethod::Get,
            &TestContext::url("/auth/users/"),
            200,
            json!([{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bo"}]),
        );
        let cell = Rc::new(RefCell::new(UsersState::default()));
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        let settled = dispatcher.fetch_users(&cell).await;

        assert!(settled.is_fulfilled());
        assert_eq!(cell.borrow().items.len(), 2);
        assert_eq!(
            ctx.transport
                .requests_to(HttpMethod::Get, &TestContext::url("/auth/users/"))
                .len(),
            1
        );
    }
}
