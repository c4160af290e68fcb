use super::{Dispatcher, EventsState, Settled, StateCell, dispatch};
use crate::error::ApiError;
use crate::request::HttpTransport;
use crate::storage::KeyValueStore;
use campusconnect_shared::protocol::{
    CreateEventRequest, DeleteEventRequest, GetEventRequest, ListEventsRequest, UpdateEventRequest,
};
use campusconnect_shared::{Event, EventPayload, Id, Page};

impl<T: HttpTransport, S: KeyValueStore> Dispatcher<T, S> {
    /// 活动列表
    ///
    /// `upcoming` 由服务端过滤，返回什么就展示什么。
    pub async fn get_events<C: StateCell<EventsState>>(
        &self,
        cell: &C,
        query: ListEventsRequest,
    ) -> Settled<Page<Event>> {
        let client = &self.client;
        let page = query.page.max(1);
        let fut = async move {
            let resp = client.call(&query).await?;
            Ok::<_, ApiError>(Page::from_response(resp, page))
        };

        dispatch(cell, &self.lifetime, "events/getEvents", fut, |state, page| {
            state.set_page(page.clone());
        })
        .await
    }

    pub async fn get_event<C: StateCell<EventsState>>(&self, cell: &C, id: Id) -> Settled<Event> {
        let client = &self.client;
        let fut = async move { client.call(&GetEventRequest { id }).await };

        dispatch(cell, &self.lifetime, "events/getEventById", fut, |state, event| {
            state.set_current(event.clone());
        })
        .await
    }

    pub async fn create_event<C: StateCell<EventsState>>(
        &self,
        cell: &C,
        payload: EventPayload,
    ) -> Settled<Event> {
        let client = &self.client;
        let fut = async move { client.call(&CreateEventRequest(payload)).await };

        dispatch(cell, &self.lifetime, "events/createEvent", fut, |state, event| {
            state.upsert(event.clone());
            state.set_current(event.clone());
        })
        .await
    }

    pub async fn update_event<C: StateCell<EventsState>>(
        &self,
        cell: &C,
        id: Id,
        payload: EventPayload,
    ) -> Settled<Event> {
        let client = &self.client;
        let fut = async move { client.call(&UpdateEventRequest { id, payload }).await };

        dispatch(cell, &self.lifetime, "events/updateEvent", fut, |state, event| {
            state.upsert(event.clone());
        })
        .await
    }

    pub async fn delete_event<C: StateCell<EventsState>>(&self, cell: &C, id: Id) -> Settled<()> {
        let client = &self.client;
        let fut = async move { client.call(&DeleteEventRequest { id }).await };

        dispatch(cell, &self.lifetime, "events/deleteEvent", fut, |state, _| {
            state.remove(id);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::TestContext;
    use crate::request::{HttpMethod, HttpResponse};
    use crate::store::{Lifetime, LifetimeToken};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(id: Id, start: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Event {}", id),
            "location": "Hall",
            "start_time": start,
            "end_time": start,
            "is_past": false
        })
    }

    #[tokio::test]
    async fn test_upcoming_list_is_rendered_as_returned() {
        let ctx = TestContext::new();
        // 服务端认为仍是 upcoming 的活动，即使开始时间已经过去也原样保留
        ctx.transport.mock_response(
            HttpMethod::Get,
            &TestContext::url("/events/?page=1&search=&upcoming=true"),
            200,
            json!({
                "count": 12,
                "results": [event(1, "2001-01-01T00:00:00Z"), event(2, "2099-01-01T00:00:00Z")]
            }),
        );
        let cell = Rc::new(RefCell::new(EventsState::default()));
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        let settled = dispatcher
            .get_events(
                &cell,
                ListEventsRequest {
                    upcoming: true,
                    ..Default::default()
                },
            )
            .await;

        assert!(settled.is_fulfilled());
        let state = cell.borrow();
        assert_eq!(
            state.items.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(state.total_pages, 2);
        assert_eq!(state.current_page, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_event_locally() {
        let ctx = TestContext::new();
        ctx.sign_in("a1", Some("r1"));
        ctx.transport.mock_raw(
            HttpMethod::Delete,
            &TestContext::url("/events/7/delete/"),
            HttpResponse::new(204, ""),
        );
        let cell = Rc::new(RefCell::new(EventsState::default()));
        cell.borrow_mut().set_items(vec![
            serde_json::from_value(event(7, "2030-01-01T00:00:00Z")).unwrap(),
            serde_json::from_value(event(8, "2030-01-01T00:00:00Z")).unwrap(),
        ]);
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        assert!(dispatcher.delete_event(&cell, 7).await.is_fulfilled());
        assert_eq!(cell.borrow().items.len(), 1);
        assert!(cell.borrow().find(7).is_none());
    }

    #[tokio::test]
    async fn test_dispatch_after_unmount_sends_nothing() {
        let ctx = TestContext::new();
        let cell = Rc::new(RefCell::new(EventsState::default()));
        let lifetime = Lifetime::new();
        let dispatcher = Dispatcher::new(ctx.client.clone(), lifetime.token());
        lifetime.end();

        let settled = dispatcher.get_event(&cell, 1).await;

        assert_eq!(settled, Settled::Discarded);
        assert!(ctx.transport.requests.borrow().is_empty());
        assert!(!cell.borrow().is_loading);
    }
}
