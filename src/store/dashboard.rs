use super::{Dispatcher, EventsState, RegistrationsState, Settled, StateCell, UsersState};
use crate::query::DashboardStats;
use crate::request::HttpTransport;
use crate::storage::KeyValueStore;
use campusconnect_shared::protocol::{ListAdminRegistrationsRequest, ListEventsRequest};
use chrono::{DateTime, Utc};

impl<T: HttpTransport, S: KeyValueStore> Dispatcher<T, S> {
    /// 管理端首页：三个列表并发加载，全部成功后计算统计
    ///
    /// 任意一个失败返回它的错误文本，三个切片各自保留自己的状态。
    pub async fn load_dashboard<E, U, R>(
        &self,
        events: &E,
        users: &U,
        registrations: &R,
        now: DateTime<Utc>,
    ) -> Settled<DashboardStats>
    where
        E: StateCell<EventsState>,
        U: StateCell<UsersState>,
        R: StateCell<RegistrationsState>,
    {
        let (e, u, r) = futures::join!(
            self.get_events(events, ListEventsRequest::default()),
            self.get_users(users),
            self.get_admin_registrations(registrations, ListAdminRegistrationsRequest::default()),
        );

        let (e, u, r) = match (e, u, r) {
            (Settled::Fulfilled(e), Settled::Fulfilled(u), Settled::Fulfilled(r)) => (e, u, r),
            (Settled::Rejected(msg), _, _)
            | (_, Settled::Rejected(msg), _)
            | (_, _, Settled::Rejected(msg)) => return Settled::Rejected(msg),
            _ => return Settled::Discarded,
        };

        Settled::Fulfilled(DashboardStats::compute(&e.items, &u, &r, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::TestContext;
    use crate::request::HttpMethod;
    use crate::store::LifetimeToken;
    use chrono::TimeZone;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cells() -> (
        Rc<RefCell<EventsState>>,
        Rc<RefCell<UsersState>>,
        Rc<RefCell<RegistrationsState>>,
    ) {
        (
            Rc::new(RefCell::new(EventsState::default())),
            Rc::new(RefCell::new(UsersState::default())),
            Rc::new(RefCell::new(RegistrationsState::default())),
        )
    }

    #[tokio::test]
    async fn test_dashboard_counts_all_three_lists() {
        let ctx = TestContext::new();
        ctx.sign_in("a1", Some("r1"));
        ctx.transport.mock_response(
            HttpMethod::Get,
            &TestContext::url("/events/?page=1&search="),
            200,
            json!({"count": 2, "results": [
                {"id": 1, "name": "A", "start_time": "2020-01-01T00:00:00Z", "end_time": "2020-01-01T01:00:00Z"},
                {"id": 2, "name": "B", "start_time": "2099-01-01T00:00:00Z", "end_time": "2099-01-01T01:00:00Z"}
            ]}),
        );
        ctx.transport.mock_response(
            HttpMethod::Get,
            &TestContext::url("/auth/users/"),
            200,
            json!([{"id": 1, "name": "Ann"}]),
        );
        ctx.transport.mock_response(
            HttpMethod::Get,
            &TestContext::url("/registrations/admin/"),
            200,
            json!([{"id": 3, "status": "checked_in"}, {"id": 4, "status": "registered"}]),
        );
        let (events, users, regs) = cells();
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let stats = dispatcher
            .load_dashboard(&events, &users, &regs, now)
            .await
            .ok()
            .unwrap();

        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.upcoming_events, 1);
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_registrations, 2);
        assert_eq!(stats.checked_in, 1);
    }

    #[tokio::test]
    async fn test_dashboard_reports_first_failure() {
        let ctx = TestContext::new();
        ctx.sign_in("a1", None);
        ctx.transport.mock_response(
            HttpMethod::Get,
            &TestContext::url("/auth/users/"),
            403,
            json!({"detail": "nope"}),
        );
        let (events, users, regs) = cells();
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        let settled = dispatcher
            .load_dashboard(&events, &users, &regs, Utc::now())
            .await;

        // 未 mock 的接口返回 404，先于用户列表的 403 被匹配
        assert_eq!(settled.error(), Some("The requested resource was not found."));
        assert_eq!(
            users.borrow().error.as_deref(),
            Some("You do not have permission to perform this action.")
        );
    }
}
