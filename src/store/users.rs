use super::{Dispatcher, Settled, StateCell, UsersState, dispatch};
use crate::error::ApiError;
use crate::request::HttpTransport;
use crate::storage::KeyValueStore;
use campusconnect_shared::protocol::{
    DeleteUserRequest, GetUserRequest, ListUsersRequest, UpdateUserRequest,
};
use campusconnect_shared::{Id, Role, User, UserChanges};

impl<T: HttpTransport, S: KeyValueStore> Dispatcher<T, S> {
    pub async fn get_users<C: StateCell<UsersState>>(&self, cell: &C) -> Settled<Vec<User>> {
        let client = &self.client;
        let fut = async move { Ok::<_, ApiError>(client.call(&ListUsersRequest).await?.into_items()) };

        dispatch(cell, &self.lifetime, "users/getUsers", fut, |state, users| {
            state.set_items(users.clone());
        })
        .await
    }

    pub async fn get_user<C: StateCell<UsersState>>(&self, cell: &C, id: Id) -> Settled<User> {
        let client = &self.client;
        let fut = async move { client.call(&GetUserRequest { id }).await };

        dispatch(cell, &self.lifetime, "users/getUserById", fut, |state, user| {
            state.set_current(user.clone());
        })
        .await
    }

    pub async fn update_user<C: StateCell<UsersState>>(
        &self,
        cell: &C,
        id: Id,
        changes: UserChanges,
    ) -> Settled<User> {
        let client = &self.client;
        let fut = async move { client.call(&UpdateUserRequest { id, changes }).await };

        dispatch(cell, &self.lifetime, "users/updateUser", fut, |state, user| {
            state.upsert(user.clone());
        })
        .await
    }

    /// 启用/停用账号
    pub async fn toggle_user_active<C: StateCell<UsersState>>(
        &self,
        cell: &C,
        user: &User,
    ) -> Settled<User> {
        let changes = UserChanges {
            is_active: Some(!user.is_active),
            ..Default::default()
        };
        self.update_user(cell, user.id, changes).await
    }

    /// 授予/撤销管理员，撤销后回到学生角色
    pub async fn toggle_user_admin<C: StateCell<UsersState>>(
        &self,
        cell: &C,
        user: &User,
    ) -> Settled<User> {
        let role = if user.is_admin() {
            Role::Student
        } else {
            Role::Admin
        };
        let changes = UserChanges {
            role: Some(role),
            ..Default::default()
        };
        self.update_user(cell, user.id, changes).await
    }

    pub async fn delete_user<C: StateCell<UsersState>>(&self, cell: &C, id: Id) -> Settled<()> {
        let client = &self.client;
        let fut = async move { client.call(&DeleteUserRequest { id }).await };

        dispatch(cell, &self.lifetime, "users/deleteUser", fut, |state, _| {
            state.remove(id);
        })
        .await
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
    async fn test_toggle_admin_sends_only_the_role() {
        let ctx = TestContext::new();
        ctx.sign_in("a1", Some("r1"));
        let url = TestContext::url("/auth/users/2/");
        ctx.transport.mock_response(
            HttpMethod::Put,
            &url,
            200,
            json!({"id": 2, "name": "Sam", "role": "admin"}),
        );
        let cell = Rc::new(RefCell::new(UsersState::default()));
        let sam: User = serde_json::from_value(json!({"id": 2, "name": "Sam"})).unwrap();
        cell.borrow_mut().set_items(vec![sam.clone()]);
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        let settled = dispatcher.toggle_user_admin(&cell, &sam).await;

        assert!(settled.is_fulfilled());
        let sent = ctx.transport.requests_to(HttpMethod::Put, &url);
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"role":"admin"}"#));
        assert!(cell.borrow().find(2).unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_toggle_active_flips_flag() {
        let ctx = TestContext::new();
        ctx.sign_in("a1", Some("r1"));
        let url = TestContext::url("/auth/users/3/");
        ctx.transport.mock_response(
            HttpMethod::Put,
            &url,
            200,
            json!({"id": 3, "name": "Kim", "is_active": false}),
        );
        let cell = Rc::new(RefCell::new(UsersState::default()));
        let kim: User = serde_json::from_value(json!({"id": 3, "name": "Kim"})).unwrap();
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        dispatcher.toggle_user_active(&cell, &kim).await;

        let sent = ctx.transport.requests_to(HttpMethod::Put, &url);
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"is_active":false}"#));
        assert!(!cell.borrow().find(3).unwrap().is_active);
    }
}
