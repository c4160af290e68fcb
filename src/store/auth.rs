use super::{AuthState, Dispatcher, Settled, StateCell, dispatch};
use crate::error::ApiError;
use crate::request::HttpTransport;
use crate::session::LogoutReason;
use crate::storage::KeyValueStore;
use campusconnect_shared::protocol::{GetProfileRequest, LoginRequest, RegisterRequest};
use campusconnect_shared::{ProfileUpdate, User};

/// 登录/注册成功后的会话
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub user: User,
    pub access: String,
    pub refresh: Option<String>,
}

impl<T: HttpTransport, S: KeyValueStore> Dispatcher<T, S> {
    /// 登录：换取令牌 -> 用新令牌获取资料 -> 持久化
    pub async fn login<C: StateCell<AuthState>>(
        &self,
        cell: &C,
        email: &str,
        password: &str,
    ) -> Settled<SignedIn> {
        let client = &self.client;
        let req = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let fut = async move {
            let tokens = client.call(&req).await?;
            let user = client
                .call_with_token(&GetProfileRequest, &tokens.access)
                .await?;
            Ok::<_, ApiError>(SignedIn {
                user,
                access: tokens.access,
                refresh: tokens.refresh,
            })
        };

        dispatch(cell, &self.lifetime, "auth/login", fut, |state, signed| {
            self.persist(signed);
            state.sign_in(signed.user.clone(), signed.access.clone());
        })
        .await
    }

    /// 注册账号，成功即登录
    pub async fn register<C: StateCell<AuthState>>(
        &self,
        cell: &C,
        req: RegisterRequest,
    ) -> Settled<SignedIn> {
        let client = &self.client;
        let fut = async move {
            let resp = client.call(&req).await?;
            Ok::<_, ApiError>(SignedIn {
                user: resp.user,
                access: resp.access,
                refresh: resp.refresh,
            })
        };

        dispatch(cell, &self.lifetime, "auth/register", fut, |state, signed| {
            self.persist(signed);
            state.sign_in(signed.user.clone(), signed.access.clone());
        })
        .await
    }

    fn persist(&self, signed: &SignedIn) {
        self.client
            .session()
            .save(&signed.access, signed.refresh.as_deref(), &signed.user);
    }

    /// 主动登出
    pub fn logout<C: StateCell<AuthState>>(&self, cell: &C) {
        self.client.logout(LogoutReason::Explicit);
        cell.update(AuthState::sign_out);
    }

    /// 刷新缓存的用户资料
    pub async fn fetch_profile<C: StateCell<AuthState>>(&self, cell: &C) -> Settled<User> {
        let client = &self.client;
        let fut = async move { client.call(&GetProfileRequest).await };

        dispatch(cell, &self.lifetime, "auth/fetchProfile", fut, |state, user| {
            self.client.session().set_user(user);
            state.user = Some(user.clone());
        })
        .await
    }

    /// 启动时确认恢复的会话
    ///
    /// 无论资料请求结果如何都结束 hydration，令牌失效时登出回调已清空切片。
    pub async fn resolve_session<C: StateCell<AuthState>>(&self, cell: &C) -> Settled<User> {
        let settled = self.fetch_profile(cell).await;
        cell.update(AuthState::finish_hydration);
        settled
    }

    pub async fn update_profile<C: StateCell<AuthState>>(
        &self,
        cell: &C,
        update: ProfileUpdate,
    ) -> Settled<User> {
        let client = &self.client;
        let fut = async move { client.call(&update).await };

        dispatch(cell, &self.lifetime, "auth/updateProfile", fut, |state, user| {
            self.client.session().set_user(user);
            state.user = Some(user.clone());
        })
        .await
    }
}
