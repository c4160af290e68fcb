//! API 客户端
//!
//! 负责附加 Bearer 令牌，遇到 401 时刷新一次令牌并重放原请求。

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::request::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::session::{LogoutHandler, LogoutReason, SessionStore};
use crate::storage::KeyValueStore;
use campusconnect_shared::RefreshResponse;
use campusconnect_shared::protocol::{ApiRequest, REFRESH_PATH, RefreshRequest};
use std::sync::Arc;

/// 每个逻辑请求最多刷新一次令牌
const MAX_REFRESH_ATTEMPTS: u32 = 1;

#[derive(Debug, thiserror::Error)]
enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected with HTTP {0}")]
    Rejected(u16),
    #[error("refresh response carried no access token")]
    MissingAccess,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 请求使用的凭据
enum Credentials<'a> {
    /// 会话中的令牌，401 时参与刷新流程
    Session,
    /// 显式指定的令牌，不参与刷新
    Bearer(&'a str),
}

struct ClientInner<T, S> {
    config: ClientConfig,
    transport: T,
    session: SessionStore<S>,
    on_logout: Box<dyn LogoutHandler>,
}

/// API 客户端，克隆开销很小（内部共享）
pub struct ApiClient<T, S> {
    inner: Arc<ClientInner<T, S>>,
}

impl<T, S> Clone for ApiClient<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: HttpTransport, S: KeyValueStore> ApiClient<T, S> {
    pub fn new(
        config: ClientConfig,
        transport: T,
        store: S,
        on_logout: impl LogoutHandler + 'static,
    ) -> Self {
        let session = SessionStore::new(store, config.storage.clone());
        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                session,
                on_logout: Box::new(on_logout),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.inner.session
    }

    /// 发送类型化请求并解析响应
    pub async fn call<R: ApiRequest>(&self, req: &R) -> Result<R::Response, ApiError> {
        let body = encode_body(req)?;
        self.fetch(R::METHOD, &req.path(), body).await?.json()
    }

    /// 使用指定令牌发送请求（登录后尚未写入会话时获取资料）
    pub async fn call_with_token<R: ApiRequest>(
        &self,
        req: &R,
        token: &str,
    ) -> Result<R::Response, ApiError> {
        let body = encode_body(req)?;
        self.send(R::METHOD, &req.path(), body, Credentials::Bearer(token))
            .await?
            .json()
    }

    /// 发送原始请求，返回 2xx 响应
    ///
    /// 1. 附加会话中的访问令牌（没有令牌就不带 Authorization 头）
    /// 2. 带令牌的请求收到 401 时刷新一次并重放
    /// 3. 刷新失败则强制登出，返回原始的 401 错误
    pub async fn fetch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpResponse, ApiError> {
        self.send(method, path, body, Credentials::Session).await
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        credentials: Credentials<'_>,
    ) -> Result<HttpResponse, ApiError> {
        let url = self.inner.config.url(path);
        let mut refresh_attempts = 0;

        loop {
            let token = match &credentials {
                Credentials::Session => self.session().access_token(),
                Credentials::Bearer(token) => Some(token.to_string()),
            };

            let mut req = HttpRequest::new(&url, method).with_header("Accept", "application/json");
            if let Some(body) = &body {
                req = req
                    .with_header("Content-Type", "application/json")
                    .with_body(body.clone());
            }
            if let Some(token) = &token {
                req = req.with_header("Authorization", &format!("Bearer {}", token));
            }

            log::debug!("[Api] {} {}", method.as_str(), url);
            let resp = self.inner.transport.send(req).await?;

            if resp.is_success() {
                return Ok(resp);
            }

            let can_refresh = resp.status == 401
                && token.is_some()
                && matches!(credentials, Credentials::Session)
                && refresh_attempts < MAX_REFRESH_ATTEMPTS;

            if !can_refresh {
                log::debug!("[Api] {} {} -> {}", method.as_str(), url, resp.status);
                return Err(resp.into_error());
            }

            refresh_attempts += 1;
            match self.refresh().await {
                Ok(()) => {
                    log::info!("[Api] Access token refreshed, replaying {}", path);
                }
                Err(e) => {
                    log::warn!("[Api] Token refresh failed: {}. Logging out.", e);
                    self.logout(LogoutReason::SessionExpired);
                    return Err(resp.into_error());
                }
            }
        }
    }

    /// 用刷新令牌换取新的访问令牌
    ///
    /// 直接走传输层，不经过 `send`，避免递归刷新。
    async fn refresh(&self) -> Result<(), RefreshError> {
        let refresh = self
            .session()
            .refresh_token()
            .ok_or(RefreshError::MissingRefreshToken)?;

        let body = encode_body(&RefreshRequest { refresh })?.unwrap_or_default();
        let req = HttpRequest::new(&self.inner.config.url(REFRESH_PATH), HttpMethod::Post)
            .with_header("Content-Type", "application/json")
            .with_body(body);

        let resp = self.inner.transport.send(req).await?;
        if !resp.is_success() {
            return Err(RefreshError::Rejected(resp.status));
        }

        let tokens: RefreshResponse = resp.json()?;
        let access = tokens
            .access
            .filter(|a| !a.is_empty())
            .ok_or(RefreshError::MissingAccess)?;

        self.session().set_access_token(&access);
        // 后端开启轮换时会下发新的刷新令牌
        if let Some(rotated) = tokens.refresh.as_deref().filter(|r| !r.is_empty()) {
            self.session().set_refresh_token(Some(rotated));
        }
        Ok(())
    }

    /// 清除会话并通知登出回调
    pub fn logout(&self, reason: LogoutReason) {
        self.session().clear();
        self.inner.on_logout.on_logout(reason);
    }
}

fn encode_body<R: ApiRequest>(req: &R) -> Result<Option<String>, ApiError> {
    if !R::METHOD.has_body() {
        return Ok(None);
    }
    serde_json::to_string(req)
        .map(Some)
        .map_err(|e| ApiError::Encode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::request::MockTransport;
    use crate::storage::MemoryStore;
    use campusconnect_shared::protocol::{GetEventRequest, GetProfileRequest, LoginRequest};
    use serde_json::json;
    use std::sync::Mutex;

    pub const BASE: &str = "http://api";

    pub type TestClient = ApiClient<Arc<MockTransport>, Arc<MemoryStore>>;

    /// 测试上下文：客户端 + 可检查的传输层/存储/登出记录
    pub struct TestContext {
        pub client: TestClient,
        pub transport: Arc<MockTransport>,
        pub store: Arc<MemoryStore>,
        pub logouts: Arc<Mutex<Vec<LogoutReason>>>,
    }

    impl TestContext {
        pub fn new() -> Self {
            let transport = Arc::new(MockTransport::new());
            let store = Arc::new(MemoryStore::new());
            let logouts = Arc::new(Mutex::new(Vec::new()));
            let recorded = logouts.clone();
            let client = ApiClient::new(
                ClientConfig::default().with_base_url(BASE),
                transport.clone(),
                store.clone(),
                move |reason| recorded.lock().unwrap().push(reason),
            );
            Self {
                client,
                transport,
                store,
                logouts,
            }
        }

        pub fn url(path: &str) -> String {
            format!("{}{}", BASE, path)
        }

        pub fn sign_in(&self, access: &str, refresh: Option<&str>) {
            self.client.session().set_access_token(access);
            self.client.session().set_refresh_token(refresh);
        }
    }

    fn event_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Open Day",
            "location": "Main Hall",
            "start_time": "2030-01-01T10:00:00Z",
            "end_time": "2030-01-01T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_refresh_then_replay_once() {
        let ctx = TestContext::new();
        ctx.sign_in("old", Some("r1"));
        let url = TestContext::url("/events/3/");
        ctx.transport.mock_response(HttpMethod::Get, &url, 401, json!({"detail": "expired"}));
        ctx.transport.mock_response(HttpMethod::Get, &url, 200, event_json(3));
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/auth/refresh/"),
            200,
            json!({"access": "new"}),
        );

        let event = ctx.client.call(&GetEventRequest { id: 3 }).await.unwrap();

        assert_eq!(event.id, 3);
        let calls = ctx.transport.requests_to(HttpMethod::Get, &url);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].header("Authorization"), Some("Bearer old"));
        assert_eq!(calls[1].header("Authorization"), Some("Bearer new"));
        let refresh = ctx.transport.requests_to(HttpMethod::Post, &TestContext::url("/auth/refresh/"));
        assert_eq!(refresh.len(), 1);
        assert_eq!(refresh[0].header("Authorization"), None);
        assert_eq!(refresh[0].body.as_deref(), Some(r#"{"refresh":"r1"}"#));
        assert_eq!(ctx.client.session().access_token().as_deref(), Some("new"));
        assert!(ctx.logouts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_401_does_not_refresh_again() {
        let ctx = TestContext::new();
        ctx.sign_in("old", Some("r1"));
        let url = TestContext::url("/events/3/");
        ctx.transport.mock_response(HttpMethod::Get, &url, 401, json!({}));
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/auth/refresh/"),
            200,
            json!({"access": "new", "refresh": "r2"}),
        );

        let err = ctx.client.call(&GetEventRequest { id: 3 }).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(ctx.transport.requests_to(HttpMethod::Get, &url).len(), 2);
        assert_eq!(
            ctx.transport
                .requests_to(HttpMethod::Post, &TestContext::url("/auth/refresh/"))
                .len(),
            1
        );
        // 刷新成功后仍然 401 不会强制登出，轮换的刷新令牌已保存
        assert_eq!(ctx.client.session().refresh_token().as_deref(), Some("r2"));
        assert!(ctx.logouts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_forces_logout() {
        let ctx = TestContext::new();
        ctx.sign_in("old", Some("r1"));
        ctx.client.session().set_user(&serde_json::from_value(json!({"id": 1, "name": "Jane"})).unwrap());
        let url = TestContext::url("/auth/profile/");
        ctx.transport.mock_response(HttpMethod::Get, &url, 401, json!({"detail": "expired"}));
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/auth/refresh/"),
            401,
            json!({"detail": "Token is invalid"}),
        );

        let err = ctx.client.call(&GetProfileRequest).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(ctx.store.keys().is_empty());
        assert_eq!(*ctx.logouts.lock().unwrap(), vec![LogoutReason::SessionExpired]);

        // 之后的请求不再携带 Authorization
        let _ = ctx.client.call(&GetEventRequest { id: 1 }).await;
        let later = ctx.transport.requests_to(HttpMethod::Get, &TestContext::url("/events/1/"));
        assert_eq!(later[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_or_access_logs_out() {
        let ctx = TestContext::new();
        ctx.sign_in("old", None);
        let url = TestContext::url("/events/3/");
        ctx.transport.mock_response(HttpMethod::Get, &url, 401, json!({}));

        assert!(ctx.client.call(&GetEventRequest { id: 3 }).await.is_err());
        assert_eq!(ctx.logouts.lock().unwrap().len(), 1);
        assert!(
            ctx.transport
                .requests_to(HttpMethod::Post, &TestContext::url("/auth/refresh/"))
                .is_empty()
        );

        let ctx = TestContext::new();
        ctx.sign_in("old", Some("r1"));
        ctx.transport.mock_response(HttpMethod::Get, &url, 401, json!({}));
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/auth/refresh/"),
            200,
            json!({}),
        );
        assert!(ctx.client.call(&GetEventRequest { id: 3 }).await.is_err());
        assert_eq!(ctx.logouts.lock().unwrap().len(), 1);
        assert_eq!(ctx.transport.requests_to(HttpMethod::Get, &url).len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_401_is_not_refreshed() {
        let ctx = TestContext::new();
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/auth/token/"),
            401,
            json!({"detail": "No active account found with the given credentials"}),
        );

        let err = ctx
            .client
            .call(&LoginRequest {
                email: "jane@uni.edu".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(ctx.logouts.lock().unwrap().is_empty());
        assert_eq!(ctx.transport.requests.borrow().len(), 1);
    }
}
