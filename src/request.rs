use crate::error::ApiError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

pub use campusconnect_shared::protocol::HttpMethod;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// 通用 HTTP 响应结构
///
/// 响应体保留原始字节，二维码图片等二进制内容也走同一通道。
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// 解析 JSON 响应体；空响应体（如 204）按 `null` 处理
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// 非 2xx 响应转换为错误
    pub fn into_error(self) -> ApiError {
        ApiError::Http {
            status: self.status,
            body: self.text(),
        }
    }
}

/// HTTP 传输层特性 (Trait)
///
/// 使用 async_trait 以支持异步调用，(?Send) 是因为浏览器环境下的 Future 不是 Send 的。
/// 只有“没有收到响应”才返回 `Err`，任何状态码都作为 `Ok` 交给上层处理。
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait::async_trait(?Send)]
impl<T: HttpTransport> HttpTransport for std::sync::Arc<T> {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(req).await
    }
}

// =========================================================
// 测试工具: MockTransport
// =========================================================

#[cfg(test)]
pub struct MockTransport {
    // "METHOD URL" -> 排队的响应；只剩最后一个时重复返回它
    responses: RefCell<HashMap<String, VecDeque<HttpResponse>>>,
    // 记录发出的请求
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.mock_raw(method, url, HttpResponse::new(status, body.to_string()));
    }

    pub fn mock_raw(&self, method: HttpMethod, url: &str, response: HttpResponse) {
        self.responses
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(response);
    }

    /// 发往 `url` 的请求
    pub fn requests_to(&self, method: HttpMethod, url: &str) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let key = Self::key(req.method, &req.url);
        self.requests.borrow_mut().push(req);

        let mut responses = self.responses.borrow_mut();
        match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap()),
            Some(queue) if !queue.is_empty() => Ok(queue[0].clone()),
            _ => Ok(HttpResponse::new(404, "Not Found")),
        }
    }
}
