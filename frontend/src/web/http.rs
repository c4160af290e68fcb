//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现核心库的 `HttpTransport`，不经过 `gloo-net`。
//! 超时通过 `AbortController` 实现，计时器在请求结束时随 drop 一起取消。

use async_trait::async_trait;
use campusconnect::{ApiError, HttpRequest, HttpResponse, HttpTransport};
use gloo_timers::callback::Timeout;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Headers, Request, RequestInit, Response};

fn js_error(context: &str, e: JsValue) -> ApiError {
    ApiError::Network(format!("{}: {:?}", context, e))
}

/// 基于浏览器 fetch 的传输实现
#[derive(Debug, Clone)]
pub struct FetchTransport {
    timeout: Duration,
}

impl FetchTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_request(req: &HttpRequest, signal: &AbortSignal) -> Result<Request, ApiError> {
        let headers = Headers::new().map_err(|e| js_error("创建 Headers 失败", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| js_error("设置 Header 失败", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(signal));
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts).map_err(|e| js_error("构建请求失败", e))
    }

    async fn fetch(req: &HttpRequest, signal: &AbortSignal) -> Result<HttpResponse, ApiError> {
        let request = Self::build_request(req, signal)?;
        let window =
            web_sys::window().ok_or_else(|| ApiError::Network("无法获取 window 对象".into()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| js_error("网络错误", e))?;
        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| js_error("Response 类型转换失败", e))?;

        let content_type = response.headers().get("content-type").ok().flatten();
        let buffer = response
            .array_buffer()
            .map_err(|e| js_error("读取响应体失败", e))?;
        let buffer = JsFuture::from(buffer)
            .await
            .map_err(|e| js_error("读取响应体失败", e))?;
        let body = js_sys::Uint8Array::new(&buffer).to_vec();

        let mut resp = HttpResponse::new(response.status(), body);
        if let Some(ct) = content_type {
            resp = resp.with_content_type(&ct);
        }
        Ok(resp)
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let controller = AbortController::new().map_err(|e| js_error("创建 AbortController 失败", e))?;
        let signal = controller.signal();

        let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        let timer = Timeout::new(millis, move || controller.abort());

        let result = Self::fetch(&req, &signal).await;
        drop(timer);

        match result {
            Err(_) if signal.aborted() => {
                log::warn!("[Http] {} {} timed out", req.method.as_str(), req.url);
                Err(ApiError::Network(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            other => other,
        }
    }
}
