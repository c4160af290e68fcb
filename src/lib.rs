//! CampusConnect 客户端核心
//!
//! 与平台无关的部分都在这里：请求、会话、状态切片、列表查询、签到解析和路由守卫。
//! 浏览器相关的实现（fetch、localStorage、console）由 `frontend` crate 通过
//! `HttpTransport` / `KeyValueStore` 两个 trait 注入，因此整个核心可以在本机直接测试。

pub use campusconnect_shared as shared;

// =========================================================
// 基础设施层 (Infrastructure)
// =========================================================

pub mod config;
pub mod error;
pub mod request;
pub mod session;
pub mod storage;

// =========================================================
// 业务层 (Domain)
// =========================================================

pub mod checkin;
pub mod client;
pub mod forms;
pub mod guard;
pub mod query;
pub mod store;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind, format_api_error};
pub use request::{HttpRequest, HttpResponse, HttpTransport};
pub use session::{LogoutHandler, LogoutReason, SessionStore};
pub use storage::{KeyValueStore, MemoryStore};
