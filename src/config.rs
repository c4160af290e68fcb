use log::LevelFilter;
use std::time::Duration;

// =========================================================
// 客户端配置 (Client Configuration)
// =========================================================

/// 以下为默认值，构建时未设置对应环境变量则使用这些值
const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORAGE_PREFIX: &str = "campusconnect_";
const DEFAULT_TOKEN_KEY: &str = "token";
const DEFAULT_REFRESH_TOKEN_KEY: &str = "refreshToken";
const DEFAULT_USER_KEY: &str = "user";
const DEFAULT_ALERT_DISMISS_SECS: u64 = 5;
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// 本地存储的键名（不含前缀）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub prefix: String,
    pub token: String,
    pub refresh_token: String,
    pub user: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            token: DEFAULT_TOKEN_KEY.to_string(),
            refresh_token: DEFAULT_REFRESH_TOKEN_KEY.to_string(),
            user: DEFAULT_USER_KEY.to_string(),
        }
    }
}

/// 客户端运行配置
///
/// 负责集中管理 API 地址、超时、存储键名等，实现配置解耦。
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub storage: StorageKeys,
    /// 页面提示的自动关闭时间
    pub alert_dismiss: Duration,
    pub page_size: u64,
    pub log_level: LevelFilter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_vars(None, None)
    }
}

impl ClientConfig {
    /// 从构建时环境变量读取配置
    ///
    /// - `CAMPUSCONNECT_API_URL`: API 根地址
    /// - `CAMPUSCONNECT_LOG_LEVEL`: 日志级别 (`error` / `warn` / `info` / `debug` / `trace` / `off`)
    pub fn from_build_env() -> Self {
        Self::from_vars(
            option_env!("CAMPUSCONNECT_API_URL"),
            option_env!("CAMPUSCONNECT_LOG_LEVEL"),
        )
    }

    fn from_vars(api_url: Option<&str>, log_level: Option<&str>) -> Self {
        Self {
            // 读不到或为空就用默认地址
            api_base_url: api_url
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),

            // 无法解析的级别回退到默认值
            log_level: log_level
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_LOG_LEVEL),

            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage: StorageKeys::default(),
            alert_dismiss: Duration::from_secs(DEFAULT_ALERT_DISMISS_SECS),
            page_size: campusconnect_shared::PAGE_SIZE,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// 拼接完整的请求 URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}
