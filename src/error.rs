use serde_json::Value;

// =========================================================
// 错误分类 (Error Kind)
// =========================================================

/// 错误分类
/// 包含错误对应的语义（状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 没有收到响应（断网、超时、CORS）
    Network,
    /// 400: 表单或参数校验失败
    InvalidInput,
    /// 401: 未登录或令牌失效
    Unauthorized,
    /// 403: 无权限
    Forbidden,
    /// 404: 资源未找到
    NotFound,
    /// 409: 资源冲突 (如重复签到)
    Conflict,
    /// 其余 4xx
    Client,
    /// 5xx
    Server,
    /// 本地 JSON 编解码失败
    Serialization,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::InvalidInput,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::Conflict => "RESOURCE_CONFLICT",
            ErrorKind::Client => "CLIENT_ERROR",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Serialization => "JSON_PARSE_ERROR",
        }
    }
}

// =========================================================
// API 错误 (ApiError)
// =========================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Http { status, .. } => ErrorKind::from_status(*status),
            ApiError::Decode(_) | ApiError::Encode(_) => ErrorKind::Serialization,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        format_api_error(self)
    }
}

// =========================================================
// 展示文本 (Display Mapping)
// =========================================================

pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request. Please check your input.";
pub const UNAUTHORIZED_MESSAGE: &str = "Authentication failed. Please login again.";
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
pub const SERVER_MESSAGE: &str = "Server error. Please try again later.";
pub const GENERIC_MESSAGE: &str = "An error occurred. Please try again.";

/// 将错误映射为展示给用户的文本
pub fn format_api_error(error: &ApiError) -> String {
    let (status, body) = match error {
        ApiError::Network(_) => return NETWORK_MESSAGE.to_string(),
        ApiError::Decode(_) | ApiError::Encode(_) => return GENERIC_MESSAGE.to_string(),
        ApiError::Http { status, body } => (*status, parse_body(body)),
    };

    match status {
        // 服务端直接给出原因时原样展示，否则按字段校验错误展开
        400 => server_reason(&body)
            .or_else(|| match &body {
                Value::Object(_) => non_empty(format_validation_errors(&body)),
                _ => None,
            })
            .unwrap_or_else(|| INVALID_REQUEST_MESSAGE.to_string()),
        401 => UNAUTHORIZED_MESSAGE.to_string(),
        403 => FORBIDDEN_MESSAGE.to_string(),
        404 => NOT_FOUND_MESSAGE.to_string(),
        500..=599 => SERVER_MESSAGE.to_string(),
        _ => server_reason(&body).unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
    }
}

/// 格式化 DRF 风格的校验错误
///
/// - 字符串原样返回
/// - 含 `detail` 的对象返回 `detail`
/// - 其余对象按 `field: msg1, msg2` 逐行输出，嵌套对象递归处理
pub fn format_validation_errors(errors: &Value) -> String {
    match errors {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(text_of) {
                return detail;
            }
            map.iter()
                .map(|(field, value)| format!("{}: {}", field, field_messages(value)))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        }
        Value::Array(items) => join_messages(items),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn field_messages(value: &Value) -> String {
    match value {
        Value::Array(items) => join_messages(items),
        Value::Object(_) => format_validation_errors(value),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_messages(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            Value::Object(_) => format_validation_errors(item),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// 服务端给出的原因：`detail` / `message` / `error` 字段，或纯文本响应体
fn server_reason(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => ["detail", "message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(text_of)),
        Value::String(s) => non_empty(s.trim().to_string()),
        _ => None,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s.clone()),
        Value::Array(items) if !items.is_empty() => non_empty(join_messages(items)),
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn parse_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16, body: Value) -> ApiError {
        ApiError::Http {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn status_codes_map_to_fixed_messages() {
        assert_eq!(
            format_api_error(&ApiError::Network("timeout".into())),
            NETWORK_MESSAGE
        );
        assert_eq!(format_api_error(&http(401, json!({}))), UNAUTHORIZED_MESSAGE);
        assert_eq!(format_api_error(&http(403, json!({}))), FORBIDDEN_MESSAGE);
        assert_eq!(
            format_api_error(&http(404, json!({"detail": "Not found."}))),
            NOT_FOUND_MESSAGE
        );
        assert_eq!(format_api_error(&http(502, json!(null))), SERVER_MESSAGE);
    }

    #[test]
    fn validation_errors_are_listed_per_field() {
        let body = json!({
            "email": ["This field is required."],
            "password": ["Too short.", "Too common."],
            "profile": {"phone": ["Invalid."]}
        });
        assert_eq!(
            format_api_error(&http(400, body)),
            "email: This field is required.\npassword: Too short., Too common.\nprofile: phone: Invalid."
        );
        assert_eq!(
            format_api_error(&http(400, json!({"detail": "Event is full"}))),
            "Event is full"
        );
        assert_eq!(
            format_api_error(&http(400, json!("Registration closed"))),
            "Registration closed"
        );
        assert_eq!(
            format_api_error(&http(400, json!({}))),
            INVALID_REQUEST_MESSAGE
        );
    }

    #[test]
    fn bad_request_reason_fields_are_shown_verbatim() {
        assert_eq!(
            format_api_error(&http(400, json!({"message": "Invalid token"}))),
            "Invalid token"
        );
        assert_eq!(
            format_api_error(&http(400, json!({"error": "Event not active"}))),
            "Event not active"
        );
        assert_eq!(
            format_api_error(&http(400, json!({"event_id": ["Invalid pk."]}))),
            "event_id: Invalid pk."
        );
    }

    #[test]
    fn other_statuses_surface_the_server_reason() {
        assert_eq!(
            format_api_error(&http(409, json!({"detail": "already checked in"}))),
            "already checked in"
        );
        assert_eq!(
            format_api_error(&http(410, json!({"error": "QR code expired"}))),
            "QR code expired"
        );
        let plain = ApiError::Http {
            status: 429,
            body: "Slow down".into(),
        };
        assert_eq!(format_api_error(&plain), "Slow down");
        assert_eq!(format_api_error(&http(418, json!({}))), GENERIC_MESSAGE);
    }

    #[test]
    fn kinds_follow_status_semantics() {
        assert_eq!(http(409, json!({})).kind(), ErrorKind::Conflict);
        assert_eq!(http(503, json!({})).kind(), ErrorKind::Server);
        assert_eq!(ApiError::Decode("x".into()).kind().error_code(), "JSON_PARSE_ERROR");
    }
}
