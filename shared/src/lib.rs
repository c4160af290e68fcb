use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 列表接口的默认分页大小（与后端保持一致）
pub const PAGE_SIZE: u64 = 10;

/// 所有远程资源的主键类型
pub type Id = i64;

fn default_true() -> bool {
    true
}

// =========================================================
// 用户 (User)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Student,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Guest => "guest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Student => "Student",
            Role::Guest => "Guest",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "student" => Some(Role::Student),
            "guest" => Some(Role::Guest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(alias = "full_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub guest_code: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, alias = "date_joined")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// 个人资料更新（`PUT /auth/profile/`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// 管理员对用户的局部修改（`PUT /auth/users/{id}/`）
///
/// 只序列化被设置的字段。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// =========================================================
// 认证 (Auth)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// 刷新接口的响应
///
/// `access` 缺失视为刷新失败；`refresh` 仅在后端开启轮换时返回。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// =========================================================
// 活动 (Event)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub registration_deadline: Option<DateTime<Utc>>,
    /// `None` 表示不限人数
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub background_image: Option<String>,

    // 以下字段由服务端计算，客户端只读
    #[serde(default)]
    pub is_past: bool,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default)]
    pub available_spots: Option<u32>,
    #[serde(default)]
    pub registration_count: Option<u32>,
}

/// 创建/更新活动的表单载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<DateTime<Utc>>,
    pub capacity: Option<u32>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl From<&Event> for EventPayload {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            registration_deadline: event.registration_deadline,
            capacity: event.capacity,
            active: event.active,
            background_image: event.background_image.clone(),
        }
    }
}

// =========================================================
// 报名 (Registration)
// =========================================================

/// 报名状态
///
/// 后端存在两套词汇：`registered / checked_in / cancelled` 与管理端的
/// `pending / approved / rejected`。两者都按原样保留，未知值落入 `Other`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistrationStatus {
    Registered,
    CheckedIn,
    Cancelled,
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl RegistrationStatus {
    pub const KNOWN: [RegistrationStatus; 6] = [
        RegistrationStatus::Registered,
        RegistrationStatus::CheckedIn,
        RegistrationStatus::Cancelled,
        RegistrationStatus::Pending,
        RegistrationStatus::Approved,
        RegistrationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::CheckedIn => "checked_in",
            RegistrationStatus::Cancelled => "cancelled",
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::Other(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RegistrationStatus::Registered => "Registered",
            RegistrationStatus::CheckedIn => "Checked In",
            RegistrationStatus::Cancelled => "Cancelled",
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Approved => "Approved",
            RegistrationStatus::Rejected => "Rejected",
            RegistrationStatus::Other(s) => s,
        }
    }
}

impl From<String> for RegistrationStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "registered" => RegistrationStatus::Registered,
            "checked_in" => RegistrationStatus::CheckedIn,
            "cancelled" => RegistrationStatus::Cancelled,
            "pending" => RegistrationStatus::Pending,
            "approved" => RegistrationStatus::Approved,
            "rejected" => RegistrationStatus::Rejected,
            _ => RegistrationStatus::Other(value),
        }
    }
}

impl From<RegistrationStatus> for String {
    fn from(status: RegistrationStatus) -> Self {
        status.as_str().to_string()
    }
}

/// 报名中内嵌的用户摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationUser {
    #[serde(default)]
    pub id: Id,
    #[serde(default, alias = "full_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// 报名中内嵌的活动摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Id,
    #[serde(default)]
    pub user: Option<RegistrationUser>,
    #[serde(default)]
    pub event: Option<RegistrationEvent>,
    pub status: RegistrationStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attendance_code: Option<String>,
}

impl Registration {
    pub fn user_name(&self) -> &str {
        self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("")
    }

    pub fn user_email(&self) -> &str {
        self.user.as_ref().map(|u| u.email.as_str()).unwrap_or("")
    }

    pub fn event_name(&self) -> &str {
        self.event.as_ref().map(|e| e.name.as_str()).unwrap_or("")
    }

    pub fn event_start(&self) -> Option<DateTime<Utc>> {
        self.event.as_ref().and_then(|e| e.start_time)
    }
}

// =========================================================
// 签到 (Check-in)
// =========================================================

/// 签到响应：后端可能返回 `{registration, message}`，也可能直接返回报名对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckInResponse {
    Wrapped {
        registration: Registration,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(Registration),
}

impl CheckInResponse {
    pub fn registration(&self) -> &Registration {
        match self {
            CheckInResponse::Wrapped { registration, .. } => registration,
            CheckInResponse::Bare(registration) => registration,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CheckInResponse::Wrapped { message, .. } => message.as_deref(),
            CheckInResponse::Bare(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub registration: Option<Registration>,
}

// =========================================================
// 分页 (Pagination)
// =========================================================

/// 列表响应：DRF 分页对象或裸数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Page {
        count: u64,
        results: Vec<T>,
    },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    /// 拆分为 (条目, 总数)；裸数组没有总数
    pub fn into_parts(self) -> (Vec<T>, Option<u64>) {
        match self {
            ListResponse::Page { count, results } => (results, Some(count)),
            ListResponse::Plain(items) => (items, None),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.into_parts().0
    }
}

/// 一页数据及分页信息
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u64,
    pub current_page: u64,
}

impl<T> Page<T> {
    pub fn from_response(response: ListResponse<T>, current_page: u64) -> Self {
        let (items, count) = response.into_parts();
        let total = count.unwrap_or(items.len() as u64);
        Self {
            total_pages: total.div_ceil(PAGE_SIZE),
            current_page,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_accepts_full_name_and_missing_fields() {
        let user: User =
            serde_json::from_value(json!({"id": 1, "full_name": "Jane", "role": "student"}))
                .unwrap();
        assert_eq!(user.name, "Jane");
        assert_eq!(user.role, Role::Student);
        assert!(user.is_active);
        assert!(user.email.is_empty());
    }

    #[test]
    fn registration_status_keeps_both_vocabularies() {
        let statuses: Vec<RegistrationStatus> =
            serde_json::from_value(json!(["checked_in", "approved", "waitlisted"])).unwrap();
        assert_eq!(statuses[0], RegistrationStatus::CheckedIn);
        assert_eq!(statuses[1], RegistrationStatus::Approved);
        assert_eq!(
            statuses[2],
            RegistrationStatus::Other("waitlisted".to_string())
        );
        assert_eq!(
            serde_json::to_value(&statuses[2]).unwrap(),
            json!("waitlisted")
        );
    }

    #[test]
    fn list_response_accepts_both_shapes() {
        let paged: ListResponse<i64> =
            serde_json::from_value(json!({"count": 21, "next": null, "results": [1, 2]})).unwrap();
        let page = Page::from_response(paged, 1);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total_pages, 3);

        let plain: ListResponse<i64> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(plain.into_parts(), (vec![1, 2, 3], None));
    }

    #[test]
    fn check_in_response_unwraps_registration() {
        let body = json!({
            "message": "Checked in",
            "registration": {"id": 7, "status": "checked_in", "checked_in_at": "2024-05-01T10:00:00Z"}
        });
        let resp: CheckInResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.registration().id, 7);
        assert_eq!(resp.message(), Some("Checked in"));

        let bare: CheckInResponse =
            serde_json::from_value(json!({"id": 8, "status": "checked_in"})).unwrap();
        assert_eq!(bare.registration().id, 8);
        assert_eq!(bare.message(), None);
    }
}
