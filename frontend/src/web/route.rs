//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其访问级别。

use campusconnect::guard::Access;
use campusconnect_shared::Id;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    // 公开页面
    #[default]
    Home,
    Events,
    EventDetail(Id),
    Login,
    Register,

    // 登录用户
    Profile,
    MyRegistrations,
    RegistrationQrCode(Id),
    ConfirmAttendance,

    // 管理员
    AdminDashboard,
    AdminEvents,
    AdminEventNew,
    AdminEventDetail(Id),
    AdminEventEdit(Id),
    AdminEventAttendees(Id),
    AdminUsers,
    AdminUserDetail(Id),
    AdminRegistrations,
    AdminCheckIn,

    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 忽略查询串和末尾的 `/`；路径参数不是数字时视为未找到。
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let id = |s: &str| s.parse::<Id>().ok();

        match segments.as_slice() {
            [] => Self::Home,
            ["events"] => Self::Events,
            ["events", raw] => id(raw).map_or(Self::NotFound, Self::EventDetail),
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["profile"] => Self::Profile,
            ["my-registrations"] => Self::MyRegistrations,
            ["registrations", raw, "qr-code"] => {
                id(raw).map_or(Self::NotFound, Self::RegistrationQrCode)
            }
            ["confirm-attendance"] => Self::ConfirmAttendance,
            ["admin", "dashboard"] => Self::AdminDashboard,
            ["admin", "events"] => Self::AdminEvents,
            ["admin", "events", "new"] => Self::AdminEventNew,
            ["admin", "events", raw] => id(raw).map_or(Self::NotFound, Self::AdminEventDetail),
            ["admin", "events", raw, "edit"] => {
                id(raw).map_or(Self::NotFound, Self::AdminEventEdit)
            }
            ["admin", "events", raw, "attendees"] => {
                id(raw).map_or(Self::NotFound, Self::AdminEventAttendees)
            }
            ["admin", "users"] => Self::AdminUsers,
            ["admin", "users", raw] => id(raw).map_or(Self::NotFound, Self::AdminUserDetail),
            ["admin", "registrations"] => Self::AdminRegistrations,
            ["admin", "check-in"] => Self::AdminCheckIn,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Events => "/events".into(),
            Self::EventDetail(id) => format!("/events/{}", id),
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Profile => "/profile".into(),
            Self::MyRegistrations => "/my-registrations".into(),
            Self::RegistrationQrCode(id) => format!("/registrations/{}/qr-code", id),
            Self::ConfirmAttendance => "/confirm-attendance".into(),
            Self::AdminDashboard => "/admin/dashboard".into(),
            Self::AdminEvents => "/admin/events".into(),
            Self::AdminEventNew => "/admin/events/new".into(),
            Self::AdminEventDetail(id) => format!("/admin/events/{}", id),
            Self::AdminEventEdit(id) => format!("/admin/events/{}/edit", id),
            Self::AdminEventAttendees(id) => format!("/admin/events/{}/attendees", id),
            Self::AdminUsers => "/admin/users".into(),
            Self::AdminUserDetail(id) => format!("/admin/users/{}", id),
            Self::AdminRegistrations => "/admin/registrations".into(),
            Self::AdminCheckIn => "/admin/check-in".into(),
            Self::NotFound => "/404".into(),
        }
    }

    /// **核心守卫逻辑：定义该路由的访问级别**
    pub fn access(&self) -> Access {
        match self {
            Self::Home | Self::Events | Self::EventDetail(_) | Self::NotFound => Access::Public,
            Self::Login | Self::Register => Access::GuestOnly,
            Self::Profile
            | Self::MyRegistrations
            | Self::RegistrationQrCode(_)
            | Self::ConfirmAttendance => Access::Protected,
            Self::AdminDashboard
            | Self::AdminEvents
            | Self::AdminEventNew
            | Self::AdminEventDetail(_)
            | Self::AdminEventEdit(_)
            | Self::AdminEventAttendees(_)
            | Self::AdminUsers
            | Self::AdminUserDetail(_)
            | Self::AdminRegistrations
            | Self::AdminCheckIn => Access::Admin,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
