//! 路由守卫的判定逻辑
//!
//! 只根据 auth 切片做决定，具体跳转由前端路由执行。

use crate::store::AuthState;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// 路由的访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// 登录/注册页，已登录用户会被送走
    GuestOnly,
    Protected,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// 启动时恢复的会话尚未确认，显示占位，不做跳转
    Loading,
    /// 去登录页，登录后回到 `from`
    RedirectToLogin { from: String },
    Redirect(String),
}

/// 判定当前路由是否可以渲染
///
/// `return_to` 是登录前记录的目标路径，只对 `GuestOnly` 生效。
pub fn decide(
    access: Access,
    auth: &AuthState,
    path: &str,
    return_to: Option<&str>,
) -> GuardDecision {
    if access == Access::Public {
        return GuardDecision::Allow;
    }
    if auth.is_hydrating {
        return GuardDecision::Loading;
    }

    match access {
        Access::Public => GuardDecision::Allow,
        Access::GuestOnly if auth.is_authenticated => {
            GuardDecision::Redirect(post_login_target(return_to))
        }
        Access::GuestOnly => GuardDecision::Allow,
        Access::Protected | Access::Admin if !auth.is_authenticated => {
            GuardDecision::RedirectToLogin {
                from: path.to_string(),
            }
        }
        Access::Admin if !auth.is_admin() => GuardDecision::Redirect(HOME_PATH.to_string()),
        Access::Protected | Access::Admin => GuardDecision::Allow,
    }
}

/// 登录后的去向：记录的站内路径，否则首页
///
/// 只接受以单个 `/` 开头的路径，外部地址一律回到首页。
pub fn post_login_target(return_to: Option<&str>) -> String {
    match return_to {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && path != LOGIN_PATH =>
        {
            path.to_string()
        }
        _ => HOME_PATH.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusconnect_shared::{Role, User};

    fn signed_in(role: Role) -> AuthState {
        let mut state = AuthState::default();
        let user = User {
            id: 1,
            name: "Jane".into(),
            email: "jane@uni.edu".into(),
            phone: None,
            role,
            guest_code: None,
            is_active: true,
            created_at: None,
        };
        state.sign_in(user, "a1".into());
        state
    }

    #[test]
    fn test_protected_route_redirects_with_origin() {
        let decision = decide(
            Access::Protected,
            &AuthState::default(),
            "/my-registrations",
            None,
        );
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                from: "/my-registrations".into()
            }
        );
    }

    #[test]
    fn test_hydration_makes_no_decision() {
        let mut auth = signed_in(Role::Admin);
        auth.is_hydrating = true;
        assert_eq!(
            decide(Access::Admin, &auth, "/admin/users", None),
            GuardDecision::Loading
        );
        assert_eq!(
            decide(Access::Public, &auth, "/events", None),
            GuardDecision::Allow
        );

        auth.finish_hydration();
        assert_eq!(
            decide(Access::Admin, &auth, "/admin/users", None),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_pending_auth_request_keeps_page_mounted() {
        let mut auth = AuthState::default();
        auth.is_loading = true;
        assert_eq!(
            decide(Access::GuestOnly, &auth, "/login", None),
            GuardDecision::Allow
        );

        let mut user = signed_in(Role::Student);
        user.is_loading = true;
        assert_eq!(
            decide(Access::Protected, &user, "/profile", None),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_admin_route_sends_students_home() {
        let student = signed_in(Role::Student);
        assert_eq!(
            decide(Access::Admin, &student, "/admin/dashboard", None),
            GuardDecision::Redirect("/".into())
        );
        let admin = signed_in(Role::Admin);
        assert_eq!(
            decide(Access::Admin, &admin, "/admin/dashboard", None),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_guest_only_returns_to_saved_path() {
        let auth = signed_in(Role::Student);
        assert_eq!(
            decide(Access::GuestOnly, &auth, "/login", Some("/profile")),
            GuardDecision::Redirect("/profile".into())
        );
        assert_eq!(
            decide(Access::GuestOnly, &AuthState::default(), "/login", None),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_external_return_paths_are_ignored() {
        assert_eq!(post_login_target(Some("//evil.example")), "/");
        assert_eq!(post_login_target(Some("https://evil.example")), "/");
        assert_eq!(post_login_target(Some("/login")), "/");
        assert_eq!(post_login_target(None), "/");
    }
}
