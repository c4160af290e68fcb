//! 表单校验
//!
//! 页面只负责收集字符串，这里把它们校验并转换成请求对象。
//! 校验失败时按字段返回错误，页面把错误显示在对应输入框下方。

use campusconnect_shared::date::{format_for_input, parse_input};
use campusconnect_shared::protocol::RegisterRequest;
use campusconnect_shared::{Event, EventPayload, ProfileUpdate, Role};
use chrono::TimeZone;
use std::collections::BTreeMap;
use std::fmt::Display;
use thiserror::Error;

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_EVENT_NAME_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_CAPACITY: u32 = 10_000;

/// 按字段收集的校验错误
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{} field(s) need attention", .0.len())]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    fn add(&mut self, field: &'static str, message: &str) {
        // 同一字段只保留第一条
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// =========================================================
// 注册 (Register)
// =========================================================

/// 校验注册表单并生成请求
pub fn validate_registration(form: &RegisterRequest) -> Result<RegisterRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() {
        errors.add("name", "Full name is required");
    } else if name.chars().count() < MIN_NAME_LEN {
        errors.add("name", "Name must be at least 2 characters");
    }

    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_email(email) {
        errors.add("email", "Invalid email address");
    }

    let password = &form.password;
    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 8 characters");
    } else if !(password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit()))
    {
        errors.add(
            "password",
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        );
    }

    if form.password2.is_empty() {
        errors.add("password2", "Please confirm your password");
    } else if form.password2 != form.password {
        errors.add("password2", "Passwords must match");
    }

    let guest_code = form.guest_code.as_deref().and_then(non_empty);
    if form.role == Role::Guest && guest_code.is_none() {
        errors.add("guest_code", "Guest code is required for guest accounts");
    }

    errors.into_result(|| RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: form.password.clone(),
        password2: form.password2.clone(),
        phone: form.phone.as_deref().and_then(non_empty),
        role: form.role,
        // 只有访客账号携带访客码
        guest_code: if form.role == Role::Guest {
            guest_code
        } else {
            None
        },
    })
}

// =========================================================
// 个人资料 (Profile)
// =========================================================

pub fn validate_profile(form: &ProfileUpdate) -> Result<ProfileUpdate, FieldErrors> {
    let mut errors = FieldErrors::default();
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() {
        errors.add("name", "Full name is required");
    }
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_email(email) {
        errors.add("email", "Invalid email address");
    }

    errors.into_result(|| ProfileUpdate {
        name: name.to_string(),
        email: email.to_string(),
        phone: form.phone.as_deref().and_then(non_empty),
    })
}

// =========================================================
// 活动 (Event)
// =========================================================

/// 活动表单的原始输入
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    /// `datetime-local` 格式
    pub start_time: String,
    pub end_time: String,
    pub registration_deadline: String,
    /// 空串表示不限人数
    pub capacity: String,
    pub active: bool,
    pub background_image: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            location: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            registration_deadline: String::new(),
            capacity: String::new(),
            active: true,
            background_image: String::new(),
        }
    }
}

impl EventDraft {
    /// 编辑页回填，时间按 `tz` 显示
    pub fn from_event<Tz>(event: &Event, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            name: event.name.clone(),
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone(),
            start_time: format_for_input(Some(&event.start_time.with_timezone(tz))),
            end_time: format_for_input(Some(&event.end_time.with_timezone(tz))),
            registration_deadline: format_for_input(
                event
                    .registration_deadline
                    .map(|d| d.with_timezone(tz))
                    .as_ref(),
            ),
            capacity: event.capacity.map(|c| c.to_string()).unwrap_or_default(),
            active: event.active,
            background_image: event.background_image.clone().unwrap_or_default(),
        }
    }

    /// 校验并转换为请求载荷，输入框里的时间按 `tz` 解释
    pub fn to_payload<Tz: TimeZone>(&self, tz: &Tz) -> Result<EventPayload, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Event name is required");
        } else if name.chars().count() > MAX_EVENT_NAME_LEN {
            errors.add("name", "Event name must be at most 100 characters");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description is required");
        } else if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.add("description", "Description must be at most 2000 characters");
        }

        let location = self.location.trim();
        if location.is_empty() {
            errors.add("location", "Location is required");
        } else if location.chars().count() > MAX_LOCATION_LEN {
            errors.add("location", "Location must be at most 100 characters");
        }

        let start = parse_input(&self.start_time, tz);
        if start.is_none() {
            errors.add("start_time", "Start time is required");
        }
        let end = parse_input(&self.end_time, tz);
        match (start, end) {
            (_, None) => errors.add("end_time", "End time is required"),
            (Some(start), Some(end)) if end <= start => {
                errors.add("end_time", "End time must be after start time")
            }
            _ => {}
        }

        let capacity = match self.capacity.trim() {
            "" => None,
            raw => match raw.parse::<u32>() {
                Ok(n) if n < 1 => {
                    errors.add("capacity", "Capacity must be at least 1");
                    None
                }
                Ok(n) if n > MAX_CAPACITY => {
                    errors.add("capacity", "Capacity must be at most 10,000");
                    None
                }
                Ok(n) => Some(n),
                Err(_) => {
                    errors.add("capacity", "Capacity must be a whole number");
                    None
                }
            },
        };

        let registration_deadline = parse_input(&self.registration_deadline, tz);

        match (start, end) {
            (Some(start_time), Some(end_time)) if errors.is_empty() => Ok(EventPayload {
                name: name.to_string(),
                description: Some(description.to_string()),
                location: location.to_string(),
                start_time,
                end_time,
                registration_deadline,
                capacity,
                active: self.active,
                background_image: non_empty(&self.background_image),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, TimeZone as _};

    fn student_form() -> RegisterRequest {
        RegisterRequest {
            name: " Jane Doe ".into(),
            email: "jane@uni.edu".into(),
            password: "Secret123".into(),
            password2: "Secret123".into(),
            phone: Some("  ".into()),
            role: Role::Student,
            guest_code: Some("ignored".into()),
        }
    }

    #[test]
    fn test_valid_registration_is_normalized() {
        let req = validate_registration(&student_form()).unwrap();
        assert_eq!(req.name, "Jane Doe");
        assert_eq!(req.phone, None);
        assert_eq!(req.guest_code, None);
    }

    #[test]
    fn test_registration_errors_by_field() {
        let form = RegisterRequest {
            name: "J".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            password2: "other".into(),
            role: Role::Guest,
            ..Default::default()
        };

        let errors = validate_registration(&form).unwrap_err();

        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(errors.get("password2"), Some("Passwords must match"));
        assert_eq!(
            errors.get("guest_code"),
            Some("Guest code is required for guest accounts")
        );
    }

    #[test]
    fn test_password_needs_mixed_characters() {
        let mut form = student_form();
        form.password = "alllowercase1".into();
        form.password2 = form.password.clone();
        let errors = validate_registration(&form).unwrap_err();
        assert!(errors.get("password").unwrap().contains("uppercase"));
    }

    #[test]
    fn test_event_draft_to_payload() {
        let draft = EventDraft {
            name: "Open Day".into(),
            description: "Tours".into(),
            location: "Campus".into(),
            start_time: "2030-05-01T09:00".into(),
            end_time: "2030-05-01T17:00".into(),
            capacity: "150".into(),
            ..Default::default()
        };

        let payload = draft.to_payload(&Utc).unwrap();

        assert_eq!(
            payload.start_time,
            Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(payload.capacity, Some(150));
        assert_eq!(payload.registration_deadline, None);
        assert!(payload.active);
    }

    #[test]
    fn test_event_end_must_follow_start() {
        let draft = EventDraft {
            name: "Open Day".into(),
            description: "Tours".into(),
            location: "Campus".into(),
            start_time: "2030-05-01T09:00".into(),
            end_time: "2030-05-01T08:00".into(),
            capacity: "0".into(),
            ..Default::default()
        };

        let errors = draft.to_payload(&Utc).unwrap_err();
        assert_eq!(
            errors.get("end_time"),
            Some("End time must be after start time")
        );
        assert_eq!(errors.get("capacity"), Some("Capacity must be at least 1"));
    }

    #[test]
    fn test_draft_round_trips_an_event() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Gala",
            "description": "Evening",
            "location": "Hall",
            "start_time": "2030-05-01T18:00:00Z",
            "end_time": "2030-05-01T23:00:00Z",
            "capacity": null
        }))
        .unwrap();

        let draft = EventDraft::from_event(&event, &Utc);
        assert_eq!(draft.start_time, "2030-05-01T18:00");
        assert_eq!(draft.capacity, "");

        let payload = draft.to_payload(&Utc).unwrap();
        assert_eq!(payload, EventPayload::from(&event));
    }
}
