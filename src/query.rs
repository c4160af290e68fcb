//! 列表页的本地查询：搜索、排序、状态筛选、分组与统计
//!
//! 这些都只作用于已经拉取到的第一页数据，不会触发请求。

use campusconnect_shared::{Event, Registration, RegistrationStatus, User};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

// =========================================================
// 搜索 (Search)
// =========================================================

/// 参与搜索的字段
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// `needle` 必须已经转成小写
    fn matches(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Searchable for Event {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.location.as_str()];
        if let Some(desc) = &self.description {
            fields.push(desc);
        }
        fields
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.email.as_str(), self.name.as_str()]
    }
}

impl Searchable for Registration {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.user_email(), self.user_name(), self.event_name()]
    }
}

/// 大小写不敏感的子串搜索，空白关键字返回全部
pub fn filter_items<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.matches(&needle)).collect()
}

/// 按报名状态筛选，`None` 表示不筛选
pub fn filter_by_status<'a>(
    items: impl IntoIterator<Item = &'a Registration>,
    status: Option<&RegistrationStatus>,
) -> Vec<&'a Registration> {
    items
        .into_iter()
        .filter(|reg| status.is_none_or(|s| &reg.status == s))
        .collect()
}

// =========================================================
// 排序 (Sort)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

/// 排序字段
///
/// `as_str` / `from_value` 用于和下拉框的 value 互转。
pub trait SortKey<T>: Copy {
    fn compare(&self, a: &T, b: &T) -> Ordering;
    fn as_str(&self) -> &'static str;
    fn from_value(value: &str) -> Option<Self>;
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSort {
    #[default]
    StartTime,
    Name,
    Location,
}

impl SortKey<Event> for EventSort {
    fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self {
            EventSort::StartTime => a.start_time.cmp(&b.start_time),
            EventSort::Name => cmp_text(&a.name, &b.name),
            EventSort::Location => cmp_text(&a.location, &b.location),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            EventSort::StartTime => "start_time",
            EventSort::Name => "name",
            EventSort::Location => "location",
        }
    }

    fn from_value(value: &str) -> Option<Self> {
        match value {
            "start_time" => Some(EventSort::StartTime),
            "name" => Some(EventSort::Name),
            "location" => Some(EventSort::Location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    #[default]
    Name,
    Email,
    CreatedAt,
}

impl SortKey<User> for UserSort {
    fn compare(&self, a: &User, b: &User) -> Ordering {
        match self {
            UserSort::Name => cmp_text(&a.name, &b.name),
            UserSort::Email => cmp_text(&a.email, &b.email),
            UserSort::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            UserSort::Name => "name",
            UserSort::Email => "email",
            UserSort::CreatedAt => "created_at",
        }
    }

    fn from_value(value: &str) -> Option<Self> {
        match value {
            "name" => Some(UserSort::Name),
            "email" => Some(UserSort::Email),
            "created_at" => Some(UserSort::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationSort {
    #[default]
    CreatedAt,
    EventName,
    Status,
}

impl SortKey<Registration> for RegistrationSort {
    fn compare(&self, a: &Registration, b: &Registration) -> Ordering {
        match self {
            RegistrationSort::CreatedAt => a.created_at.cmp(&b.created_at),
            RegistrationSort::EventName => cmp_text(a.event_name(), b.event_name()),
            RegistrationSort::Status => a.status.as_str().cmp(b.status.as_str()),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RegistrationSort::CreatedAt => "created_at",
            RegistrationSort::EventName => "event_name",
            RegistrationSort::Status => "status",
        }
    }

    fn from_value(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(RegistrationSort::CreatedAt),
            "event_name" => Some(RegistrationSort::EventName),
            "status" => Some(RegistrationSort::Status),
            _ => None,
        }
    }
}

/// 稳定排序，相同键保持原有顺序
pub fn sort_items<T, K: SortKey<T>>(items: &mut [T], key: K, direction: SortDirection) {
    items.sort_by(|a, b| direction.apply(key.compare(a, b)));
}

/// 一个列表页的查询条件
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListQuery<K> {
    pub term: String,
    pub sort: K,
    pub direction: SortDirection,
}

impl<K: Copy> ListQuery<K> {
    /// 点击同一列切换方向，点击新列从升序开始
    pub fn sort_by(&mut self, key: K)
    where
        K: PartialEq,
    {
        if self.sort == key {
            self.direction = self.direction.toggled();
        } else {
            self.sort = key;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn apply<T>(&self, items: &[T]) -> Vec<T>
    where
        T: Searchable + Clone,
        K: SortKey<T>,
    {
        let mut out: Vec<T> = filter_items(items, &self.term).into_iter().cloned().collect();
        sort_items(&mut out, self.sort, self.direction);
        out
    }
}

// =========================================================
// 我的报名分组 (Grouping)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationGroups {
    pub upcoming: Vec<Registration>,
    pub past: Vec<Registration>,
    pub checked_in: Vec<Registration>,
    pub cancelled: Vec<Registration>,
}

impl RegistrationGroups {
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty()
            && self.past.is_empty()
            && self.checked_in.is_empty()
            && self.cancelled.is_empty()
    }
}

/// 按状态和活动开始时间分组
///
/// 只有 `registered` 会按时间拆成 upcoming / past；缺少开始时间的算作 past。
/// 管理端词汇（pending 等）不进入任何分组。
pub fn group_registrations(items: &[Registration], now: DateTime<Utc>) -> RegistrationGroups {
    let mut groups = RegistrationGroups::default();
    for reg in items {
        match reg.status {
            RegistrationStatus::Registered => {
                if reg.event_start().is_some_and(|start| start > now) {
                    groups.upcoming.push(reg.clone());
                } else {
                    groups.past.push(reg.clone());
                }
            }
            RegistrationStatus::CheckedIn => groups.checked_in.push(reg.clone()),
            RegistrationStatus::Cancelled => groups.cancelled.push(reg.clone()),
            _ => {}
        }
    }
    groups
}

// =========================================================
// 管理端统计 (Dashboard)
// =========================================================

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_events: usize,
    pub upcoming_events: usize,
    pub total_users: usize,
    pub total_registrations: usize,
    pub checked_in: usize,
    pub recent_events: Vec<Event>,
    pub recent_registrations: Vec<Registration>,
}

impl DashboardStats {
    pub fn compute(
        events: &[Event],
        users: &[User],
        registrations: &[Registration],
        now: DateTime<Utc>,
    ) -> Self {
        let mut recent_events = events.to_vec();
        sort_items(&mut recent_events, EventSort::StartTime, SortDirection::Desc);
        recent_events.truncate(RECENT_LIMIT);

        let mut recent_registrations = registrations.to_vec();
        sort_items(
            &mut recent_registrations,
            RegistrationSort::CreatedAt,
            SortDirection::Desc,
        );
        recent_registrations.truncate(RECENT_LIMIT);

        Self {
            total_events: events.len(),
            upcoming_events: events.iter().filter(|e| e.start_time > now).count(),
            total_users: users.len(),
            total_registrations: registrations.len(),
            checked_in: registrations
                .iter()
                .filter(|r| r.status == RegistrationStatus::CheckedIn)
                .count(),
            recent_events,
            recent_registrations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn event(id: i64, name: &str, location: &str, desc: Option<&str>, start: &str) -> Event {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "location": location,
            "description": desc,
            "start_time": start,
            "end_time": start
        }))
        .unwrap()
    }

    fn registration(id: i64, status: &str, start: Option<&str>) -> Registration {
        serde_json::from_value(json!({
            "id": id,
            "status": status,
            "user": {"id": 1, "name": "Jane Doe", "email": "jane@uni.edu"},
            "event": {"id": 9, "name": format!("Talk {}", id), "start_time": start},
            "created_at": format!("2024-01-0{}T00:00:00Z", id)
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let events = vec![
            event(1, "Career Fair", "Main Hall", None, "2024-07-01T10:00:00Z"),
            event(2, "Hackathon", "Lab B", Some("48h of CODE"), "2024-07-02T10:00:00Z"),
            event(3, "Choir", "Chapel", None, "2024-07-03T10:00:00Z"),
        ];

        let ids = |term: &str| {
            filter_items(&events, term)
                .iter()
                .map(|e| e.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids("hall"), vec![1]);
        assert_eq!(ids("code"), vec![2]);
        assert_eq!(ids("CH"), vec![3]);
        assert_eq!(ids("   "), vec![1, 2, 3]);
        assert!(ids("zzz").is_empty());
    }

    #[test]
    fn test_registration_search_covers_user_and_event() {
        let regs = vec![registration(1, "registered", None)];
        assert_eq!(filter_items(&regs, "JANE@").len(), 1);
        assert_eq!(filter_items(&regs, "talk 1").len(), 1);
        assert_eq!(filter_items(&regs, "bob").len(), 0);
    }

    #[test]
    fn test_list_query_toggles_direction_on_same_key() {
        let events = vec![
            event(1, "beta", "x", None, "2024-07-01T10:00:00Z"),
            event(2, "Alpha", "y", None, "2024-07-02T10:00:00Z"),
        ];
        let mut query = ListQuery::<EventSort>::default();
        query.sort_by(EventSort::Name);
        let names: Vec<_> = query.apply(&events).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Alpha", "beta"]);

        query.sort_by(EventSort::Name);
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!(query.apply(&events)[0].name, "beta");
    }

    #[test]
    fn test_status_filter() {
        let regs = vec![
            registration(1, "registered", None),
            registration(2, "pending", None),
        ];
        assert_eq!(filter_by_status(&regs, None).len(), 2);
        let pending = filter_by_status(&regs, Some(&RegistrationStatus::Pending));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 2);
    }

    #[test]
    fn test_group_registrations_by_status_and_start() {
        let regs = vec![
            registration(1, "registered", Some("2024-07-01T00:00:00Z")),
            registration(2, "registered", Some("2024-05-01T00:00:00Z")),
            registration(3, "checked_in", Some("2024-05-01T00:00:00Z")),
            registration(4, "cancelled", Some("2024-07-01T00:00:00Z")),
            registration(5, "approved", Some("2024-07-01T00:00:00Z")),
        ];

        let groups = group_registrations(&regs, now());

        assert_eq!(groups.upcoming[0].id, 1);
        assert_eq!(groups.past[0].id, 2);
        assert_eq!(groups.checked_in[0].id, 3);
        assert_eq!(groups.cancelled[0].id, 4);
        assert_eq!(
            groups.upcoming.len() + groups.past.len() + groups.checked_in.len() + groups.cancelled.len(),
            4
        );
    }

    #[test]
    fn test_dashboard_stats() {
        let events = vec![
            event(1, "Old", "a", None, "2024-01-01T00:00:00Z"),
            event(2, "New", "b", None, "2024-09-01T00:00:00Z"),
        ];
        let regs = vec![
            registration(1, "checked_in", None),
            registration(2, "registered", None),
        ];

        let stats = DashboardStats::compute(&events, &[], &regs, now());

        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.upcoming_events, 1);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_registrations, 2);
        assert_eq!(stats.checked_in, 1);
        assert_eq!(stats.recent_events[0].id, 2);
        assert_eq!(stats.recent_registrations[0].id, 2);
    }
}
