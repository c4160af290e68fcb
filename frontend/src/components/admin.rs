//! 管理端页面
//!
//! 所有页面都在 `Access::Admin` 路由下，由路由守卫保证只有管理员能进入。

pub mod attendees;
pub mod check_in;
pub mod dashboard;
pub mod event_form;
pub mod events;
pub mod registrations;
pub mod users;
