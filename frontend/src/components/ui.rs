//! 通用 UI 组件
//!
//! 加载占位、可关闭提示、状态徽章、卡片，以及几个视图层的小工具函数。

use crate::context::use_store;
use campusconnect::forms::FieldErrors;
use campusconnect::store::Settled;
use campusconnect_shared::date::{self, format_date};
use campusconnect_shared::{RegistrationStatus, Role};
use chrono::{DateTime, Local, Utc};
use leptos::prelude::*;

// =========================================================
// 工具函数
// =========================================================

/// 按本地时区格式化，`None` 显示 "N/A"
pub fn local_time(value: Option<&DateTime<Utc>>, fmt: &str) -> String {
    format_date(value.map(|d| d.with_timezone(&Local)).as_ref(), fmt)
}

pub fn local_datetime(value: Option<&DateTime<Utc>>) -> String {
    local_time(value, date::FORMAT_DATETIME)
}

/// 浏览器确认框，无法弹出时按取消处理
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

// =========================================================
// 加载占位
// =========================================================

#[component]
pub fn Loading(#[prop(optional, into)] text: Option<String>) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center py-16 gap-3">
            <span class="loading loading-spinner loading-lg text-primary"></span>
            {text.map(|t| view! { <p class="text-base-content/60">{t}</p> })}
        </div>
    }
}

// =========================================================
// 提示 (Alert)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// 成功显示 `success`，失败显示格式化后的错误；页面已卸载时不提示
    pub fn from_settled<P>(settled: &Settled<P>, success: &str) -> Option<Self> {
        match settled {
            Settled::Fulfilled(_) => Some(Self::success(success)),
            Settled::Rejected(msg) => Some(Self::error(msg.clone())),
            Settled::Discarded => None,
        }
    }
}

/// 页面内的可关闭提示，一段时间后自动消失
///
/// 每个页面持有自己的 `notice` 信号，互不影响。
#[component]
pub fn Alert(notice: RwSignal<Option<Notice>>) -> impl IntoView {
    let dismiss_after = use_store().client.with_value(|c| c.config().alert_dismiss);

    Effect::new(move |_| {
        let shown = notice.get();
        if shown.is_some() {
            // 只清除自己这一条，期间换了新提示则保留
            set_timeout(
                move || {
                    if notice.try_get_untracked() == Some(shown) {
                        notice.set(None);
                    }
                },
                dismiss_after,
            );
        }
    });

    move || {
        notice.get().map(|n| {
            let class = match n.kind {
                NoticeKind::Success => "alert alert-success",
                NoticeKind::Error => "alert alert-error",
            };
            view! {
                <div role="alert" class=class>
                    <span class="whitespace-pre-line">{n.message}</span>
                    <button class="btn btn-ghost btn-xs" on:click=move |_| notice.set(None)>
                        "✕"
                    </button>
                </div>
            }
        })
    }
}

// =========================================================
// 徽章与卡片
// =========================================================

#[component]
pub fn StatusBadge(status: RegistrationStatus) -> impl IntoView {
    let class = match status {
        RegistrationStatus::Registered | RegistrationStatus::Approved => "badge badge-info",
        RegistrationStatus::CheckedIn => "badge badge-success",
        RegistrationStatus::Cancelled | RegistrationStatus::Rejected => "badge badge-error",
        RegistrationStatus::Pending => "badge badge-warning",
        RegistrationStatus::Other(_) => "badge badge-ghost",
    };
    view! { <span class=class>{status.label().to_string()}</span> }
}

#[component]
pub fn RoleBadge(role: Role) -> impl IntoView {
    let class = match role {
        Role::Admin => "badge badge-primary",
        Role::Student => "badge badge-neutral",
        Role::Guest => "badge badge-accent",
    };
    view! { <span class=class>{role.label()}</span> }
}

#[component]
pub fn Card(
    #[prop(optional, into)] title: Option<String>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                {title.map(|t| view! { <h2 class="card-title">{t}</h2> })}
                {children()}
            </div>
        </div>
    }
}

// =========================================================
// 表单输入
// =========================================================

/// 输入框下方的字段错误
#[component]
pub fn FieldError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    move || {
        message.get().map(|m| {
            view! {
                <label class="label">
                    <span class="label-text-alt text-error">{m}</span>
                </label>
            }
        })
    }
}

/// 带标签和字段错误的文本输入
#[component]
pub fn TextField(
    id: &'static str,
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(default = "text")] kind: &'static str,
    #[prop(optional, into)] placeholder: String,
    #[prop(optional)] errors: Option<RwSignal<FieldErrors>>,
) -> impl IntoView {
    let message = Signal::derive(move || {
        errors.and_then(|e| e.with(|e| e.get(id).map(str::to_string)))
    });

    view! {
        <div class="form-control">
            <label class="label" for=id>
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=kind
                placeholder=placeholder
                class=move || {
                    if message.get().is_some() {
                        "input input-bordered input-error w-full"
                    } else {
                        "input input-bordered w-full"
                    }
                }
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=move || value.get()
            />
            <FieldError message=message />
        </div>
    }
}
