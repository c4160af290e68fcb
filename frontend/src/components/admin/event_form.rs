//! 活动创建 / 编辑表单
//!
//! 零散的输入信号整合为 `EventFormState`：
//! - 持有数据
//! - 编辑时从已有活动回填
//! - 转换为核心库的 `EventDraft` 再统一校验

use crate::components::layout::AdminNav;
use crate::components::ui::{Alert, Card, FieldError, Loading, Notice, TextField};
use crate::context::{use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use campusconnect::forms::{EventDraft, FieldErrors};
use campusconnect::store::Settled;
use campusconnect_shared::{Event, Id};
use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 表单状态
///
/// 全部是 `RwSignal`，可以 `Copy` 到各个事件处理器中。
#[derive(Clone, Copy)]
struct EventFormState {
    name: RwSignal<String>,
    description: RwSignal<String>,
    location: RwSignal<String>,
    start_time: RwSignal<String>,
    end_time: RwSignal<String>,
    registration_deadline: RwSignal<String>,
    capacity: RwSignal<String>,
    active: RwSignal<bool>,
    background_image: RwSignal<String>,
}

impl EventFormState {
    fn new() -> Self {
        let draft = EventDraft::default();
        Self {
            name: RwSignal::new(draft.name),
            description: RwSignal::new(draft.description),
            location: RwSignal::new(draft.location),
            start_time: RwSignal::new(draft.start_time),
            end_time: RwSignal::new(draft.end_time),
            registration_deadline: RwSignal::new(draft.registration_deadline),
            capacity: RwSignal::new(draft.capacity),
            active: RwSignal::new(draft.active),
            background_image: RwSignal::new(draft.background_image),
        }
    }

    /// 用已有活动回填，时间按浏览器本地时区显示
    fn fill(&self, event: &Event) {
        let draft = EventDraft::from_event(event, &Local);
        self.name.set(draft.name);
        self.description.set(draft.description);
        self.location.set(draft.location);
        self.start_time.set(draft.start_time);
        self.end_time.set(draft.end_time);
        self.registration_deadline.set(draft.registration_deadline);
        self.capacity.set(draft.capacity);
        self.active.set(draft.active);
        self.background_image.set(draft.background_image);
    }

    fn to_draft(self) -> EventDraft {
        EventDraft {
            name: self.name.get_untracked(),
            description: self.description.get_untracked(),
            location: self.location.get_untracked(),
            start_time: self.start_time.get_untracked(),
            end_time: self.end_time.get_untracked(),
            registration_deadline: self.registration_deadline.get_untracked(),
            capacity: self.capacity.get_untracked(),
            active: self.active.get_untracked(),
            background_image: self.background_image.get_untracked(),
        }
    }
}

/// `id` 为 `None` 时创建新活动
#[component]
pub fn AdminEventFormPage(#[prop(optional)] id: Option<Id>) -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let router = use_router();
    let form = EventFormState::new();
    let errors = RwSignal::new(FieldErrors::default());
    let notice = RwSignal::new(Option::<Notice>::None);
    let (is_loading, set_is_loading) = signal(id.is_some());
    let (is_saving, set_is_saving) = signal(false);

    if let Some(id) = id {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            match dispatcher.get_event(&store.events, id).await {
                Settled::Fulfilled(event) => form.fill(&event),
                Settled::Rejected(msg) => notice.set(Some(Notice::error(msg))),
                Settled::Discarded => return,
            }
            set_is_loading.set(false);
        });
    }

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let payload = match form.to_draft().to_payload(&Local) {
            Ok(payload) => {
                errors.set(FieldErrors::default());
                payload
            }
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        set_is_saving.set(true);
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            let settled = match id {
                Some(id) => dispatcher.update_event(&store.events, id, payload).await,
                None => dispatcher.create_event(&store.events, payload).await,
            };
            match settled {
                Settled::Fulfilled(event) => {
                    log::info!("[Admin] saved event {}", event.id);
                    router.navigate_to(&AppRoute::AdminEventDetail(event.id));
                }
                Settled::Rejected(msg) => {
                    notice.set(Some(Notice::error(msg)));
                    set_is_saving.set(false);
                }
                Settled::Discarded => {}
            }
        });
    };

    let field_error = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.get(field).map(str::to_string)))
    };
    let title = if id.is_some() { "Edit event" } else { "New event" };

    view! {
        <AdminNav />
        <Show when=move || !is_loading.get() fallback=|| view! { <Loading text="Loading event..." /> }>
            <Card title=title>
                <Alert notice=notice />
                <form class="space-y-2" on:submit=on_submit.clone()>
                    <TextField id="name" label="Name" value=form.name errors=errors />
                    <div class="form-control">
                        <label class="label" for="description">
                            <span class="label-text">"Description"</span>
                        </label>
                        <textarea
                            id="description"
                            class="textarea textarea-bordered w-full"
                            rows="5"
                            on:input=move |ev| form.description.set(event_target_value(&ev))
                            prop:value=move || form.description.get()
                        ></textarea>
                        <FieldError message=field_error("description") />
                    </div>
                    <TextField id="location" label="Location" value=form.location errors=errors />
                    <div class="grid md:grid-cols-3 gap-4">
                        <TextField id="start_time" label="Starts" kind="datetime-local" value=form.start_time errors=errors />
                        <TextField id="end_time" label="Ends" kind="datetime-local" value=form.end_time errors=errors />
                        <TextField
                            id="registration_deadline"
                            label="Registration deadline"
                            kind="datetime-local"
                            value=form.registration_deadline
                            errors=errors
                        />
                    </div>
                    <TextField
                        id="capacity"
                        label="Capacity (leave empty for unlimited)"
                        kind="number"
                        value=form.capacity
                        errors=errors
                    />
                    <TextField
                        id="background_image"
                        label="Background image URL"
                        kind="url"
                        value=form.background_image
                        errors=errors
                    />
                    <label class="label cursor-pointer justify-start gap-2">
                        <input
                            type="checkbox"
                            class="checkbox"
                            prop:checked=move || form.active.get()
                            on:change=move |ev| form.active.set(event_target_checked(&ev))
                        />
                        <span class="label-text">"Active (visible to users)"</span>
                    </label>
                    <div class="card-actions justify-end mt-4">
                        <button
                            type="button"
                            class="btn btn-ghost"
                            on:click=move |_| router.navigate_to(&AppRoute::AdminEvents)
                        >
                            "Cancel"
                        </button>
                        <button class="btn btn-primary" disabled=move || is_saving.get()>
                            {move || if is_saving.get() { "Saving..." } else { "Save event" }}
                        </button>
                    </div>
                </form>
            </Card>
        </Show>
    }
}
