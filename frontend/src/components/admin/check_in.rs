//! 现场签到
//!
//! 管理员粘贴扫码得到的报名二维码内容，载荷在本地解析通过后才会请求接口。
//! 选择了活动时以所选活动为准。

use crate::components::layout::AdminNav;
use crate::components::ui::{Alert, Card, Notice, StatusBadge, local_datetime};
use crate::context::{use_dispatcher, use_store};
use campusconnect::store::Settled;
use campusconnect_shared::protocol::ListEventsRequest;
use campusconnect_shared::{Id, Registration};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn AdminCheckInPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let events = store.events.0;
    let selected_event = RwSignal::new(Option::<Id>::None);
    let payload = RwSignal::new(String::new());
    let notice = RwSignal::new(Option::<Notice>::None);
    let last = RwSignal::new(Option::<Registration>::None);
    let (is_submitting, set_is_submitting) = signal(false);

    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            let request = ListEventsRequest {
                upcoming: true,
                ..Default::default()
            };
            dispatcher.get_events(&store.events, request).await;
        });
    }

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            let result = dispatcher
                .check_in(
                    &store.registrations,
                    &payload.get_untracked(),
                    selected_event.get_untracked(),
                )
                .await;
            match result {
                Err(e) => notice.set(Some(Notice::error(e.to_string()))),
                Ok(Settled::Fulfilled(resp)) => {
                    let message = resp
                        .message()
                        .map(str::to_string)
                        .unwrap_or_else(|| "Check-in successful.".to_string());
                    log::info!("[CheckIn] registration {} checked in", resp.registration().id);
                    last.set(Some(resp.registration().clone()));
                    notice.set(Some(Notice::success(message)));
                    payload.set(String::new());
                }
                Ok(Settled::Rejected(msg)) => notice.set(Some(Notice::error(msg))),
                Ok(Settled::Discarded) => return,
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <AdminNav />
        <div class="grid md:grid-cols-2 gap-6">
            <Card title="Check in attendee">
                <Alert notice=notice />
                <form class="space-y-4" on:submit=on_submit>
                    <div class="form-control">
                        <label class="label" for="event">
                            <span class="label-text">"Event (optional)"</span>
                        </label>
                        <select
                            id="event"
                            class="select select-bordered w-full"
                            on:change=move |ev| selected_event.set(event_target_value(&ev).parse().ok())
                        >
                            <option value="">"Use the event from the QR code"</option>
                            <For each=move || events.with(|s| s.items.clone()) key=|e| e.id let:event>
                                <option value=event.id.to_string()>{event.name.clone()}</option>
                            </For>
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label" for="payload">
                            <span class="label-text">"QR code contents"</span>
                        </label>
                        <textarea
                            id="payload"
                            class="textarea textarea-bordered w-full font-mono"
                            rows="4"
                            placeholder="{\"registration_id\": 1, \"token\": \"...\"}"
                            on:input=move |ev| payload.set(event_target_value(&ev))
                            prop:value=move || payload.get()
                        ></textarea>
                    </div>
                    <button class="btn btn-primary w-full" disabled=move || is_submitting.get()>
                        "Check in"
                    </button>
                </form>
            </Card>

            {move || last.get().map(|reg| view! {
                <Card title="Last check-in">
                    <p class="font-medium">{reg.user_name().to_string()}</p>
                    <p class="text-sm">{reg.user_email().to_string()}</p>
                    <p class="text-sm">{reg.event_name().to_string()}</p>
                    <div><StatusBadge status=reg.status.clone() /></div>
                    <p class="text-sm">{format!("Checked in at {}", local_datetime(reg.checked_in_at.as_ref()))}</p>
                </Card>
            })}
        </div>
    }
}
