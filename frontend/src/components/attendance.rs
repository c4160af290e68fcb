use crate::components::ui::{Alert, Card, Notice};
use crate::context::{use_dispatcher, use_store};
use campusconnect::store::Settled;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 出勤确认
///
/// 用户粘贴活动二维码内容，或输入现场公布的出勤码，二者至少填一个。
#[component]
pub fn ConfirmAttendancePage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let qr_text = RwSignal::new(String::new());
    let code = RwSignal::new(String::new());
    let notice = RwSignal::new(Option::<Notice>::None);
    let (is_submitting, set_is_submitting) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            let result = dispatcher
                .confirm_attendance(
                    &store.registrations,
                    &qr_text.get_untracked(),
                    &code.get_untracked(),
                )
                .await;
            match result {
                Err(e) => notice.set(Some(Notice::error(e.to_string()))),
                Ok(Settled::Fulfilled(resp)) => {
                    let message = resp
                        .message
                        .unwrap_or_else(|| "Attendance confirmed.".to_string());
                    notice.set(Some(Notice::success(message)));
                    qr_text.set(String::new());
                    code.set(String::new());
                }
                Ok(Settled::Rejected(msg)) => notice.set(Some(Notice::error(msg))),
                Ok(Settled::Discarded) => return,
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="max-w-lg mx-auto">
            <Card title="Confirm attendance">
                <Alert notice=notice />
                <form class="space-y-4" on:submit=on_submit>
                    <div class="form-control">
                        <label class="label" for="event_qr_code">
                            <span class="label-text">"Event QR code contents"</span>
                        </label>
                        <textarea
                            id="event_qr_code"
                            class="textarea textarea-bordered w-full"
                            rows="3"
                            on:input=move |ev| qr_text.set(event_target_value(&ev))
                            prop:value=move || qr_text.get()
                        ></textarea>
                    </div>
                    <div class="divider">"or"</div>
                    <div class="form-control">
                        <label class="label" for="attendance_code">
                            <span class="label-text">"Attendance code"</span>
                        </label>
                        <input
                            id="attendance_code"
                            type="text"
                            class="input input-bordered w-full"
                            on:input=move |ev| code.set(event_target_value(&ev))
                            prop:value=move || code.get()
                        />
                    </div>
                    <button class="btn btn-primary w-full" disabled=move || is_submitting.get()>
                        "Confirm attendance"
                    </button>
                </form>
            </Card>
        </div>
    }
}
