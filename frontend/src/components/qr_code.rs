//! 报名二维码
//!
//! 图片由二维码接口获取：图片响应转成 base64 data URL，JSON 响应直接使用其中的
//! data URL，其它内容按原始载荷以文本展示，供手动输入签到。

use crate::components::ui::{Card, Loading, StatusBadge, local_datetime};
use crate::context::{use_dispatcher, use_store};
use crate::web::Interval;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use campusconnect::store::QrCodeImage;
use campusconnect_shared::date::countdown;
use campusconnect_shared::{Id, RegistrationStatus};
use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 可直接显示的二维码
#[derive(Debug, Clone, PartialEq)]
enum QrDisplay {
    Image(String),
    Text(String),
}

impl From<QrCodeImage> for QrDisplay {
    fn from(image: QrCodeImage) -> Self {
        match image {
            QrCodeImage::Image { mime, bytes } => {
                Self::Image(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
            }
            QrCodeImage::Payload(value) if value.starts_with("data:") => Self::Image(value),
            QrCodeImage::Payload(value) => Self::Text(value),
        }
    }
}

#[component]
pub fn QrCodePage(id: Id) -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let registrations = store.registrations.0;
    let qr = RwSignal::new(Option::<QrDisplay>::None);
    let qr_error = RwSignal::new(Option::<String>::None);
    let now = RwSignal::new(Utc::now());

    registrations.update(|s| s.clear_current());
    spawn_local(async move {
        dispatcher.get_registration(&store.registrations, id).await;
        match dispatcher.fetch_qr_code(id).await {
            Ok(image) if dispatcher.lifetime().is_alive() => qr.set(Some(image.into())),
            Ok(_) => {}
            Err(e) if dispatcher.lifetime().is_alive() => {
                log::warn!("[QR] failed to load QR code for registration {}: {}", id, e);
                qr_error.set(Some(e.user_message()));
            }
            Err(_) => {}
        }
    });

    // 倒计时每秒刷新，组件卸载时停止
    let ticker = StoredValue::new_local(Interval::new(1_000, move || {
        let _ = now.try_set(Utc::now());
    }));
    on_cleanup(move || {
        ticker.try_update_value(|t| t.take());
    });

    let registration = move || registrations.with(|s| s.current.clone().filter(|r| r.id == id));
    let remaining = move || {
        registration().and_then(|r| r.qr_code_expires_at).map(|at| countdown(&at, now.get()))
    };

    view! {
        <div class="max-w-md mx-auto space-y-4">
            <Link to=AppRoute::MyRegistrations.to_path() class="link">"← My Registrations"</Link>
            {move || match registration() {
                None if registrations.with(|s| s.is_loading) => view! { <Loading /> }.into_any(),
                None => view! {
                    <div role="alert" class="alert alert-error">
                        {registrations.with(|s| s.error.clone()).unwrap_or_else(|| "Registration not found.".to_string())}
                    </div>
                }.into_any(),
                Some(reg) => {
                    let checked_in = reg.status == RegistrationStatus::CheckedIn;
                    let checked_at = format!("Checked in at {}", local_datetime(reg.checked_in_at.as_ref()));
                    view! {
                        <Card title=reg.event_name().to_string()>
                            <p class="text-sm">{local_datetime(reg.event_start().as_ref())}</p>
                            <div><StatusBadge status=reg.status.clone() /></div>
                            <Show when=move || checked_in>
                                <p class="text-success">{checked_at.clone()}</p>
                            </Show>
                        </Card>
                    }.into_any()
                }
            }}

            <Card>
                {move || match remaining() {
                    Some(None) => view! {
                        <div role="alert" class="alert alert-warning">"This QR code has expired."</div>
                    }.into_any(),
                    _ => {
                        let expires = remaining().flatten().map(|left| view! {
                            <p class="text-center text-sm">{format!("Expires in {}", left)}</p>
                        });
                        view! {
                            {move || match qr.get() {
                                Some(QrDisplay::Image(src)) => view! {
                                    <img src=src alt="Registration QR code" class="mx-auto w-64 h-64" />
                                }.into_any(),
                                Some(QrDisplay::Text(payload)) => view! {
                                    <p class="text-sm">"Show this code at the entrance:"</p>
                                    <code class="block break-all bg-base-200 p-2 rounded">{payload}</code>
                                }.into_any(),
                                None => match qr_error.get() {
                                    Some(e) => view! { <div role="alert" class="alert alert-error">{e}</div> }.into_any(),
                                    None => view! { <Loading text="Generating QR code..." /> }.into_any(),
                                },
                            }}
                            {expires}
                        }.into_any()
                    }
                }}
            </Card>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_bytes_become_a_data_url() {
        let display = QrDisplay::from(QrCodeImage::Image {
            mime: "image/png".into(),
            bytes: vec![1, 2, 3],
        });
        assert_eq!(display, QrDisplay::Image("data:image/png;base64,AQID".into()));
    }

    #[test]
    fn payloads_keep_data_urls_and_fall_back_to_text() {
        let url = "data:image/png;base64,AAAA".to_string();
        assert_eq!(
            QrDisplay::from(QrCodeImage::Payload(url.clone())),
            QrDisplay::Image(url)
        );
        assert_eq!(
            QrDisplay::from(QrCodeImage::Payload("{\"token\":\"t\"}".into())),
            QrDisplay::Text("{\"token\":\"t\"}".into())
        );
    }
}
