use super::{Dispatcher, RegistrationsState, Settled, StateCell, dispatch};
use crate::checkin::{AttendanceInputError, QrParseError, QrPayload, attendance_request};
use crate::error::ApiError;
use crate::request::{HttpMethod, HttpTransport};
use crate::storage::KeyValueStore;
use campusconnect_shared::protocol::{
    CreateRegistrationRequest, GetRegistrationRequest, ListAdminRegistrationsRequest,
    ListMyRegistrationsRequest, RegistrationTransition, TransitionRegistrationRequest,
    qr_code_image_path,
};
use campusconnect_shared::{AttendanceResponse, CheckInResponse, Id, Registration};
use serde::Deserialize;

/// 二维码图片接口的两种响应
#[derive(Debug, Clone, PartialEq)]
pub enum QrCodeImage {
    /// 图片字节及其 MIME 类型
    Image { mime: String, bytes: Vec<u8> },
    /// JSON `{qr_code}`，内容可能是 data URL 或原始载荷
    Payload(String),
}

#[derive(Deserialize)]
struct QrCodeBody {
    qr_code: String,
}

impl<T: HttpTransport, S: KeyValueStore> Dispatcher<T, S> {
    async fn load_list<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        action: &str,
        admin: Option<ListAdminRegistrationsRequest>,
    ) -> Settled<Vec<Registration>> {
        let client = &self.client;
        let fut = async move {
            let resp = match &admin {
                Some(req) => client.call(req).await?,
                None => client.call(&ListMyRegistrationsRequest).await?,
            };
            Ok::<_, ApiError>(resp.into_items())
        };

        dispatch(cell, &self.lifetime, action, fut, |state, items| {
            state.set_items(items.clone());
        })
        .await
    }

    /// 当前用户的报名
    pub async fn get_my_registrations<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
    ) -> Settled<Vec<Registration>> {
        self.load_list(cell, "registrations/getUserRegistrations", None)
            .await
    }

    /// 管理端列表，可按活动/状态/用户筛选
    pub async fn get_admin_registrations<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        filter: ListAdminRegistrationsRequest,
    ) -> Settled<Vec<Registration>> {
        self.load_list(cell, "registrations/getAdminRegistrations", Some(filter))
            .await
    }

    pub async fn get_registrations_by_event<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        event_id: Id,
    ) -> Settled<Vec<Registration>> {
        let filter = ListAdminRegistrationsRequest {
            event_id: Some(event_id),
            ..Default::default()
        };
        self.load_list(cell, "registrations/byEvent", Some(filter))
            .await
    }

    pub async fn get_registrations_by_user<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        user_id: Id,
    ) -> Settled<Vec<Registration>> {
        let filter = ListAdminRegistrationsRequest {
            user_id: Some(user_id),
            ..Default::default()
        };
        self.load_list(cell, "registrations/byUser", Some(filter))
            .await
    }

    pub async fn get_registration<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        id: Id,
    ) -> Settled<Registration> {
        let client = &self.client;
        let fut = async move { client.call(&GetRegistrationRequest { id }).await };

        dispatch(cell, &self.lifetime, "registrations/getById", fut, |state, reg| {
            state.set_current(reg.clone());
        })
        .await
    }

    pub async fn register_for_event<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        event_id: Id,
    ) -> Settled<Registration> {
        let client = &self.client;
        let fut = async move { client.call(&CreateRegistrationRequest { event_id }).await };

        dispatch(cell, &self.lifetime, "registrations/registerForEvent", fut, |state, reg| {
            state.upsert(reg.clone());
        })
        .await
    }

    async fn transition<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        id: Id,
        transition: RegistrationTransition,
        action: &str,
    ) -> Settled<Registration> {
        let client = &self.client;
        let req = TransitionRegistrationRequest::new(id, transition);
        let fut = async move { client.call(&req).await };

        dispatch(cell, &self.lifetime, action, fut, |state, reg| {
            state.replace(reg.clone());
        })
        .await
    }

    pub async fn cancel_registration<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        id: Id,
    ) -> Settled<Registration> {
        self.transition(cell, id, RegistrationTransition::Cancel, "registrations/cancel")
            .await
    }

    pub async fn approve_registration<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        id: Id,
    ) -> Settled<Registration> {
        self.transition(cell, id, RegistrationTransition::Approve, "registrations/approve")
            .await
    }

    pub async fn reject_registration<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        id: Id,
    ) -> Settled<Registration> {
        self.transition(cell, id, RegistrationTransition::Reject, "registrations/reject")
            .await
    }

    /// 扫码签到
    ///
    /// 载荷先在本地解析，失败直接返回 `Err`，不发请求。成功时只用服务端返回的
    /// `status` 和 `checked_in_at` 更新本地同 id 的报名。
    pub async fn check_in<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        raw_payload: &str,
        selected_event: Option<Id>,
    ) -> Result<Settled<CheckInResponse>, QrParseError> {
        let req = QrPayload::parse(raw_payload)?.to_request(selected_event);
        let client = &self.client;
        let fut = async move { client.call(&req).await };

        let settled = dispatch(cell, &self.lifetime, "registrations/checkIn", fut, |state, resp| {
            let checked = resp.registration();
            state.modify(checked.id, |reg| {
                reg.status = checked.status.clone();
                reg.checked_in_at = checked.checked_in_at;
            });
        })
        .await;
        Ok(settled)
    }

    /// 用户通过活动二维码或出勤码确认出勤
    pub async fn confirm_attendance<C: StateCell<RegistrationsState>>(
        &self,
        cell: &C,
        event_qr_code: &str,
        attendance_code: &str,
    ) -> Result<Settled<AttendanceResponse>, AttendanceInputError> {
        let req = attendance_request(event_qr_code, attendance_code)?;
        let client = &self.client;
        let fut = async move { client.call(&req).await };

        let settled = dispatch(
            cell,
            &self.lifetime,
            "registrations/confirmAttendance",
            fut,
            |state, resp| {
                if let Some(reg) = &resp.registration {
                    state.replace(reg.clone());
                }
            },
        )
        .await;
        Ok(settled)
    }

    /// 报名二维码图片，不写入切片
    pub async fn fetch_qr_code(&self, id: Id) -> Result<QrCodeImage, ApiError> {
        let resp = self
            .client
            .fetch(HttpMethod::Get, &qr_code_image_path(id), None)
            .await?;

        match resp.content_type.as_deref() {
            Some(mime) if mime.starts_with("image/") => Ok(QrCodeImage::Image {
                mime: mime.to_string(),
                bytes: resp.body,
            }),
            _ => {
                let body: QrCodeBody = resp.json()?;
                Ok(QrCodeImage::Payload(body.qr_code))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::TestContext;
    use crate::request::HttpResponse;
    use crate::store::LifetimeToken;
    use campusconnect_shared::RegistrationStatus;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn registration(id: Id, status: &str) -> Registration {
        serde_json::from_value(json!({
            "id": id,
            "status": status,
            "user": {"id": 1, "name": "Jane", "email": "jane@uni.edu"},
            "event": {"id": 4, "name": "Open Day"}
        }))
        .unwrap()
    }

    fn setup() -> (TestContext, Rc<RefCell<RegistrationsState>>) {
        let ctx = TestContext::new();
        ctx.sign_in("a1", Some("r1"));
        let cell = Rc::new(RefCell::new(RegistrationsState::default()));
        cell.borrow_mut()
            .set_items(vec![registration(12, "registered"), registration(13, "registered")]);
        (ctx, cell)
    }

    #[tokio::test]
    async fn test_check_in_updates_status_from_server() {
        let (ctx, cell) = setup();
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/registrations/check-in/"),
            200,
            json!({
                "message": "Check-in successful",
                "registration": {"id": 12, "status": "checked_in", "checked_in_at": "2030-01-01T10:05:00Z"}
            }),
        );
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        let settled = dispatcher
            .check_in(&cell, r#"{"registration_id": 12, "token": "tk", "event_id": 9}"#, Some(4))
            .await
            .unwrap();

        assert_eq!(
            settled.ok().and_then(|r| r.message().map(str::to_string)),
            Some("Check-in successful".to_string())
        );
        let sent = ctx
            .transport
            .requests_to(HttpMethod::Post, &TestContext::url("/registrations/check-in/"));
        let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"registration_id": 12, "event_id": 4, "token": "tk"}));

        let state = cell.borrow();
        let reg = state.find(12).unwrap();
        assert_eq!(reg.status, RegistrationStatus::CheckedIn);
        assert!(reg.checked_in_at.is_some());
        // 嵌套的用户/活动信息保持不变
        assert_eq!(reg.user_name(), "Jane");
        assert_eq!(state.find(13).unwrap().status, RegistrationStatus::Registered);
    }

    #[tokio::test]
    async fn test_conflict_surfaces_server_reason_verbatim() {
        let (ctx, cell) = setup();
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/registrations/check-in/"),
            409,
            json!({"detail": "already checked in"}),
        );
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        let settled = dispatcher
            .check_in(&cell, r#"{"registration_id": 12, "token": "tk"}"#, None)
            .await
            .unwrap();

        assert_eq!(settled.error(), Some("already checked in"));
        let state = cell.borrow();
        assert_eq!(state.error.as_deref(), Some("already checked in"));
        assert_eq!(state.find(12).unwrap().status, RegistrationStatus::Registered);
        assert!(state.find(12).unwrap().checked_in_at.is_none());
    }

    #[tokio::test]
    async fn test_rejected_token_message_is_shown_as_sent() {
        let (ctx, cell) = setup();
        ctx.transport.mock_response(
            HttpMethod::Post,
            &TestContext::url("/registrations/check-in/"),
            400,
            json!({"message": "Invalid token"}),
        );
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        let settled = dispatcher
            .check_in(&cell, r#"{"registration_id": 12, "token": "stale"}"#, Some(3))
            .await
            .unwrap();

        assert_eq!(settled.error(), Some("Invalid token"));
        assert_eq!(cell.borrow().error.as_deref(), Some("Invalid token"));
        assert!(cell.borrow().find(12).unwrap().checked_in_at.is_none());
    }

    #[tokio::test]
    async fn test_bad_payload_never_hits_the_network() {
        let (ctx, cell) = setup();
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        assert_eq!(
            dispatcher.check_in(&cell, "", None).await.unwrap_err(),
            QrParseError::Empty
        );
        assert_eq!(
            dispatcher.check_in(&cell, "not json", None).await.unwrap_err(),
            QrParseError::Malformed
        );
        assert!(ctx.transport.requests.borrow().is_empty());
        assert!(!cell.borrow().is_loading);
    }

    #[tokio::test]
    async fn test_cancel_replaces_registration() {
        let (ctx, cell) = setup();
        ctx.transport.mock_response(
            HttpMethod::Put,
            &TestContext::url("/registrations/13/cancel/"),
            200,
            json!({"id": 13, "status": "cancelled"}),
        );
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        assert!(dispatcher.cancel_registration(&cell, 13).await.is_fulfilled());
        assert_eq!(
            cell.borrow().find(13).unwrap().status,
            RegistrationStatus::Cancelled
        );
        let sent = ctx
            .transport
            .requests_to(HttpMethod::Put, &TestContext::url("/registrations/13/cancel/"));
        assert_eq!(sent[0].body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_qr_code_image_or_payload() {
        let ctx = TestContext::new();
        ctx.sign_in("a1", Some("r1"));
        ctx.transport.mock_raw(
            HttpMethod::Get,
            &TestContext::url("/registrations/3/qr-code/"),
            HttpResponse::new(200, vec![0x89, b'P', b'N', b'G']).with_content_type("image/png"),
        );
        ctx.transport.mock_response(
            HttpMethod::Get,
            &TestContext::url("/registrations/4/qr-code/"),
            200,
            json!({"qr_code": "data:image/png;base64,AAAA"}),
        );
        let dispatcher = Dispatcher::new(ctx.client.clone(), LifetimeToken::detached());

        assert_eq!(
            dispatcher.fetch_qr_code(3).await.unwrap(),
            QrCodeImage::Image {
                mime: "image/png".into(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            }
        );
        assert_eq!(
            dispatcher.fetch_qr_code(4).await.unwrap(),
            QrCodeImage::Payload("data:image/png;base64,AAAA".into())
        );
    }
}
