//! 签到二维码解析
//!
//! 扫码或手动输入得到的文本在本地解析，解析失败不会发出任何请求。

use campusconnect_shared::Id;
use campusconnect_shared::protocol::{CheckInRequest, ConfirmAttendanceRequest};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QrParseError {
    #[error("Please scan a QR code or enter its contents.")]
    Empty,
    #[error("Invalid QR code. The payload could not be read.")]
    Malformed,
    #[error("Invalid QR code format. Registration or token is missing.")]
    MissingFields,
}

/// 二维码载荷 `{registration_id, token, event_id?}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    pub registration_id: Id,
    pub token: String,
    pub event_id: Option<Id>,
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    registration_id: Option<Value>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    event_id: Option<Value>,
}

/// 数字或数字字符串
fn id_of(value: &Value) -> Option<Id> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl QrPayload {
    pub fn parse(raw: &str) -> Result<Self, QrParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(QrParseError::Empty);
        }

        let payload: RawPayload = match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => {
                serde_json::from_value(value).map_err(|_| QrParseError::MissingFields)?
            }
            _ => return Err(QrParseError::Malformed),
        };

        let registration_id = payload
            .registration_id
            .as_ref()
            .and_then(id_of)
            .ok_or(QrParseError::MissingFields)?;
        let token = payload
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(QrParseError::MissingFields)?;

        Ok(Self {
            registration_id,
            token,
            event_id: payload.event_id.as_ref().and_then(id_of),
        })
    }

    /// 构造签到请求；操作员选择的活动优先于载荷里的活动
    pub fn to_request(&self, selected_event: Option<Id>) -> CheckInRequest {
        CheckInRequest {
            registration_id: self.registration_id,
            event_id: selected_event.or(self.event_id),
            token: self.token.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceInputError {
    #[error("Please scan a QR code or enter an attendance code.")]
    Missing,
}

/// 出勤确认：活动二维码与出勤码至少提供一个
pub fn attendance_request(
    event_qr_code: &str,
    attendance_code: &str,
) -> Result<ConfirmAttendanceRequest, AttendanceInputError> {
    let qr = event_qr_code.trim();
    let code = attendance_code.trim();
    if qr.is_empty() && code.is_empty() {
        return Err(AttendanceInputError::Missing);
    }
    Ok(ConfirmAttendanceRequest {
        event_qr_code: qr.to_string(),
        attendance_code: (!code.is_empty()).then(|| code.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_string_ids() {
        let payload = QrPayload::parse(r#"{"registration_id": 12, "token": "tk", "event_id": "4"}"#)
            .unwrap();
        assert_eq!(
            payload,
            QrPayload {
                registration_id: 12,
                token: "tk".into(),
                event_id: Some(4),
            }
        );
        let payload = QrPayload::parse(r#" {"registration_id": "12", "token": "tk"} "#).unwrap();
        assert_eq!(payload.registration_id, 12);
        assert_eq!(payload.event_id, None);
    }

    #[test]
    fn rejects_bad_payloads_locally() {
        assert_eq!(QrPayload::parse("   "), Err(QrParseError::Empty));
        assert_eq!(QrPayload::parse("REG-12-abc"), Err(QrParseError::Malformed));
        assert_eq!(QrPayload::parse("[1, 2]"), Err(QrParseError::Malformed));
        assert_eq!(
            QrPayload::parse(r#"{"token": "tk"}"#),
            Err(QrParseError::MissingFields)
        );
        assert_eq!(
            QrPayload::parse(r#"{"registration_id": 3, "token": ""}"#),
            Err(QrParseError::MissingFields)
        );
        assert_eq!(
            QrPayload::parse(r#"{"registration_id": 3, "token": 7}"#),
            Err(QrParseError::MissingFields)
        );
    }

    #[test]
    fn selected_event_wins_over_payload() {
        let payload = QrPayload::parse(r#"{"registration_id": 1, "token": "t", "event_id": 9}"#)
            .unwrap();
        assert_eq!(payload.to_request(Some(2)).event_id, Some(2));
        assert_eq!(payload.to_request(None).event_id, Some(9));
    }

    #[test]
    fn attendance_needs_a_qr_or_code() {
        assert_eq!(attendance_request(" ", ""), Err(AttendanceInputError::Missing));
        let req = attendance_request("", "ABC123").unwrap();
        assert_eq!(req.event_qr_code, "");
        assert_eq!(req.attendance_code.as_deref(), Some("ABC123"));
    }
}
