use crate::{
    AttendanceResponse, CheckInResponse, Event, EventPayload, Id, ListResponse, ProfileUpdate,
    RefreshResponse, RegisterResponse, Registration, RegistrationStatus, Role, TokenPair, User,
    UserChanges,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// The request value itself is serialized as the JSON body for methods that carry one.
/// Path parameters are marked `#[serde(skip)]` so they never leak into the body.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path relative to the API root, including any query string.
    fn path(&self) -> String;
}

/// Appends `pairs` to `path` as an urlencoded query string.
fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
    format!("{}?{}", path, query.finish())
}

pub const REFRESH_PATH: &str = "/auth/refresh/";

/// Path of the PNG rendering of a registration's QR code.
pub fn qr_code_image_path(registration_id: Id) -> String {
    format!("/registrations/{}/qr-code/", registration_id)
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = TokenPair;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/token/".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

impl ApiRequest for RefreshRequest {
    type Response = RefreshResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        REFRESH_PATH.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_code: Option<String>,
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/register/".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProfileRequest;

impl ApiRequest for GetProfileRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/auth/profile/".to_string()
    }
}

impl ApiRequest for ProfileUpdate {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/auth/profile/".to_string()
    }
}

// =========================================================
// Users (admin)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersRequest;

impl ApiRequest for ListUsersRequest {
    type Response = ListResponse<User>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/auth/users/".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserRequest {
    #[serde(skip)]
    pub id: Id,
}

impl ApiRequest for GetUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/auth/users/{}/", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(skip)]
    pub id: Id,
    #[serde(flatten)]
    pub changes: UserChanges,
}

impl ApiRequest for UpdateUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/auth/users/{}/", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(skip)]
    pub id: Id,
}

impl ApiRequest for DeleteUserRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/auth/users/{}/", self.id)
    }
}

// =========================================================
// Events
// =========================================================

/// List events. `upcoming` is a server-side filter; the client renders what comes back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListEventsRequest {
    #[serde(skip)]
    pub page: u64,
    #[serde(skip)]
    pub search: String,
    #[serde(skip)]
    pub upcoming: bool,
}

impl ApiRequest for ListEventsRequest {
    type Response = ListResponse<Event>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("search", self.search.clone()),
        ];
        if self.upcoming {
            pairs.push(("upcoming", "true".to_string()));
        }
        with_query("/events/", &pairs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEventRequest {
    #[serde(skip)]
    pub id: Id,
}

impl ApiRequest for GetEventRequest {
    type Response = Event;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/events/{}/", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreateEventRequest(pub EventPayload);

impl ApiRequest for CreateEventRequest {
    type Response = Event;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/events/create/".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(skip)]
    pub id: Id,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl ApiRequest for UpdateEventRequest {
    type Response = Event;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/events/{}/update/", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteEventRequest {
    #[serde(skip)]
    pub id: Id,
}

impl ApiRequest for DeleteEventRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/events/{}/delete/", self.id)
    }
}

// =========================================================
// Registrations
// =========================================================

/// The current user's registrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMyRegistrationsRequest;

impl ApiRequest for ListMyRegistrationsRequest {
    type Response = ListResponse<Registration>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/registrations/".to_string()
    }
}

/// Admin listing, optionally narrowed by event, status or user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListAdminRegistrationsRequest {
    #[serde(skip)]
    pub event_id: Option<Id>,
    #[serde(skip)]
    pub status: Option<RegistrationStatus>,
    #[serde(skip)]
    pub user_id: Option<Id>,
}

impl ApiRequest for ListAdminRegistrationsRequest {
    type Response = ListResponse<Registration>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(event_id) = self.event_id {
            pairs.push(("event_id", event_id.to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(user_id) = self.user_id {
            pairs.push(("user_id", user_id.to_string()));
        }
        with_query("/registrations/admin/", &pairs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRegistrationRequest {
    #[serde(skip)]
    pub id: Id,
}

impl ApiRequest for GetRegistrationRequest {
    type Response = Registration;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/registrations/{}/", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistrationRequest {
    pub event_id: Id,
}

impl ApiRequest for CreateRegistrationRequest {
    type Response = Registration;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/registrations/create/".to_string()
    }
}

/// Status transitions on a single registration. All of them `PUT` an empty object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationTransition {
    Cancel,
    Approve,
    Reject,
}

impl RegistrationTransition {
    fn segment(&self) -> &'static str {
        match self {
            RegistrationTransition::Cancel => "cancel",
            RegistrationTransition::Approve => "approve",
            RegistrationTransition::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionRegistrationRequest {
    #[serde(skip)]
    pub id: Id,
    #[serde(skip)]
    pub transition: RegistrationTransition,
}

impl TransitionRegistrationRequest {
    pub fn new(id: Id, transition: RegistrationTransition) -> Self {
        Self { id, transition }
    }
}

impl ApiRequest for TransitionRegistrationRequest {
    type Response = Registration;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/registrations/{}/{}/", self.id, self.transition.segment())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub registration_id: Id,
    pub event_id: Option<Id>,
    pub token: String,
}

impl ApiRequest for CheckInRequest {
    type Response = CheckInResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/registrations/check-in/".to_string()
    }
}

/// Self-service attendance confirmation from an event QR code or an attendance code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmAttendanceRequest {
    pub event_qr_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_code: Option<String>,
}

impl ApiRequest for ConfirmAttendanceRequest {
    type Response = AttendanceResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/registrations/confirm-attendance/".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_parameters_stay_out_of_the_body() {
        let req = TransitionRegistrationRequest::new(5, RegistrationTransition::Approve);
        assert_eq!(req.path(), "/registrations/5/approve/");
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({}));

        let req = UpdateUserRequest {
            id: 3,
            changes: UserChanges {
                is_active: Some(false),
                ..Default::default()
            },
        };
        assert_eq!(req.path(), "/auth/users/3/");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"is_active": false})
        );
    }

    #[test]
    fn event_list_query_encodes_search_and_upcoming() {
        let req = ListEventsRequest {
            page: 2,
            search: "open day".to_string(),
            upcoming: true,
        };
        assert_eq!(req.path(), "/events/?page=2&search=open+day&upcoming=true");

        let req = ListEventsRequest::default();
        assert_eq!(req.path(), "/events/?page=1&search=");
    }

    #[test]
    fn admin_registration_query_skips_unset_filters() {
        assert_eq!(
            ListAdminRegistrationsRequest::default().path(),
            "/registrations/admin/"
        );
        let req = ListAdminRegistrationsRequest {
            event_id: Some(4),
            status: Some(RegistrationStatus::Pending),
            user_id: None,
        };
        assert_eq!(req.path(), "/registrations/admin/?event_id=4&status=pending");
    }
}
