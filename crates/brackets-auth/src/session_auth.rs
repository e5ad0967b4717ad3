//! Storing the logged-in user in the session.
//!
//! Session data travels in the `SESSION_DATA` META entry as a JSON object;
//! the session layer persists it when `SESSION_MODIFIED` is `"true"`.
//! Logging in or out also updates the user attached to the request.

use chrono::Utc;

use brackets_http::HttpRequest;

use crate::request_user::RequestUserExt;
use crate::user::{AbstractUser, RequestUser};

/// Session key holding the logged-in username.
pub const SESSION_USER_KEY: &str = "_auth_user_id";
/// Session key holding the name of the backend that authenticated the user.
pub const SESSION_BACKEND_KEY: &str = "_auth_user_backend";

const META_SESSION_DATA: &str = "SESSION_DATA";
const META_SESSION_MODIFIED: &str = "SESSION_MODIFIED";
const META_USER_AUTHENTICATED: &str = "USER_AUTHENTICATED";

fn read_session(request: &HttpRequest) -> serde_json::Map<String, serde_json::Value> {
    request
        .meta()
        .get(META_SESSION_DATA)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

fn write_session(
    request: &mut HttpRequest,
    data: &serde_json::Map<String, serde_json::Value>,
    authenticated: bool,
) {
    let meta = request.meta_mut();
    meta.insert(
        META_SESSION_DATA.to_string(),
        serde_json::Value::Object(data.clone()).to_string(),
    );
    meta.insert(META_SESSION_MODIFIED.to_string(), "true".to_string());
    meta.insert(
        META_USER_AUTHENTICATED.to_string(),
        authenticated.to_string(),
    );
}

/// Logs `user` in: records them in the session, stamps `last_login` and
/// attaches them to the request.
pub fn login_to_session(request: &mut HttpRequest, mut user: AbstractUser) {
    let mut data = read_session(request);
    data.insert(SESSION_USER_KEY.to_string(), user.username.clone().into());
    data.insert(SESSION_BACKEND_KEY.to_string(), "brackets.auth.ModelBackend".into());
    write_session(request, &data, true);

    user.last_login = Some(Utc::now());
    tracing::debug!(username = %user.username, "user logged in");
    request.set_user(user);
}

/// Logs the current user out: removes the auth keys from the session and
/// attaches the anonymous user.
pub fn logout_from_session(request: &mut HttpRequest) {
    let mut data = read_session(request);
    data.remove(SESSION_USER_KEY);
    data.remove(SESSION_BACKEND_KEY);
    write_session(request, &data, false);

    if let Some(user) = request.user().filter(|u| u.is_authenticated()) {
        tracing::debug!(username = %user.get_username(), "user logged out");
    }
    request.set_user(RequestUser::anonymous());
}

/// Returns `true` if the session says a user is logged in.
pub fn is_authenticated(request: &HttpRequest) -> bool {
    request
        .meta()
        .get(META_USER_AUTHENTICATED)
        .is_some_and(|v| v == "true")
}

/// Returns the username stored in the session.
pub fn session_user_id(request: &HttpRequest) -> Option<String> {
    read_session(request)
        .get(SESSION_USER_KEY)
        .and_then(|v| v.as_str())
        .map(String::from)
}
