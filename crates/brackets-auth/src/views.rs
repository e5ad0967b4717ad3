//! Login redirects and logout.

use brackets_core::{Settings, SETTINGS};
use brackets_http::{HttpRequest, HttpResponse, HttpResponseRedirect, QueryDict};

use crate::session_auth;

/// Returns the configured login URL, or the default one before settings
/// are configured.
pub fn default_login_url() -> String {
    SETTINGS
        .try_get()
        .map_or_else(|| Settings::default().login_url, |s| s.login_url.clone())
}

/// Redirects (302) to `login_url`, passing `next` in the query parameter
/// named `redirect_field_name`.
///
/// A query string already present on `login_url` is kept, with the
/// redirect parameter replaced. `/` is left unescaped in the value.
///
/// # Examples
///
/// ```
/// use brackets_auth::views::redirect_to_login;
///
/// let response = redirect_to_login("/secret/", "/accounts/login/", Some("next"));
/// assert_eq!(response.header("location"), Some("/accounts/login/?next=/secret/"));
/// ```
pub fn redirect_to_login(
    next: &str,
    login_url: &str,
    redirect_field_name: Option<&str>,
) -> HttpResponse {
    let (url, fragment) = login_url
        .split_once('#')
        .map_or((login_url, None), |(u, f)| (u, Some(f)));
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    let mut location = path.to_string();
    let query = match redirect_field_name.filter(|name| !name.is_empty()) {
        Some(field) => {
            let mut querystring = QueryDict::parse(query);
            querystring.set(field, next);
            querystring.urlencode_safe("/")
        }
        None => query.to_string(),
    };
    if !query.is_empty() {
        location.push('?');
        location.push_str(&query);
    }
    if let Some(fragment) = fragment {
        location.push('#');
        location.push_str(fragment);
    }

    tracing::debug!(%location, "redirecting to login");
    HttpResponseRedirect::new(&location)
}

/// Logs the request's user out, then redirects (302) to `login_url`, or to
/// the configured login URL when `None`.
pub fn logout_then_login(mut request: HttpRequest, login_url: Option<&str>) -> HttpResponse {
    session_auth::logout_from_session(&mut request);
    let target = login_url.map_or_else(default_login_url, String::from);
    HttpResponseRedirect::new(&target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_user::RequestUserExt;
    use crate::user::AbstractUser;
    use http::StatusCode;

    #[test]
    fn test_redirect_to_login_basic() {
        let response = redirect_to_login("/a/b/?page=2", "/login/", Some("next"));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.header("location"),
            Some("/login/?next=/a/b/%3Fpage%3D2")
        );
    }

    #[test]
    fn test_redirect_to_login_keeps_existing_query() {
        let response = redirect_to_login("/x/", "/login/?lang=en&next=/old/", Some("next"));
        assert_eq!(
            response.header("location"),
            Some("/login/?lang=en&next=/x/")
        );
    }

    #[test]
    fn test_redirect_to_login_custom_field_and_fragment() {
        let response = redirect_to_login("/x/", "https://sso.example.com/auth#top", Some("return_to"));
        assert_eq!(
            response.header("location"),
            Some("https://sso.example.com/auth?return_to=/x/#top")
        );
    }

    #[test]
    fn test_redirect_to_login_without_field() {
        let response = redirect_to_login("/x/", "/login/", None);
        assert_eq!(response.header("location"), Some("/login/"));
    }

    #[test]
    fn test_logout_then_login() {
        let mut request = HttpRequest::builder().build();
        session_auth::login_to_session(&mut request, AbstractUser::new("ada"));
        assert!(request.is_user_authenticated());

        let response = logout_then_login(request, Some("/signin/"));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.header("location"), Some("/signin/"));
    }
}
