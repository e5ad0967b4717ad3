//! Mixins reading configured settings.
//!
//! Settings can only be configured once per process, so every test here
//! shares the configuration installed by `configure`.

use std::sync::Once;

use async_trait::async_trait;
use http::StatusCode;

use brackets_auth::{AbstractUser, RequestUserExt};
use brackets_core::{Settings, SETTINGS};
use brackets_http::{HttpRequest, HttpResponse};
use brackets_mixins::access::PassesTestMixin;
use brackets_mixins::{RecentLoginRequired, RedirectToLoginMixin, SslRequired};
use brackets_views::{CsrfViewMiddleware, View};

static CONFIGURE: Once = Once::new();

fn configure() {
    CONFIGURE.call_once(|| {
        SETTINGS.configure(Settings {
            debug: true,
            login_url: "/sso/login/".to_string(),
            redirect_field_name: "return_to".to_string(),
            csrf_cookie_name: "xsrf".to_string(),
            ..Settings::default()
        });
    });
}

struct Account;

#[async_trait]
impl View for Account {
    async fn get(&self, _request: HttpRequest) -> HttpResponse {
        HttpResponse::ok("account")
    }
}

struct UsesSettings;
impl RedirectToLoginMixin for UsesSettings {}

#[test]
fn test_login_url_falls_back_to_settings() {
    configure();
    assert_eq!(UsesSettings.get_login_url().unwrap(), "/sso/login/");

    let request = HttpRequest::builder().path("/account/").build();
    let response = UsesSettings.redirect_to_login(&request).unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        Some("/sso/login/?return_to=/account/")
    );
}

#[tokio::test]
async fn test_ssl_not_required_in_debug() {
    configure();
    let request = HttpRequest::builder().path("/account/").build();
    let response = PassesTestMixin::new(Account, SslRequired::default())
        .dispatch(request)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stale_login_redirects_to_configured_login_url() {
    configure();
    let mut request = HttpRequest::builder().path("/account/").build();
    request.set_user(AbstractUser::new("ada"));
    let response = PassesTestMixin::new(Account, RecentLoginRequired::default())
        .dispatch(request)
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.header("location"), Some("/sso/login/"));
}

#[test]
fn test_csrf_cookie_name_from_settings() {
    configure();
    let middleware = CsrfViewMiddleware::new();
    assert_eq!(middleware.cookie_name, "xsrf");

    let request = HttpRequest::builder()
        .method(http::Method::POST)
        .header("cookie", "xsrf=tok123")
        .header("X-CSRFToken", "tok123")
        .build();
    assert!(middleware.process_view(&request, &Account).is_none());
}
