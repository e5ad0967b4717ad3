//! Integration tests for stacked mixins.
//!
//! Views are built the way an application would build them: data mixins
//! feeding a list or form view, wrapped in gates and header mixins, and
//! served through `as_view`.

use std::collections::HashMap;

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::{json, Value};

use brackets_auth::session_auth;
use brackets_auth::{AbstractUser, RequestUser, RequestUserExt};
use brackets_core::DjangoResult;
use brackets_db::QuerySet;
use brackets_http::{HttpRequest, HttpResponse};
use brackets_mixins::{
    DispatchTest, OrderableListMixin, PassOrRedirect, RedirectToLoginMixin, SelectRelatedMixin,
    StaticContextMixin, ViewExt,
};
use brackets_views::views::generic::{ListView, MultipleObjectMixin};
use brackets_views::{ContextMixin, CsrfViewMiddleware, View};

// ── A list view built from data mixins ──────────────────────────────

struct ArticleList;

impl SelectRelatedMixin for ArticleList {
    fn select_related(&self) -> &[&str] {
        &["author"]
    }
}

impl OrderableListMixin for ArticleList {
    fn orderable_fields(&self) -> &[&str] {
        &["title", "id"]
    }

    fn orderable_field_default(&self) -> &str {
        "id"
    }
}

impl StaticContextMixin for ArticleList {
    fn static_context(&self) -> HashMap<String, Value> {
        HashMap::from([("page_title".to_string(), json!("Articles"))])
    }
}

impl MultipleObjectMixin for ArticleList {
    fn model(&self) -> Option<&str> {
        Some("blog.Article")
    }

    fn get_queryset(&self, request: &HttpRequest) -> DjangoResult<QuerySet> {
        let queryset = self.select_related_queryset(self.base_queryset()?)?;
        self.orderable_queryset(request, queryset)
    }
}

impl ContextMixin for ArticleList {
    fn get_context_data(
        &self,
        _request: &HttpRequest,
        _kwargs: &HashMap<String, String>,
    ) -> DjangoResult<HashMap<String, Value>> {
        self.with_static_context(HashMap::new())
    }
}

#[async_trait]
impl ListView for ArticleList {
    async fn load_rows(&self, queryset: &QuerySet) -> DjangoResult<Vec<Value>> {
        assert_eq!(queryset.get_select_related(), ["author"]);
        Ok(vec![
            json!({"id": 1, "title": "Borrowing"}),
            json!({"id": 2, "title": "Async"}),
            json!({"id": 3, "title": "Closures"}),
        ])
    }
}

#[async_trait]
impl View for ArticleList {
    fn allowed_methods(&self) -> Vec<Method> {
        vec![Method::GET, Method::HEAD, Method::OPTIONS]
    }

    async fn get(&self, request: HttpRequest) -> HttpResponse {
        self.list(request).await
    }
}

fn get(path_and_query: &str) -> HttpRequest {
    let (path, query) = path_and_query.split_once('?').unwrap_or((path_and_query, ""));
    HttpRequest::builder().path(path).query_string(query).build()
}

fn logged_in(mut request: HttpRequest, user: AbstractUser) -> HttpRequest {
    session_auth::login_to_session(&mut request, user);
    request
}

fn titles(response: &HttpResponse) -> Vec<String> {
    let body: Value = serde_json::from_slice(response.content_bytes()).unwrap();
    body["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_view_orders_from_query_string() {
    let view = ArticleList.as_view();

    let response = view(get("/articles/?order_by=title&order_dir=desc")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(titles(&response), ["Closures", "Borrowing", "Async"]);

    let response = view(get("/articles/")).await;
    assert_eq!(titles(&response), ["Borrowing", "Async", "Closures"]);

    let body: Value = serde_json::from_slice(response.content_bytes()).unwrap();
    assert_eq!(body["page_title"], json!("Articles"));
}

#[tokio::test]
async fn test_list_view_ignores_unknown_ordering() {
    let response = ArticleList.dispatch(get("/articles/?order_by=secret")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(titles(&response).len(), 3);
}

// ── Stacked gates ────────────────────────────────────────────────────

#[tokio::test]
async fn test_stacked_gates_and_headers() {
    let view = ArticleList
        .with_headers(&[("X-Frame-Options", "DENY")])
        .unwrap()
        .never_cache()
        .staff_required()
        .login_required()
        .as_view();

    let response = view(get("/articles/")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.header("x-frame-options").is_none());

    let response = view(logged_in(get("/articles/"), AbstractUser::new("ada"))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = view(logged_in(get("/articles/"), AbstractUser::new("ada").staff())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
    assert!(response.header("cache-control").unwrap().contains("no-store"));
}

#[tokio::test]
async fn test_gates_keep_allowed_methods() {
    let view = ArticleList.group_required("editors").login_required();
    assert_eq!(view.allowed_methods(), ArticleList.allowed_methods());

    let editor = logged_in(
        HttpRequest::builder().method(Method::POST).path("/articles/").build(),
        AbstractUser::new("ada").with_groups(&["editors"]),
    );
    let response = view.dispatch(editor).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header("allow"), Some("GET, HEAD, OPTIONS"));
}

#[tokio::test]
async fn test_permission_gate_with_closure_gate() {
    let view = ArticleList
        .permission_required("blog.view_article")
        .user_passes_test(|request: &HttpRequest| request.header("x-api-client").is_some());

    let mut request = get("/articles/");
    request.set_user(AbstractUser::new("ada").with_permissions(&["blog.view_article"]));
    assert_eq!(view.dispatch(request).await.status(), StatusCode::BAD_REQUEST);

    let mut request = HttpRequest::builder()
        .path("/articles/")
        .header("X-Api-Client", "cli")
        .build();
    request.set_user(AbstractUser::new("ada").with_permissions(&["blog.view_article"]));
    assert_eq!(view.dispatch(request).await.status(), StatusCode::OK);
}

// ── Custom gates ─────────────────────────────────────────────────────

struct MembersOnly;

impl RedirectToLoginMixin for MembersOnly {
    fn login_url(&self) -> &str {
        "/members/login/"
    }
}

#[async_trait]
impl DispatchTest for MembersOnly {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        Ok(request.is_user_authenticated())
    }

    async fn handle_test_failure(&self, request: HttpRequest) -> DjangoResult<HttpResponse> {
        self.redirect_to_login(&request)
    }
}

#[tokio::test]
async fn test_custom_gate_redirects_to_login() {
    let view = ArticleList.passes_test(MembersOnly);
    let response = view.dispatch(get("/articles/?order_by=title")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        Some("/members/login/?next=/articles/%3Forder_by%3Dtitle")
    );

    let response = view
        .dispatch(logged_in(get("/articles/"), AbstractUser::new("ada")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_pass_or_redirect_sends_visitors_home() {
    let view = ArticleList.passes_test(PassOrRedirect::new(brackets_mixins::SuperuserRequired));

    let mut visitor = get("/articles/");
    visitor.set_user(RequestUser::anonymous());
    let response = view.dispatch(visitor).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.header("location"), Some("/"));

    let response = view
        .dispatch(logged_in(get("/articles/"), AbstractUser::new("ada")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recent_login_logs_out_stale_sessions() {
    let view = ArticleList.recent_login_required(60);

    let response = view
        .dispatch(logged_in(get("/articles/"), AbstractUser::new("ada")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut request = get("/articles/");
    request.set_user(
        AbstractUser::new("ada").logged_in_at(chrono::Utc::now() - chrono::Duration::minutes(5)),
    );
    let response = view.dispatch(request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

// ── CSRF ─────────────────────────────────────────────────────────────

struct Webhook;

#[async_trait]
impl View for Webhook {
    async fn post(&self, _request: HttpRequest) -> HttpResponse {
        HttpResponse::ok("received")
    }
}

#[test]
fn test_csrf_exemption_survives_wrapping() {
    let middleware = CsrfViewMiddleware::new();
    let request = HttpRequest::builder().method(Method::POST).path("/hook/").build();

    let guarded = Webhook.never_cache();
    assert!(middleware.process_view(&request, &guarded).is_some());

    let exempt = Webhook.exempt_csrf().never_cache().ssl_required();
    assert!(exempt.csrf_exempt());
    assert!(middleware.process_view(&request, &exempt).is_none());
}
