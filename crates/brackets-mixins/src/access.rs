//! Authentication and authorization gates.
//!
//! A gate is a [`DispatchTest`]: a predicate over the request plus a
//! handler for requests that fail it. [`PassesTestMixin`] wraps a view with
//! a gate. The view is only dispatched when the test passes; otherwise the
//! gate's failure handler answers instead.
//!
//! ```
//! use async_trait::async_trait;
//! use brackets_http::{HttpRequest, HttpResponse};
//! use brackets_mixins::ViewExt;
//! use brackets_views::View;
//!
//! struct Dashboard;
//!
//! #[async_trait]
//! impl View for Dashboard {
//!     async fn get(&self, _request: HttpRequest) -> HttpResponse {
//!         HttpResponse::ok("numbers")
//!     }
//! }
//!
//! let view = Dashboard.staff_required().as_view();
//! ```

use async_trait::async_trait;
use chrono::Utc;

use brackets_auth::views::logout_then_login;
use brackets_auth::{RequestUser, RequestUserExt};
use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult, SETTINGS};
use brackets_http::{HttpRequest, HttpResponse, HttpResponsePermanentRedirect};
use brackets_views::View;

use crate::redirects::RedirectMixin;

/// The test a request must pass before a view is dispatched.
#[async_trait]
pub trait DispatchTest: Send + Sync {
    /// Returns whether the request may be dispatched.
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when the gate is missing the
    /// configuration it needs.
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool>;

    /// Answers a request that failed the test. Defaults to 400 Bad Request.
    async fn handle_test_failure(&self, _request: HttpRequest) -> DjangoResult<HttpResponse> {
        Ok(HttpResponse::bad_request(""))
    }

    /// The name used in logs and error messages.
    fn gate_name(&self) -> &str {
        short_type_name::<Self>()
    }
}

/// Wraps a view so it is not dispatched unless `T`'s test passes.
#[derive(Debug, Clone)]
pub struct PassesTestMixin<V, T> {
    view: V,
    test: T,
}

impl<V, T> PassesTestMixin<V, T> {
    pub const fn new(view: V, test: T) -> Self {
        Self { view, test }
    }

    /// Returns the wrapped view.
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Returns the gate.
    pub const fn gate(&self) -> &T {
        &self.test
    }

    pub fn into_inner(self) -> (V, T) {
        (self.view, self.test)
    }
}

#[async_trait]
impl<V: View, T: DispatchTest> View for PassesTestMixin<V, T> {
    fn allowed_methods(&self) -> Vec<http::Method> {
        self.view.allowed_methods()
    }

    fn csrf_exempt(&self) -> bool {
        self.view.csrf_exempt()
    }

    fn view_name(&self) -> &str {
        self.view.view_name()
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match self.test.test(&request) {
            Ok(true) => self.view.dispatch(request).await,
            Ok(false) => {
                tracing::debug!(
                    view = self.view.view_name(),
                    gate = self.test.gate_name(),
                    path = request.path(),
                    "dispatch test failed"
                );
                match self.test.handle_test_failure(request).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!(
                            view = self.view.view_name(),
                            gate = self.test.gate_name(),
                            error = %e,
                            "failure handler errored"
                        );
                        HttpResponse::from_error(&e)
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    view = self.view.view_name(),
                    gate = self.test.gate_name(),
                    error = %e,
                    "dispatch test errored"
                );
                HttpResponse::from_error(&e)
            }
        }
    }
}

/// A gate running an arbitrary predicate.
#[derive(Clone)]
pub struct UserPassesTest<F>(pub F);

impl<F> std::fmt::Debug for UserPassesTest<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UserPassesTest")
    }
}

#[async_trait]
impl<F> DispatchTest for UserPassesTest<F>
where
    F: Fn(&HttpRequest) -> bool + Send + Sync,
{
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        Ok((self.0)(request))
    }

    fn gate_name(&self) -> &str {
        "UserPassesTest"
    }
}

/// Requires an authenticated user.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginRequired;

#[async_trait]
impl DispatchTest for LoginRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        Ok(request.is_user_authenticated())
    }
}

/// Requires a visitor who has not logged in. A request without a user
/// passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousRequired;

#[async_trait]
impl DispatchTest for AnonymousRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        Ok(!request.is_user_authenticated())
    }
}

/// Requires an authenticated superuser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperuserRequired;

#[async_trait]
impl DispatchTest for SuperuserRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        Ok(request
            .user()
            .is_some_and(|u| u.is_authenticated() && u.is_superuser()))
    }
}

/// Requires an authenticated staff user.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffUserRequired;

#[async_trait]
impl DispatchTest for StaffUserRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        Ok(request
            .user()
            .is_some_and(|u| u.is_authenticated() && u.is_staff()))
    }
}

/// Requires an authenticated user in at least one of the required groups.
///
/// ```
/// use brackets_mixins::access::GroupRequired;
///
/// let editors = GroupRequired::from("editors");
/// assert_eq!(editors.get_group_required().unwrap(), ["editors"]);
/// assert!(GroupRequired::default().get_group_required().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupRequired {
    pub group_required: Option<Vec<String>>,
}

impl GroupRequired {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_required: Some(groups.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns the required groups.
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `group_required` is unset.
    pub fn get_group_required(&self) -> DjangoResult<&[String]> {
        self.group_required.as_deref().ok_or_else(|| {
            DjangoError::missing_attribute(
                "GroupRequired",
                "group_required",
                "get_group_required",
            )
        })
    }

    /// Returns `true` if `user` belongs to any required group.
    pub fn check_membership(&self, user: &RequestUser) -> DjangoResult<bool> {
        let required = self.get_group_required()?;
        Ok(user.groups().iter().any(|g| required.contains(g)))
    }
}

impl From<&str> for GroupRequired {
    fn from(group: &str) -> Self {
        Self::new([group])
    }
}

impl From<Vec<&str>> for GroupRequired {
    fn from(groups: Vec<&str>) -> Self {
        Self::new(groups)
    }
}

#[async_trait]
impl DispatchTest for GroupRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        match request.user() {
            Some(user) if user.is_authenticated() => self.check_membership(user),
            _ => Ok(false),
        }
    }
}

/// The permissions a [`PermissionRequired`] gate asks for.
///
/// A request passes when the user holds every permission in `all`, or any
/// permission in `any`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMenu {
    pub all: Vec<String>,
    pub any: Vec<String>,
}

impl PermissionMenu {
    /// A menu requiring every permission in `perms`.
    pub fn all<I, S>(perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all: perms.into_iter().map(Into::into).collect(),
            any: Vec::new(),
        }
    }

    /// A menu requiring at least one permission in `perms`.
    pub fn any<I, S>(perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all: Vec::new(),
            any: perms.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds permissions any one of which also grants access.
    #[must_use]
    pub fn or_any<I, S>(mut self, perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any.extend(perms.into_iter().map(Into::into));
        self
    }
}

impl From<&str> for PermissionMenu {
    fn from(perm: &str) -> Self {
        Self::all([perm])
    }
}

/// Requires the user to hold permissions from a [`PermissionMenu`].
///
/// An empty `all` list is held by everyone, so a menu with only `any`
/// entries lets any request with a user through.
#[derive(Debug, Clone, Default)]
pub struct PermissionRequired {
    pub permission_required: Option<PermissionMenu>,
}

impl PermissionRequired {
    pub fn new(menu: impl Into<PermissionMenu>) -> Self {
        Self {
            permission_required: Some(menu.into()),
        }
    }

    /// Returns the permission menu.
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `permission_required` is
    /// unset.
    pub fn get_permission_required(&self) -> DjangoResult<&PermissionMenu> {
        self.permission_required.as_ref().ok_or_else(|| {
            DjangoError::missing_attribute(
                "PermissionRequired",
                "permission_required",
                "get_permission_required",
            )
        })
    }
}

#[async_trait]
impl DispatchTest for PermissionRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        let menu = self.get_permission_required()?;
        let Some(user) = request.user() else {
            return Ok(false);
        };
        let has_all = menu.all.iter().all(|perm| user.has_perm(perm));
        let has_any = menu.any.iter().any(|perm| user.has_perm(perm));
        Ok(has_all || has_any)
    }
}

/// Requires a login no older than `max_age` seconds. Failing requests are
/// logged out and redirected to the login page.
#[derive(Debug, Clone, Copy)]
pub struct RecentLoginRequired {
    pub max_age: u64,
}

impl RecentLoginRequired {
    pub const DEFAULT_MAX_AGE: u64 = 1800;

    pub const fn new(max_age: u64) -> Self {
        Self { max_age }
    }
}

impl Default for RecentLoginRequired {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_AGE)
    }
}

#[async_trait]
impl DispatchTest for RecentLoginRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        let Some(user) = request.user().filter(|u| u.is_authenticated()) else {
            return Ok(false);
        };
        let max_age = i64::try_from(self.max_age).unwrap_or(i64::MAX);
        Ok(user.last_login().is_some_and(|last_login| {
            Utc::now().signed_duration_since(last_login).num_seconds() < max_age
        }))
    }

    async fn handle_test_failure(&self, request: HttpRequest) -> DjangoResult<HttpResponse> {
        Ok(logout_then_login(request, None))
    }
}

/// Requires HTTPS. Skipped when the `debug` setting is on.
///
/// Failing requests are redirected permanently to the same URL over
/// HTTPS, or answered with 400 when `redirect_to_ssl` is `false`.
#[derive(Debug, Clone, Copy)]
pub struct SslRequired {
    pub redirect_to_ssl: bool,
}

impl Default for SslRequired {
    fn default() -> Self {
        Self {
            redirect_to_ssl: true,
        }
    }
}

#[async_trait]
impl DispatchTest for SslRequired {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        if SETTINGS.try_get().is_some_and(|s| s.debug) {
            return Ok(true);
        }
        Ok(request.is_secure())
    }

    async fn handle_test_failure(&self, request: HttpRequest) -> DjangoResult<HttpResponse> {
        if !self.redirect_to_ssl {
            return Ok(HttpResponse::bad_request(""));
        }
        let current = request.build_absolute_uri(Some(&request.get_full_path()));
        let secure = current.replacen("http://", "https://", 1);
        tracing::debug!(location = %secure, "redirecting to https");
        Ok(HttpResponsePermanentRedirect::new(&secure))
    }
}

/// Redirects requests failing `T` when they come from a visitor.
///
/// Requests without an authenticated user are redirected (302) to
/// `redirect_url`; everyone else gets `T`'s own failure response.
#[derive(Debug, Clone)]
pub struct PassOrRedirect<T> {
    pub inner: T,
    pub redirect_url: String,
    pub redirect_unauthenticated_users: bool,
}

impl<T> PassOrRedirect<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            redirect_url: "/".to_string(),
            redirect_unauthenticated_users: true,
        }
    }

    #[must_use]
    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = url.into();
        self
    }

    #[must_use]
    pub const fn redirect_unauthenticated_users(mut self, redirect: bool) -> Self {
        self.redirect_unauthenticated_users = redirect;
        self
    }
}

impl<T> RedirectMixin for PassOrRedirect<T> {
    fn redirect_url(&self) -> &str {
        &self.redirect_url
    }
}

#[async_trait]
impl<T: DispatchTest> DispatchTest for PassOrRedirect<T> {
    fn test(&self, request: &HttpRequest) -> DjangoResult<bool> {
        self.inner.test(request)
    }

    async fn handle_test_failure(&self, request: HttpRequest) -> DjangoResult<HttpResponse> {
        if self.redirect_unauthenticated_users && !request.is_user_authenticated() {
            return self.redirect();
        }
        self.inner.handle_test_failure(request).await
    }

    fn gate_name(&self) -> &str {
        self.inner.gate_name()
    }
}
