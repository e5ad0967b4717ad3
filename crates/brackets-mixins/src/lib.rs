//! Reusable mixins for brackets class-based views.
//!
//! Mixins that act on the whole dispatch are wrapper views. They nest, and
//! [`ViewExt`] builds them fluently:
//!
//! ```
//! use async_trait::async_trait;
//! use brackets_http::{HttpRequest, HttpResponse};
//! use brackets_mixins::ViewExt;
//! use brackets_views::View;
//!
//! struct Reports;
//!
//! #[async_trait]
//! impl View for Reports {
//!     async fn get(&self, _request: HttpRequest) -> HttpResponse {
//!         HttpResponse::ok("reports")
//!     }
//! }
//!
//! let view = Reports
//!     .never_cache()
//!     .permission_required("reports.view_report")
//!     .login_required()
//!     .as_view();
//! ```
//!
//! Mixins shaping data (querysets, forms, context, serializers) are traits
//! with provided methods that the view calls from its own overrides.
//!
//! - [`access`] - authentication and authorization gates
//! - [`redirects`] - redirect and login-redirect helpers
//! - [`http`] - catch-all handlers, extra headers, cache control
//! - [`queries`] - related lookups and request-driven ordering
//! - [`form_views`] - user-aware forms, CSRF exemption, multiple forms
//! - [`misc`] - static context
//! - [`rest_framework`] - per-method serializers

pub mod access;
pub mod form_views;
pub mod http;
pub mod misc;
pub mod queries;
pub mod redirects;
pub mod rest_framework;

use brackets_core::DjangoResult;
use brackets_http::{CacheControl, HttpRequest};
use brackets_views::View;

pub use access::{
    AnonymousRequired, DispatchTest, GroupRequired, LoginRequired, PassOrRedirect,
    PassesTestMixin, PermissionMenu, PermissionRequired, RecentLoginRequired, SslRequired,
    StaffUserRequired, SuperuserRequired, UserPassesTest,
};
pub use form_views::{
    CSRFExemptMixin, CsrfExemptMixin, FormMap, FormWithUserMixin, MultipleFormsMixin,
};
pub use self::http::{
    AllVerbs, AllVerbsMixin, CacheControlMixin, HeaderMixin, HeadersFn, NeverCacheMixin,
    ResponseHeaders,
};
pub use misc::StaticContextMixin;
pub use queries::{OrderableListMixin, PrefetchRelatedMixin, SelectRelatedMixin};
pub use redirects::{RedirectMixin, RedirectToLoginMixin};
pub use rest_framework::MultipleSerializersMixin;

/// Builds dispatch-level mixins around a view.
///
/// Each call wraps the view, so the last gate added runs first.
pub trait ViewExt: View + Sized {
    fn passes_test<T: DispatchTest>(self, test: T) -> PassesTestMixin<Self, T> {
        PassesTestMixin::new(self, test)
    }

    fn user_passes_test<F>(self, test: F) -> PassesTestMixin<Self, UserPassesTest<F>>
    where
        F: Fn(&HttpRequest) -> bool + Send + Sync,
    {
        self.passes_test(UserPassesTest(test))
    }

    fn login_required(self) -> PassesTestMixin<Self, LoginRequired> {
        self.passes_test(LoginRequired)
    }

    fn anonymous_required(self) -> PassesTestMixin<Self, AnonymousRequired> {
        self.passes_test(AnonymousRequired)
    }

    fn superuser_required(self) -> PassesTestMixin<Self, SuperuserRequired> {
        self.passes_test(SuperuserRequired)
    }

    fn staff_required(self) -> PassesTestMixin<Self, StaffUserRequired> {
        self.passes_test(StaffUserRequired)
    }

    fn group_required(self, groups: impl Into<GroupRequired>) -> PassesTestMixin<Self, GroupRequired> {
        self.passes_test(groups.into())
    }

    fn permission_required(
        self,
        permissions: impl Into<PermissionMenu>,
    ) -> PassesTestMixin<Self, PermissionRequired> {
        self.passes_test(PermissionRequired::new(permissions))
    }

    fn recent_login_required(self, max_age: u64) -> PassesTestMixin<Self, RecentLoginRequired> {
        self.passes_test(RecentLoginRequired::new(max_age))
    }

    fn ssl_required(self) -> PassesTestMixin<Self, SslRequired> {
        self.passes_test(SslRequired::default())
    }

    /// # Errors
    ///
    /// See [`HeaderMixin::new`].
    fn with_headers(self, headers: &[(&str, &str)]) -> DjangoResult<HeaderMixin<Self>> {
        HeaderMixin::new(self, headers)
    }

    fn cache_control(self, options: CacheControl) -> CacheControlMixin<Self> {
        CacheControlMixin::new(self, options)
    }

    fn never_cache(self) -> NeverCacheMixin<Self> {
        NeverCacheMixin(self)
    }

    fn exempt_csrf(self) -> CsrfExemptMixin<Self> {
        CsrfExemptMixin(self)
    }
}

impl<V: View> ViewExt for V {}
