//! # brackets
//!
//! Reusable mixins for class-based views.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. Depend on `brackets` for everything, or on individual crates for
//! finer-grained control.
//!
//! ```
//! use brackets::prelude::*;
//!
//! struct Inbox;
//!
//! #[async_trait]
//! impl View for Inbox {
//!     async fn get(&self, _request: HttpRequest) -> HttpResponse {
//!         HttpResponse::ok("inbox")
//!     }
//! }
//!
//! let view = Inbox.never_cache().login_required().as_view();
//! ```

/// Errors, settings, and logging setup.
pub use brackets_core as core;

/// Request, response, query dicts, and cache headers.
pub use brackets_http as http;

/// Users, permissions, sessions, and login redirects.
pub use brackets_auth as auth;

/// Form fields, forms, and form classes.
pub use brackets_forms as forms;

/// Query descriptors.
pub use brackets_db as db;

/// Serializers and API views.
pub use brackets_rest as rest;

/// The class-based view protocol, list and form hosts, and CSRF checks.
pub use brackets_views as views;

/// The mixins.
pub use brackets_mixins as mixins;

pub use async_trait::async_trait;
pub use serde_json;

/// Everything needed to write a view with mixins.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use brackets_auth::{AbstractUser, RequestUser, RequestUserExt};
    pub use brackets_core::{DjangoError, DjangoResult, Settings, SETTINGS};
    pub use brackets_db::{OrderBy, QuerySet};
    pub use brackets_forms::{BaseFormClass, Form, FormClassRef, FormKwargs};
    pub use brackets_http::{CacheControl, HttpRequest, HttpResponse, JsonResponse};
    pub use brackets_rest::{GenericApiView, SerializerRef};
    pub use brackets_views::views::form_view::FormMixin;
    pub use brackets_views::views::generic::{ListView, MultipleObjectMixin};
    pub use brackets_views::{ContextMixin, View};

    pub use brackets_mixins::{
        AllVerbsMixin, AnonymousRequired, CSRFExemptMixin, CacheControlMixin, CsrfExemptMixin,
        DispatchTest, FormWithUserMixin, GroupRequired, HeaderMixin, LoginRequired,
        MultipleFormsMixin, MultipleSerializersMixin, NeverCacheMixin, OrderableListMixin,
        PassOrRedirect, PassesTestMixin, PermissionMenu, PermissionRequired,
        PrefetchRelatedMixin, RecentLoginRequired, RedirectMixin, RedirectToLoginMixin,
        SelectRelatedMixin, SslRequired, StaffUserRequired, StaticContextMixin,
        SuperuserRequired, UserPassesTest, ViewExt,
    };
}
