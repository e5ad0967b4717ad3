//! Class-based views (CBVs).
//!
//! This module provides the [`View`] trait and [`ContextMixin`]. A view
//! organizes its logic into one handler per HTTP method; [`View::dispatch`]
//! picks the handler and [`View::as_view`] turns the view into a
//! [`ViewFunction`] a router can mount.
//!
//! Mixins that act on the whole dispatch wrap a view in another type that
//! also implements [`View`], so they stack by nesting.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use brackets_core::logging::view_span;
use brackets_core::DjangoResult;
use brackets_core::utils::short_type_name;
use brackets_http::{HttpRequest, HttpResponse};

use super::function::ViewFunction;

/// The base trait for class-based views.
///
/// Every handler answers 405 Method Not Allowed unless overridden, except
/// `head`, which runs `get`, and `options`, which lists the allowed methods.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use brackets_views::views::class_based::View;
/// use brackets_http::{HttpRequest, HttpResponse};
///
/// struct Hello;
///
/// #[async_trait]
/// impl View for Hello {
///     async fn get(&self, _request: HttpRequest) -> HttpResponse {
///         HttpResponse::ok("Hello!")
///     }
/// }
/// ```
#[async_trait]
pub trait View: Send + Sync {
    /// Returns the list of HTTP methods this view allows.
    fn allowed_methods(&self) -> Vec<http::Method> {
        vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
            http::Method::HEAD,
            http::Method::OPTIONS,
        ]
    }

    /// Returns `true` if CSRF checks should be skipped for this view.
    fn csrf_exempt(&self) -> bool {
        false
    }

    /// The name used in logs and error messages.
    fn view_name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// Routes the request to the handler for its method.
    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match *request.method() {
            http::Method::GET => self.get(request).await,
            http::Method::POST => self.post(request).await,
            http::Method::PUT => self.put(request).await,
            http::Method::PATCH => self.patch(request).await,
            http::Method::DELETE => self.delete(request).await,
            http::Method::HEAD => self.head(request).await,
            http::Method::OPTIONS => self.options(request).await,
            http::Method::TRACE => self.trace(request).await,
            _ => self.http_method_not_allowed(request).await,
        }
    }

    async fn get(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn post(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn put(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn patch(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn delete(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    /// Delegates to `get`.
    async fn head(&self, request: HttpRequest) -> HttpResponse {
        self.get(request).await
    }

    /// Answers with an empty body and the allowed methods in `Allow`.
    async fn options(&self, _request: HttpRequest) -> HttpResponse {
        let methods = self.allowed_methods();
        let method_strs: Vec<&str> = methods.iter().map(http::Method::as_str).collect();
        let mut response = HttpResponse::ok("");
        if let Ok(value) = http::header::HeaderValue::from_str(&method_strs.join(", ")) {
            response.headers_mut().insert(http::header::ALLOW, value);
        }
        response
    }

    async fn trace(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    /// Returns a 405 response listing the allowed methods.
    async fn http_method_not_allowed(&self, request: HttpRequest) -> HttpResponse {
        tracing::warn!(
            method = %request.method(),
            path = request.path(),
            "Method Not Allowed"
        );
        let methods = self.allowed_methods();
        let method_strs: Vec<&str> = methods.iter().map(http::Method::as_str).collect();
        HttpResponse::not_allowed(&method_strs)
    }

    /// Converts this view into a [`ViewFunction`]. Each call dispatches
    /// inside a `dispatch` tracing span.
    #[allow(clippy::wrong_self_convention)]
    fn as_view(self) -> ViewFunction
    where
        Self: Sized + 'static,
    {
        let view = Arc::new(self);
        Box::new(move |request: HttpRequest| -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> {
            let view = Arc::clone(&view);
            let span = view_span(view.view_name(), request.method().as_str(), request.path());
            Box::pin(async move { view.dispatch(request).await }.instrument(span))
        })
    }
}

/// Provides context data for rendering.
pub trait ContextMixin {
    /// Returns the rendering context. The default holds the URL `kwargs`.
    fn get_context_data(
        &self,
        _request: &HttpRequest,
        kwargs: &HashMap<String, String>,
    ) -> DjangoResult<HashMap<String, serde_json::Value>> {
        Ok(kwargs
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect())
    }
}
