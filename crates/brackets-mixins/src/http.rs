//! Response-level wrappers: catch-all handlers, extra headers and cache
//! control.

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName, HeaderValue};

use brackets_core::{DjangoError, DjangoResult};
use brackets_http::cache::{add_never_cache_headers, patch_cache_control, Directive};
use brackets_http::{CacheControl, HttpRequest, HttpResponse};
use brackets_views::View;

/// A view handling every HTTP method with a single handler.
///
/// ```
/// use async_trait::async_trait;
/// use brackets_http::{HttpRequest, HttpResponse};
/// use brackets_mixins::http::AllVerbsMixin;
/// use brackets_views::View;
///
/// struct Echo;
///
/// #[async_trait]
/// impl AllVerbsMixin for Echo {
///     async fn all(&self, request: HttpRequest) -> HttpResponse {
///         HttpResponse::ok(request.method().as_str())
///     }
/// }
///
/// let view = Echo.into_view().as_view();
/// ```
#[async_trait]
pub trait AllVerbsMixin: Send + Sync {
    async fn all(&self, request: HttpRequest) -> HttpResponse;

    /// Wraps this handler in a [`View`].
    fn into_view(self) -> AllVerbs<Self>
    where
        Self: Sized,
    {
        AllVerbs(self)
    }
}

/// Routes every method, including TRACE and extension methods, to
/// [`AllVerbsMixin::all`].
#[derive(Debug, Clone)]
pub struct AllVerbs<V>(pub V);

#[async_trait]
impl<V: AllVerbsMixin> View for AllVerbs<V> {
    fn view_name(&self) -> &str {
        brackets_core::utils::short_type_name::<V>()
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        self.0.all(request).await
    }
}

/// Supplies the extra headers for one request.
pub trait ResponseHeaders: Send + Sync {
    fn get_headers(&self, request: &HttpRequest) -> HeaderMap;
}

impl ResponseHeaders for HeaderMap {
    fn get_headers(&self, _request: &HttpRequest) -> HeaderMap {
        self.clone()
    }
}

/// Headers computed from each request by a closure.
pub struct HeadersFn<F>(pub F);

impl<F> ResponseHeaders for HeadersFn<F>
where
    F: Fn(&HttpRequest) -> HeaderMap + Send + Sync,
{
    fn get_headers(&self, request: &HttpRequest) -> HeaderMap {
        (self.0)(request)
    }
}

impl<F> std::fmt::Debug for HeadersFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HeadersFn")
    }
}

/// Adds headers to every response of the wrapped view, replacing headers
/// of the same name.
///
/// [`HeaderMixin::new`] validates a fixed set up front;
/// [`HeaderMixin::per_request`] computes them from each request.
#[derive(Debug, Clone)]
pub struct HeaderMixin<V, H = HeaderMap> {
    view: V,
    headers: H,
}

impl<V> HeaderMixin<V> {
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] for an invalid header name or
    /// value.
    pub fn new(view: V, headers: &[(&str, &str)]) -> DjangoResult<Self> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                DjangoError::ImproperlyConfigured(format!("Invalid header name `{name}`."))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                DjangoError::ImproperlyConfigured(format!(
                    "Invalid value for header `{name}`: `{value}`."
                ))
            })?;
            map.insert(header_name, header_value);
        }
        Ok(Self::from_header_map(view, map))
    }

    pub const fn from_header_map(view: V, headers: HeaderMap) -> Self {
        Self { view, headers }
    }
}

impl<V, F> HeaderMixin<V, HeadersFn<F>>
where
    F: Fn(&HttpRequest) -> HeaderMap + Send + Sync,
{
    pub const fn per_request(view: V, headers: F) -> Self {
        Self {
            view,
            headers: HeadersFn(headers),
        }
    }
}

impl<V, H: ResponseHeaders> HeaderMixin<V, H> {
    pub const fn headers(&self) -> &H {
        &self.headers
    }

    /// Returns the headers to add to the response for `request`.
    pub fn get_headers(&self, request: &HttpRequest) -> HeaderMap {
        self.headers.get_headers(request)
    }
}

#[async_trait]
impl<V: View, H: ResponseHeaders> View for HeaderMixin<V, H> {
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
        let headers = self.get_headers(&request);
        let mut response = self.view.dispatch(request).await;
        for (name, value) in &headers {
            response.headers_mut().insert(name.clone(), value.clone());
        }
        response
    }
}

/// Patches `Cache-Control` on every response of the wrapped view.
#[derive(Debug, Clone)]
pub struct CacheControlMixin<V> {
    view: V,
    options: CacheControl,
}

impl<V> CacheControlMixin<V> {
    pub const fn new(view: V, options: CacheControl) -> Self {
        Self { view, options }
    }

    /// Returns the options that are set.
    pub fn get_cache_control_options(&self) -> Vec<(&'static str, Directive)> {
        self.options.directives()
    }
}

#[async_trait]
impl<V: View> View for CacheControlMixin<V> {
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
        let mut response = self.view.dispatch(request).await;
        patch_cache_control(&mut response, &self.options);
        response
    }
}

/// Marks every response of the wrapped view as uncacheable.
#[derive(Debug, Clone)]
pub struct NeverCacheMixin<V>(pub V);

#[async_trait]
impl<V: View> View for NeverCacheMixin<V> {
    fn allowed_methods(&self) -> Vec<http::Method> {
        self.0.allowed_methods()
    }

    fn csrf_exempt(&self) -> bool {
        self.0.csrf_exempt()
    }

    fn view_name(&self) -> &str {
        self.0.view_name()
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let mut response = self.0.dispatch(request).await;
        add_never_cache_headers(&mut response);
        response
    }
}
