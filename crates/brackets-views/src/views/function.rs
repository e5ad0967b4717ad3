//! Function-based views.
//!
//! A [`ViewFunction`] is what a router mounts. Class-based views become one
//! through [`View::as_view`](super::class_based::View::as_view).

use std::future::Future;
use std::pin::Pin;

use brackets_http::{HttpRequest, HttpResponse};

/// An async view function: takes a request, resolves to a response.
pub type ViewFunction =
    Box<dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> + Send + Sync>;
