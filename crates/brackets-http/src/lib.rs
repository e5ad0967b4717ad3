//! HTTP types for brackets views.
//!
//! - [`HttpRequest`] / [`HttpRequestBuilder`] - the incoming request
//! - [`HttpResponse`] and its shorthand constructors
//! - [`QueryDict`] - multi-valued GET/POST parameters
//! - [`upload`] - multipart parsing and [`UploadedFile`]
//! - [`cache`] - `Cache-Control` patching and never-cache headers

pub mod cache;
pub mod querydict;
pub mod request;
pub mod response;
pub mod upload;

pub use cache::CacheControl;
pub use querydict::QueryDict;
pub use request::{HttpRequest, HttpRequestBuilder};
pub use response::{
    HttpResponse, HttpResponsePermanentRedirect, HttpResponseRedirect, JsonResponse,
    ResponseContent,
};
pub use upload::UploadedFile;
