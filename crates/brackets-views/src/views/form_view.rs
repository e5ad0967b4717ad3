//! Form handling for views.
//!
//! [`FormMixin`] builds the view's form from the request: initial values
//! and prefix from the view, submitted data and files from the request.

use serde_json::{Map, Value};

use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult};
use brackets_forms::{Form, FormClassRef, FormKwargs};
use brackets_http::HttpRequest;

/// Returns `true` for methods whose body carries form data.
pub fn is_form_submission(request: &HttpRequest) -> bool {
    matches!(
        *request.method(),
        http::Method::POST | http::Method::PUT | http::Method::PATCH
    )
}

/// Provides a form to a view.
///
/// Override [`get_form_class`](FormMixin::get_form_class) or
/// [`get_form_kwargs`](FormMixin::get_form_kwargs) to layer behavior on
/// top of the `base_*` defaults.
pub trait FormMixin: Send + Sync {
    fn form_class(&self) -> Option<FormClassRef> {
        None
    }

    fn initial(&self) -> Map<String, Value> {
        Map::new()
    }

    fn prefix(&self) -> Option<String> {
        None
    }

    fn success_url(&self) -> Option<String> {
        None
    }

    /// Returns [`form_class`](FormMixin::form_class).
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when it is not set.
    fn base_form_class(&self) -> DjangoResult<FormClassRef> {
        self.form_class().ok_or_else(|| {
            DjangoError::missing_attribute(short_type_name::<Self>(), "form_class", "get_form_class")
        })
    }

    fn get_form_class(&self) -> DjangoResult<FormClassRef> {
        self.base_form_class()
    }

    /// Builds the kwargs every form of this view gets: prefix and initial
    /// values, plus the submitted data and files on POST, PUT and PATCH.
    fn base_form_kwargs(&self, request: &HttpRequest) -> FormKwargs {
        let mut kwargs = FormKwargs::new().initial(self.initial());
        kwargs.prefix = self.prefix();
        if is_form_submission(request) {
            kwargs = kwargs
                .data(request.post().clone())
                .files(request.files().clone());
        }
        kwargs
    }

    fn get_form_kwargs(&self, request: &HttpRequest) -> DjangoResult<FormKwargs> {
        Ok(self.base_form_kwargs(request))
    }

    /// Builds the form for `request`.
    fn get_form(&self, request: &HttpRequest) -> DjangoResult<Box<dyn Form>> {
        let class = self.get_form_class()?;
        class.build(self.get_form_kwargs(request)?)
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when no success URL is set.
    fn get_success_url(&self) -> DjangoResult<String> {
        self.success_url().ok_or_else(|| {
            DjangoError::ImproperlyConfigured(
                "No URL to redirect to. Provide a success_url.".to_string(),
            )
        })
    }
}
