//! Redirect helpers.

use brackets_auth::views::{default_login_url, redirect_to_login};
use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult, SETTINGS};
use brackets_http::{HttpRequest, HttpResponse, HttpResponseRedirect};

/// Redirects to a fixed URL.
pub trait RedirectMixin {
    fn redirect_url(&self) -> &str {
        ""
    }

    /// Returns the redirect target.
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `redirect_url` is empty.
    fn get_redirect_url(&self) -> DjangoResult<String> {
        let url = self.redirect_url();
        if url.is_empty() {
            return Err(DjangoError::missing_attribute(
                short_type_name::<Self>(),
                "redirect_url",
                "get_redirect_url",
            ));
        }
        Ok(url.to_string())
    }

    /// Answers with a 302 to [`get_redirect_url`](RedirectMixin::get_redirect_url).
    fn redirect(&self) -> DjangoResult<HttpResponse> {
        let url = self.get_redirect_url()?;
        tracing::debug!(location = %url, "redirecting");
        Ok(HttpResponseRedirect::new(&url))
    }
}

/// Sends visitors to the login page, remembering where they were going.
pub trait RedirectToLoginMixin {
    fn login_url(&self) -> &str {
        ""
    }

    /// Returns `login_url`, falling back to the `login_url` setting (or its
    /// default before settings are configured).
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when both are empty.
    fn get_login_url(&self) -> DjangoResult<String> {
        let own = self.login_url();
        if !own.is_empty() {
            return Ok(own.to_string());
        }
        let configured = default_login_url();
        if configured.is_empty() {
            let c = short_type_name::<Self>();
            return Err(DjangoError::ImproperlyConfigured(format!(
                "{c} is missing the `login_url` attribute. Define `{c}.login_url` or \
                 `settings.login_url`. Alternatively, override `{c}.get_login_url()`."
            )));
        }
        Ok(configured)
    }

    /// Redirects (302) to the login URL with the request's full path in
    /// the `redirect_field_name` setting's parameter (`next` by default).
    fn redirect_to_login(&self, request: &HttpRequest) -> DjangoResult<HttpResponse> {
        let login_url = self.get_login_url()?;
        let field = SETTINGS
            .try_get()
            .map(|s| s.redirect_field_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("next");
        Ok(redirect_to_login(
            &request.get_full_path(),
            &login_url,
            Some(field),
        ))
    }
}
