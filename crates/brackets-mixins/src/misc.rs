//! Mixins that don't have a better home.

use std::collections::HashMap;

use serde_json::Value;

use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult};

/// Adds fixed entries to a view's context.
///
/// ```
/// use std::collections::HashMap;
///
/// use brackets_core::DjangoResult;
/// use brackets_http::HttpRequest;
/// use brackets_mixins::misc::StaticContextMixin;
/// use brackets_views::ContextMixin;
/// use serde_json::{json, Value};
///
/// struct About;
///
/// impl StaticContextMixin for About {
///     fn static_context(&self) -> HashMap<String, Value> {
///         HashMap::from([("title".to_string(), json!("About us"))])
///     }
/// }
///
/// impl ContextMixin for About {
///     fn get_context_data(
///         &self,
///         _request: &HttpRequest,
///         _kwargs: &HashMap<String, String>,
///     ) -> DjangoResult<HashMap<String, Value>> {
///         self.with_static_context(HashMap::new())
///     }
/// }
///
/// let context = About
///     .get_context_data(&HttpRequest::builder().build(), &HashMap::new())
///     .unwrap();
/// assert_eq!(context["title"], json!("About us"));
/// ```
pub trait StaticContextMixin {
    fn static_context(&self) -> HashMap<String, Value> {
        HashMap::new()
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `static_context` is empty.
    fn get_static_context(&self) -> DjangoResult<HashMap<String, Value>> {
        let context = self.static_context();
        if context.is_empty() {
            let c = short_type_name::<Self>();
            return Err(DjangoError::ImproperlyConfigured(format!(
                "{c} is missing the static_context attribute. Define `{c}.static_context`, \
                 or override `{c}.get_static_context()`."
            )));
        }
        Ok(context)
    }

    /// Merges the static context into `context`. Static entries win.
    fn with_static_context(
        &self,
        mut context: HashMap<String, Value>,
    ) -> DjangoResult<HashMap<String, Value>> {
        context.extend(self.get_static_context()?);
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Landing;
    impl StaticContextMixin for Landing {
        fn static_context(&self) -> HashMap<String, Value> {
            HashMap::from([("title".to_string(), json!("Welcome"))])
        }
    }

    struct Blank;
    impl StaticContextMixin for Blank {}

    #[test]
    fn test_with_static_context_merges() {
        let context = HashMap::from([
            ("user".to_string(), json!("ada")),
            ("title".to_string(), json!("old")),
        ]);
        let merged = Landing.with_static_context(context).unwrap();
        assert_eq!(merged["user"], json!("ada"));
        assert_eq!(merged["title"], json!("Welcome"));
    }

    #[test]
    fn test_empty_static_context() {
        let err = Blank.with_static_context(HashMap::new()).unwrap_err();
        assert!(err.is_improperly_configured());
        assert!(err.to_string().contains("Blank is missing the static_context attribute."));
    }
}
