//! Per-method serializers for API views.

use std::collections::HashMap;

use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult};
use brackets_http::HttpRequest;
use brackets_rest::{GenericApiView, SerializerRef};

/// Picks a serializer by HTTP method.
///
/// Route the view's `get_serializer_class` through
/// [`select_serializer_class`](MultipleSerializersMixin::select_serializer_class):
///
/// ```
/// use std::collections::HashMap;
///
/// use brackets_core::DjangoResult;
/// use brackets_http::HttpRequest;
/// use brackets_mixins::rest_framework::MultipleSerializersMixin;
/// use brackets_rest::{FieldSerializer, GenericApiView, SerializerRef};
///
/// struct Articles;
///
/// impl GenericApiView for Articles {
///     fn get_serializer_class(&self, request: &HttpRequest) -> DjangoResult<SerializerRef> {
///         self.select_serializer_class(request)
///     }
/// }
///
/// impl MultipleSerializersMixin for Articles {
///     fn serializer_classes(&self) -> Option<HashMap<String, SerializerRef>> {
///         Some(HashMap::from([
///             ("get".to_string(), FieldSerializer::new("Summary", &["id"]).into_ref()),
///             ("post".to_string(), FieldSerializer::new("Full", &["id", "body"]).into_ref()),
///         ]))
///     }
/// }
///
/// let request = HttpRequest::builder().build();
/// assert_eq!(Articles.get_serializer_class(&request).unwrap().name(), "Summary");
/// ```
pub trait MultipleSerializersMixin: GenericApiView {
    /// Serializers keyed by lower-case method name.
    fn serializer_classes(&self) -> Option<HashMap<String, SerializerRef>> {
        None
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `serializer_classes` is
    /// unset or empty.
    fn get_serializer_classes(&self) -> DjangoResult<HashMap<String, SerializerRef>> {
        match self.serializer_classes() {
            Some(classes) if !classes.is_empty() => Ok(classes),
            _ => Err(DjangoError::ImproperlyConfigured(format!(
                "'{}' should either include a `serializer_classes` attribute, \
                 or override the `get_serializer_classes()` method.",
                short_type_name::<Self>()
            ))),
        }
    }

    /// Returns the serializer for the request's method. An empty map from
    /// an overridden `get_serializer_classes` falls back to
    /// [`GenericApiView::base_serializer_class`].
    fn select_serializer_class(&self, request: &HttpRequest) -> DjangoResult<SerializerRef> {
        let mut classes = self.get_serializer_classes()?;
        if classes.is_empty() {
            return self.base_serializer_class();
        }
        let method = request.method().as_str().to_lowercase();
        classes.remove(&method).ok_or_else(|| {
            DjangoError::ImproperlyConfigured(format!(
                "{} has no serializer for `{method}` requests.",
                short_type_name::<Self>()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brackets_rest::FieldSerializer;
    use http::Method;
    use serde_json::json;

    struct Posts;

    impl GenericApiView for Posts {
        fn get_serializer_class(&self, request: &HttpRequest) -> DjangoResult<SerializerRef> {
            self.select_serializer_class(request)
        }
    }

    impl MultipleSerializersMixin for Posts {
        fn serializer_classes(&self) -> Option<HashMap<String, SerializerRef>> {
            Some(HashMap::from([
                ("get".to_string(), FieldSerializer::new("PostSummary", &["id"]).into_ref()),
                (
                    "post".to_string(),
                    FieldSerializer::new("PostDetail", &["id", "body"]).into_ref(),
                ),
            ]))
        }
    }

    struct Fallback;

    impl GenericApiView for Fallback {
        fn serializer_class(&self) -> Option<SerializerRef> {
            Some(FieldSerializer::new("Default", &["id"]).into_ref())
        }

        fn get_serializer_class(&self, request: &HttpRequest) -> DjangoResult<SerializerRef> {
            self.select_serializer_class(request)
        }
    }

    impl MultipleSerializersMixin for Fallback {
        fn get_serializer_classes(&self) -> DjangoResult<HashMap<String, SerializerRef>> {
            Ok(HashMap::new())
        }
    }

    struct Unset;
    impl GenericApiView for Unset {}
    impl MultipleSerializersMixin for Unset {
        fn serializer_classes(&self) -> Option<HashMap<String, SerializerRef>> {
            Some(HashMap::new())
        }
    }

    fn request(method: Method) -> HttpRequest {
        HttpRequest::builder().method(method).build()
    }

    #[test]
    fn test_serializer_by_method() {
        let summary = Posts.get_serializer_class(&request(Method::GET)).unwrap();
        assert_eq!(summary.name(), "PostSummary");

        let out = Posts
            .serialize(&request(Method::POST), &json!({"id": 1, "body": "Hi", "secret": 2}))
            .unwrap();
        assert_eq!(out, json!({"id": 1, "body": "Hi"}));
    }

    #[test]
    fn test_unlisted_method_is_improperly_configured() {
        let err = Posts.get_serializer_class(&request(Method::DELETE)).unwrap_err();
        assert!(err.is_improperly_configured());
        assert!(err.to_string().contains("Posts has no serializer for `delete` requests."));
    }

    #[test]
    fn test_empty_override_falls_back_to_serializer_class() {
        let serializer = Fallback.get_serializer_class(&request(Method::PUT)).unwrap();
        assert_eq!(serializer.name(), "Default");
    }

    #[test]
    fn test_missing_or_empty_serializer_classes() {
        let err = Unset.get_serializer_classes().unwrap_err();
        assert!(err.to_string().contains(
            "'Unset' should either include a `serializer_classes` attribute, \
             or override the `get_serializer_classes()` method."
        ));
    }
}
