//! The generic API view protocol.
//!
//! An API view names the serializer it renders with. Views pick it per
//! request by overriding [`GenericApiView::get_serializer_class`]; the
//! view-wide choice stays reachable through
//! [`GenericApiView::base_serializer_class`].

use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult};
use brackets_http::HttpRequest;
use serde_json::Value;

use crate::serializers::SerializerRef;

pub trait GenericApiView: Send + Sync {
    /// The serializer used when `get_serializer_class` is not overridden.
    fn serializer_class(&self) -> Option<SerializerRef> {
        None
    }

    /// Returns [`serializer_class`](GenericApiView::serializer_class).
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when no serializer is set.
    fn base_serializer_class(&self) -> DjangoResult<SerializerRef> {
        self.serializer_class().ok_or_else(|| {
            DjangoError::missing_attribute(
                short_type_name::<Self>(),
                "serializer_class",
                "get_serializer_class",
            )
        })
    }

    /// Returns the serializer for `request`.
    fn get_serializer_class(&self, _request: &HttpRequest) -> DjangoResult<SerializerRef> {
        self.base_serializer_class()
    }

    /// Serializes `instance` with the serializer chosen for `request`.
    fn serialize(&self, request: &HttpRequest, instance: &Value) -> DjangoResult<Value> {
        self.get_serializer_class(request)?.serialize(instance)
    }
}
