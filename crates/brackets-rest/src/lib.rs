//! Serializers and the generic API view protocol.
//!
//! - [`serializers`] - the [`Serializer`] trait and [`FieldSerializer`]
//! - [`generics`] - [`GenericApiView`], serializer lookup for API views

pub mod generics;
pub mod serializers;

pub use generics::GenericApiView;
pub use serializers::{FieldSerializer, Serializer, SerializerRef};
