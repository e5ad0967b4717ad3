//! Class-based and function-based views.

pub mod class_based;
pub mod form_view;
pub mod function;
pub mod generic;
