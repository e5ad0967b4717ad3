//! Forms for brackets views.
//!
//! - [`fields`] - field definitions and value cleaning
//! - [`form`] - the [`Form`] trait, [`BaseForm`] and [`FormKwargs`]
//! - [`form_class`] - [`FormClass`] factories
//! - [`user_form`] - forms that take the requesting user

pub mod fields;
pub mod form;
pub mod form_class;
pub mod user_form;

pub use fields::{FormFieldDef, FormFieldType};
pub use form::{BaseForm, Form, FormErrors, FormKwargs};
pub use form_class::{BaseFormClass, FormClass, FormClassRef};
pub use user_form::{UserForm, UserFormClass};
