//! Form factories.
//!
//! A view names the *kind* of form it wants, and builds a fresh instance per
//! request with that request's kwargs. [`FormClass`] is that factory.

use std::fmt;
use std::sync::Arc;

use brackets_core::{DjangoError, DjangoResult};

use crate::fields::FormFieldDef;
use crate::form::{BaseForm, Form, FormKwargs};

/// Builds forms of one kind.
pub trait FormClass: Send + Sync {
    /// A name for error messages and logs.
    fn name(&self) -> &str;

    /// Returns `true` for forms that edit a model instance.
    fn is_model_form(&self) -> bool {
        false
    }

    /// Returns `true` if built forms take the `user` kwarg.
    fn accepts_user(&self) -> bool {
        false
    }

    /// Builds a form from `kwargs`.
    fn build(&self, kwargs: FormKwargs) -> DjangoResult<Box<dyn Form>>;
}

/// A shared form class.
pub type FormClassRef = Arc<dyn FormClass>;

impl fmt::Debug for dyn FormClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormClass")
            .field("name", &self.name())
            .field("is_model_form", &self.is_model_form())
            .field("accepts_user", &self.accepts_user())
            .finish()
    }
}

/// A form class producing [`BaseForm`]s from a list of fields.
///
/// # Examples
///
/// ```
/// use brackets_forms::fields::{FormFieldDef, FormFieldType};
/// use brackets_forms::form_class::{BaseFormClass, FormClass};
/// use brackets_forms::form::{Form, FormKwargs};
///
/// let profile = BaseFormClass::new("ProfileForm", vec![
///     FormFieldDef::new("bio", FormFieldType::char()),
/// ])
/// .model("accounts.Profile");
/// assert!(profile.is_model_form());
///
/// let form = profile.build(FormKwargs::new().prefix("profile")).unwrap();
/// assert_eq!(form.prefix(), Some("profile"));
/// ```
#[derive(Debug, Clone)]
pub struct BaseFormClass {
    name: String,
    fields: Vec<FormFieldDef>,
    model: Option<String>,
}

impl BaseFormClass {
    pub fn new(name: impl Into<String>, fields: Vec<FormFieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
            model: None,
        }
    }

    /// Makes this a model form editing instances of `model`.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns the edited model, for model forms.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Wraps this class in an [`Arc`].
    pub fn into_ref(self) -> FormClassRef {
        Arc::new(self)
    }
}

impl FormClass for BaseFormClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_model_form(&self) -> bool {
        self.model.is_some()
    }

    /// # Errors
    ///
    /// A `user` kwarg is rejected with [`DjangoError::ImproperlyConfigured`]:
    /// these forms have nowhere to keep it.
    fn build(&self, kwargs: FormKwargs) -> DjangoResult<Box<dyn Form>> {
        if kwargs.user.is_some() {
            return Err(DjangoError::ImproperlyConfigured(format!(
                "`{}` does not accept a `user` argument. Wrap it in `UserFormClass`.",
                self.name
            )));
        }
        Ok(Box::new(BaseForm::from_kwargs(self.fields.clone(), kwargs)))
    }
}
