//! Forms that take the requesting user.
//!
//! [`UserFormClass`] wraps any form class so its forms accept a `user`
//! kwarg: the user is taken out of the kwargs before the inner form is
//! built, and kept on the resulting [`UserForm`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use brackets_auth::RequestUser;
use brackets_core::DjangoResult;

use crate::fields::FormFieldDef;
use crate::form::{Form, FormErrors, FormKwargs};
use crate::form_class::{FormClass, FormClassRef};

/// A form carrying the user it was built for.
pub struct UserForm {
    inner: Box<dyn Form>,
    user: Option<RequestUser>,
}

impl UserForm {
    pub fn new(inner: Box<dyn Form>, user: Option<RequestUser>) -> Self {
        Self { inner, user }
    }

    /// Returns the wrapped form.
    pub fn into_inner(self) -> Box<dyn Form> {
        self.inner
    }
}

#[async_trait]
impl Form for UserForm {
    fn fields(&self) -> &[FormFieldDef] {
        self.inner.fields()
    }

    fn prefix(&self) -> Option<&str> {
        self.inner.prefix()
    }

    fn initial(&self) -> &Map<String, Value> {
        self.inner.initial()
    }

    fn instance(&self) -> Option<&Value> {
        self.inner.instance()
    }

    fn is_bound(&self) -> bool {
        self.inner.is_bound()
    }

    fn user(&self) -> Option<&RequestUser> {
        self.user.as_ref()
    }

    async fn is_valid(&mut self) -> bool {
        self.inner.is_valid().await
    }

    fn errors(&self) -> &FormErrors {
        self.inner.errors()
    }

    fn cleaned_data(&self) -> &Map<String, Value> {
        self.inner.cleaned_data()
    }
}

/// A form class whose forms accept the `user` kwarg.
pub struct UserFormClass {
    inner: FormClassRef,
}

impl UserFormClass {
    /// Returns a class accepting `user`: `class` itself when it already
    /// does, otherwise `class` wrapped.
    pub fn wrap(class: FormClassRef) -> FormClassRef {
        if class.accepts_user() {
            class
        } else {
            Arc::new(Self { inner: class })
        }
    }
}

impl FormClass for UserFormClass {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_model_form(&self) -> bool {
        self.inner.is_model_form()
    }

    fn accepts_user(&self) -> bool {
        true
    }

    fn build(&self, mut kwargs: FormKwargs) -> DjangoResult<Box<dyn Form>> {
        let user = kwargs.user.take();
        let inner = self.inner.build(kwargs)?;
        Ok(Box::new(UserForm::new(inner, user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FormFieldType;
    use crate::form_class::BaseFormClass;
    use brackets_auth::AbstractUser;
    use brackets_http::QueryDict;

    fn base() -> FormClassRef {
        BaseFormClass::new(
            "CommentForm",
            vec![FormFieldDef::new("body", FormFieldType::char())],
        )
        .into_ref()
    }

    #[test]
    fn test_wrap_marks_class_as_accepting_user() {
        let wrapped = UserFormClass::wrap(base());
        assert!(wrapped.accepts_user());
        assert_eq!(wrapped.name(), "CommentForm");
        assert!(!wrapped.is_model_form());
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let wrapped = UserFormClass::wrap(base());
        let again = UserFormClass::wrap(Arc::clone(&wrapped));
        assert!(Arc::ptr_eq(&wrapped, &again));
    }

    #[tokio::test]
    async fn test_build_keeps_user_and_validates() {
        let user = RequestUser::user(AbstractUser::new("ada"));
        let kwargs = FormKwargs::new()
            .user(user)
            .data(QueryDict::parse("body=Nice+post"));
        let mut form = UserFormClass::wrap(base()).build(kwargs).unwrap();

        assert_eq!(form.user().map(RequestUser::get_username), Some("ada"));
        assert!(form.is_valid().await);
        assert_eq!(form.cleaned_data()["body"], serde_json::json!("Nice post"));
    }

    #[test]
    fn test_build_without_user() {
        let form = UserFormClass::wrap(base())
            .build(FormKwargs::new())
            .unwrap();
        assert!(form.user().is_none());
    }
}
