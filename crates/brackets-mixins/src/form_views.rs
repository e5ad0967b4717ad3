//! Form-related mixins: passing the user to forms, CSRF exemption, and
//! views handling several forms at once.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};

use brackets_auth::RequestUserExt;
use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult};
use brackets_forms::{Form, FormClassRef, FormKwargs, UserFormClass};
use brackets_http::{HttpRequest, HttpResponse};
use brackets_views::views::form_view::{is_form_submission, FormMixin};
use brackets_views::View;

/// Hands the requesting user to the view's form.
///
/// Either call [`get_user_form`](FormWithUserMixin::get_user_form), or
/// route the view's own `get_form_class` / `get_form_kwargs` through
/// [`form_class_with_user`](FormWithUserMixin::form_class_with_user) and
/// [`form_kwargs_with_user`](FormWithUserMixin::form_kwargs_with_user).
pub trait FormWithUserMixin: FormMixin {
    /// Sets `kwargs.user` to the request's user.
    fn form_kwargs_with_user(&self, request: &HttpRequest, mut kwargs: FormKwargs) -> FormKwargs {
        kwargs.user = request.user().cloned();
        kwargs
    }

    /// Returns `class`, wrapped in [`UserFormClass`] unless it already
    /// accepts a user.
    fn form_class_with_user(&self, class: FormClassRef) -> FormClassRef {
        UserFormClass::wrap(class)
    }

    /// Builds the view's form with the requesting user attached.
    fn get_user_form(&self, request: &HttpRequest) -> DjangoResult<Box<dyn Form>> {
        let class = self.form_class_with_user(self.get_form_class()?);
        let kwargs = self.form_kwargs_with_user(request, self.get_form_kwargs(request)?);
        class.build(kwargs)
    }
}

/// Exempts the wrapped view from CSRF checks.
#[derive(Debug, Clone)]
pub struct CsrfExemptMixin<V>(pub V);

#[allow(clippy::upper_case_acronyms)]
pub type CSRFExemptMixin<V> = CsrfExemptMixin<V>;

#[async_trait]
impl<V: View> View for CsrfExemptMixin<V> {
    fn allowed_methods(&self) -> Vec<http::Method> {
        self.0.allowed_methods()
    }

    fn csrf_exempt(&self) -> bool {
        true
    }

    fn view_name(&self) -> &str {
        self.0.view_name()
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        self.0.dispatch(request).await
    }
}

/// Forms keyed by name.
pub type FormMap = BTreeMap<String, Box<dyn Form>>;

/// A view handling several named forms submitted together.
///
/// Every form is prefixed with its name, so their inputs do not collide.
/// Implement [`forms_valid`](MultipleFormsMixin::forms_valid) and
/// [`forms_invalid`](MultipleFormsMixin::forms_invalid), then answer POST
/// with [`post_forms`](MultipleFormsMixin::post_forms).
#[async_trait]
pub trait MultipleFormsMixin: Send + Sync {
    fn form_classes(&self) -> Option<BTreeMap<String, FormClassRef>> {
        None
    }

    fn form_initial_values(&self) -> Option<BTreeMap<String, Map<String, Value>>> {
        Some(BTreeMap::new())
    }

    /// The instances model forms edit.
    fn form_instances(&self) -> Option<BTreeMap<String, Value>> {
        None
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `form_classes` is unset.
    fn get_form_classes(&self) -> DjangoResult<BTreeMap<String, FormClassRef>> {
        self.form_classes().ok_or_else(|| {
            let c = short_type_name::<Self>();
            DjangoError::ImproperlyConfigured(format!(
                "{c} is missing a form_classes attribute. Define `{c}.form_classes`, \
                 or override `{c}.get_form_classes()`."
            ))
        })
    }

    /// Returns the initial values of form `name`, empty when it has none.
    fn get_initial(&self, name: &str) -> DjangoResult<Map<String, Value>> {
        let mut initial = self.form_initial_values().ok_or_else(|| {
            let c = short_type_name::<Self>();
            DjangoError::ImproperlyConfigured(format!(
                "{c} is missing a `form_initial_values` attribute. \
                 Define `{c}.form_initial_values`, or override `{c}.get_initial()`."
            ))
        })?;
        Ok(initial.remove(name).unwrap_or_default())
    }

    /// Returns the instance form `name` edits.
    fn get_instance(&self, name: &str) -> DjangoResult<Value> {
        let mut instances = self.form_instances().ok_or_else(|| {
            let c = short_type_name::<Self>();
            DjangoError::ImproperlyConfigured(format!(
                "{c} is missing a `form_instances` attribute. \
                 Define `{c}.form_instances`, or override `{c}.get_instance()`."
            ))
        })?;
        instances.remove(name).ok_or_else(|| {
            DjangoError::ImproperlyConfigured(format!("`{name}` is not an available instance."))
        })
    }

    /// Builds the kwargs of form `name`: its name as prefix, its initial
    /// values, its instance for model forms, and the submitted data and
    /// files on POST, PUT and PATCH.
    fn get_form_kwargs(&self, request: &HttpRequest, name: &str) -> DjangoResult<FormKwargs> {
        let classes = self.get_form_classes()?;
        let class = classes.get(name).ok_or_else(|| {
            DjangoError::ImproperlyConfigured(format!("`{name}` is not an available form."))
        })?;

        let mut kwargs = FormKwargs::new()
            .prefix(name)
            .initial(self.get_initial(name)?);
        if class.is_model_form() {
            kwargs = kwargs.instance(self.get_instance(name)?);
        }
        if is_form_submission(request) {
            kwargs = kwargs
                .data(request.post().clone())
                .files(request.files().clone());
        }
        Ok(kwargs)
    }

    /// Builds every form.
    fn get_forms(&self, request: &HttpRequest) -> DjangoResult<FormMap> {
        self.get_form_classes()?
            .into_iter()
            .map(|(name, class)| -> DjangoResult<(String, Box<dyn Form>)> {
                let form = class.build(self.get_form_kwargs(request, &name)?)?;
                Ok((name, form))
            })
            .collect()
    }

    /// Returns `{"forms": {name: form}}` for the view's context.
    fn forms_context(&self, request: &HttpRequest) -> DjangoResult<HashMap<String, Value>> {
        let forms: Map<String, Value> = self
            .get_forms(request)?
            .iter()
            .map(|(name, form)| (name.clone(), form.as_json()))
            .collect();
        Ok(HashMap::from([("forms".to_string(), Value::Object(forms))]))
    }

    /// Validates every form, so each one reports its errors, and returns
    /// whether all of them are valid.
    async fn validate_forms(&self, forms: &mut FormMap) -> bool {
        let mut all_valid = true;
        for form in forms.values_mut() {
            all_valid &= form.is_valid().await;
        }
        all_valid
    }

    async fn forms_valid(&self, request: HttpRequest, forms: FormMap) -> HttpResponse;

    async fn forms_invalid(&self, request: HttpRequest, forms: FormMap) -> HttpResponse;

    /// Builds and validates the forms, then hands them to `forms_valid` or
    /// `forms_invalid`.
    async fn post_forms(&self, request: HttpRequest) -> HttpResponse {
        let mut forms = match self.get_forms(&request) {
            Ok(forms) => forms,
            Err(e) => {
                tracing::error!(error = %e, path = request.path(), "building forms failed");
                return HttpResponse::from_error(&e);
            }
        };
        if self.validate_forms(&mut forms).await {
            self.forms_valid(request, forms).await
        } else {
            tracing::debug!(path = request.path(), "forms invalid");
            self.forms_invalid(request, forms).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brackets_auth::{AbstractUser, RequestUser};
    use brackets_forms::{BaseFormClass, FormFieldDef, FormFieldType};
    use brackets_http::JsonResponse;
    use http::{Method, StatusCode};
    use serde_json::json;

    struct Signup {
        instances: Option<BTreeMap<String, Value>>,
    }

    impl Signup {
        fn new() -> Self {
            Self {
                instances: Some(BTreeMap::from([("profile".to_string(), json!({"id": 7}))])),
            }
        }
    }

    #[async_trait]
    impl MultipleFormsMixin for Signup {
        fn form_classes(&self) -> Option<BTreeMap<String, FormClassRef>> {
            Some(BTreeMap::from([
                (
                    "contact".to_string(),
                    BaseFormClass::new("ContactForm", vec![FormFieldDef::new("email", FormFieldType::Email)])
                        .into_ref(),
                ),
                (
                    "profile".to_string(),
                    BaseFormClass::new("ProfileForm", vec![FormFieldDef::new("bio", FormFieldType::char())])
                        .model("accounts.Profile")
                        .into_ref(),
                ),
            ]))
        }

        fn form_initial_values(&self) -> Option<BTreeMap<String, Map<String, Value>>> {
            let mut contact = Map::new();
            contact.insert("email".into(), json!("you@example.com"));
            Some(BTreeMap::from([("contact".to_string(), contact)]))
        }

        fn form_instances(&self) -> Option<BTreeMap<String, Value>> {
            self.instances.clone()
        }

        async fn forms_valid(&self, _request: HttpRequest, forms: FormMap) -> HttpResponse {
            let cleaned: Map<String, Value> = forms
                .iter()
                .map(|(name, form)| (name.clone(), Value::Object(form.cleaned_data().clone())))
                .collect();
            JsonResponse::new(&cleaned)
        }

        async fn forms_invalid(&self, _request: HttpRequest, forms: FormMap) -> HttpResponse {
            let errors: Map<String, Value> = forms
                .iter()
                .map(|(name, form)| (name.clone(), json!(form.errors())))
                .collect();
            JsonResponse::with_status(StatusCode::BAD_REQUEST, &errors)
        }
    }

    #[async_trait]
    impl View for Signup {
        async fn post(&self, request: HttpRequest) -> HttpResponse {
            self.post_forms(request).await
        }
    }

    struct Empty;

    #[async_trait]
    impl MultipleFormsMixin for Empty {
        fn form_initial_values(&self) -> Option<BTreeMap<String, Map<String, Value>>> {
            None
        }

        async fn forms_valid(&self, _request: HttpRequest, _forms: FormMap) -> HttpResponse {
            HttpResponse::ok("")
        }

        async fn forms_invalid(&self, _request: HttpRequest, _forms: FormMap) -> HttpResponse {
            HttpResponse::bad_request("")
        }
    }

    fn post(body: &str) -> HttpRequest {
        HttpRequest::builder()
            .method(Method::POST)
            .path("/signup/")
            .form(body)
            .build()
    }

    #[test]
    fn test_form_kwargs_per_name() {
        let request = HttpRequest::builder().build();
        let contact = Signup::new().get_form_kwargs(&request, "contact").unwrap();
        assert_eq!(contact.prefix.as_deref(), Some("contact"));
        assert_eq!(contact.initial["email"], json!("you@example.com"));
        assert!(contact.instance.is_none());
        assert!(contact.data.is_none());

        let profile = Signup::new().get_form_kwargs(&request, "profile").unwrap();
        assert!(profile.initial.is_empty());
        assert_eq!(profile.instance, Some(json!({"id": 7})));
    }

    #[test]
    fn test_form_kwargs_bind_submissions() {
        let kwargs = Signup::new()
            .get_form_kwargs(&post("contact-email=ada%40example.com"), "contact")
            .unwrap();
        assert_eq!(kwargs.data.unwrap().get("contact-email"), Some("ada@example.com"));
    }

    #[test]
    fn test_missing_instance() {
        let view = Signup {
            instances: Some(BTreeMap::new()),
        };
        let Err(err) = view.get_forms(&HttpRequest::builder().build()) else {
            panic!("forms built without their instance");
        };
        assert!(err.to_string().contains("`profile` is not an available instance."));

        let view = Signup { instances: None };
        let err = view.get_instance("profile").unwrap_err();
        assert!(err.to_string().contains("Signup is missing a `form_instances` attribute."));
    }

    #[test]
    fn test_missing_configuration() {
        let err = Empty.get_form_classes().unwrap_err();
        assert!(err.to_string().contains("Empty is missing a form_classes attribute."));
        assert!(Empty.get_initial("any").unwrap_err().is_improperly_configured());

        let err = Signup::new()
            .get_form_kwargs(&HttpRequest::builder().build(), "billing")
            .unwrap_err();
        assert!(err.to_string().contains("`billing` is not an available form."));
    }

    #[test]
    fn test_forms_context() {
        let context = Signup::new()
            .forms_context(&HttpRequest::builder().build())
            .unwrap();
        let forms = &context["forms"];
        assert_eq!(forms["contact"]["prefix"], json!("contact"));
        assert_eq!(forms["profile"]["fields"][0]["name"], json!("profile-bio"));
    }

    #[tokio::test]
    async fn test_post_all_valid() {
        let response = Signup::new()
            .dispatch(post("contact-email=ada%40example.com&profile-bio=Hello"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.content_bytes()).unwrap();
        assert_eq!(body["contact"]["email"], json!("ada@example.com"));
        assert_eq!(body["profile"]["bio"], json!("Hello"));
    }

    #[tokio::test]
    async fn test_post_reports_errors_of_every_form() {
        let response = Signup::new().dispatch(post("contact-email=nope")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(response.content_bytes()).unwrap();
        assert!(body["contact"]["email"].is_array());
        assert_eq!(body["profile"]["bio"], json!(["This field is required."]));
    }

    #[tokio::test]
    async fn test_put_and_patch_not_handled() {
        for method in [Method::PUT, Method::PATCH] {
            let request = HttpRequest::builder().method(method).build();
            let response = Signup::new().dispatch(request).await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
    }

    #[tokio::test]
    async fn test_misconfigured_post_answers_server_error() {
        let view = Signup { instances: None };
        let response = view.post_forms(post("")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    struct Comment;

    impl FormMixin for Comment {
        fn form_class(&self) -> Option<FormClassRef> {
            Some(
                BaseFormClass::new("CommentForm", vec![FormFieldDef::new("body", FormFieldType::char())])
                    .into_ref(),
            )
        }
    }

    impl FormWithUserMixin for Comment {}

    #[test]
    fn test_form_with_user() {
        let mut request = HttpRequest::builder().build();
        request.set_user(AbstractUser::new("ada"));
        let form = Comment.get_user_form(&request).unwrap();
        assert_eq!(form.user().map(RequestUser::get_username), Some("ada"));

        let anonymous = Comment.get_user_form(&HttpRequest::builder().build()).unwrap();
        assert!(anonymous.user().is_none());
    }

    #[test]
    fn test_form_class_with_user_wraps_once() {
        let class = Comment.form_class_with_user(Comment.get_form_class().unwrap());
        assert!(class.accepts_user());
        let again = Comment.form_class_with_user(std::sync::Arc::clone(&class));
        assert!(std::sync::Arc::ptr_eq(&class, &again));
    }

    #[test]
    fn test_csrf_exempt_wrapper() {
        let view: CSRFExemptMixin<Signup> = CsrfExemptMixin(Signup::new());
        assert!(view.csrf_exempt());
        assert_eq!(view.view_name(), "Signup");
    }
}
