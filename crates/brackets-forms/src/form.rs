//! The [`Form`] trait, the [`BaseForm`] implementation and [`FormKwargs`].
//!
//! A form is built from [`FormKwargs`]: an optional prefix namespacing its
//! input names, initial values, an optional model instance, and the
//! submitted data. Forms built without data are unbound and never valid.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use brackets_auth::RequestUser;
use brackets_http::{QueryDict, UploadedFile};

use crate::fields::FormFieldDef;

/// Per-field error messages, keyed by field name. Form-wide errors live
/// under `"__all__"`.
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// The arguments a form is constructed with.
#[derive(Debug, Clone, Default)]
pub struct FormKwargs {
    /// Namespaces input names as `"{prefix}-{field}"`.
    pub prefix: Option<String>,
    /// Initial values shown on an unbound form.
    pub initial: Map<String, Value>,
    /// The object a model form edits.
    pub instance: Option<Value>,
    /// Submitted data. `Some` binds the form.
    pub data: Option<QueryDict>,
    /// Submitted files.
    pub files: HashMap<String, Vec<UploadedFile>>,
    /// The requesting user, for forms that accept one.
    pub user: Option<RequestUser>,
}

impl FormKwargs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn initial(mut self, initial: Map<String, Value>) -> Self {
        self.initial = initial;
        self
    }

    #[must_use]
    pub fn instance(mut self, instance: Value) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Binds the form to `data`.
    #[must_use]
    pub fn data(mut self, data: QueryDict) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn files(mut self, files: HashMap<String, Vec<UploadedFile>>) -> Self {
        self.files = files;
        self
    }

    #[must_use]
    pub fn user(mut self, user: RequestUser) -> Self {
        self.user = Some(user);
        self
    }
}

/// A form: a set of fields that cleans and validates submitted data.
///
/// `is_valid` is async so implementations can run I/O-bound checks in
/// [`clean`](Form::clean).
#[async_trait]
pub trait Form: Send + Sync {
    /// Returns the field definitions.
    fn fields(&self) -> &[FormFieldDef];

    /// Returns the input-name prefix.
    fn prefix(&self) -> Option<&str>;

    /// Returns the initial values.
    fn initial(&self) -> &Map<String, Value>;

    /// Returns the model instance, for model forms.
    fn instance(&self) -> Option<&Value>;

    /// Returns `true` if the form was built with submitted data.
    fn is_bound(&self) -> bool;

    /// Returns the user the form was built for, if it accepts one.
    fn user(&self) -> Option<&RequestUser> {
        None
    }

    /// Cleans every field and runs [`clean`](Form::clean). Unbound forms
    /// are never valid.
    async fn is_valid(&mut self) -> bool;

    /// Returns the errors found by the last `is_valid` call.
    fn errors(&self) -> &FormErrors;

    /// Returns the cleaned values from the last `is_valid` call.
    fn cleaned_data(&self) -> &Map<String, Value>;

    /// Cross-field validation hook, run after the fields are cleaned.
    async fn clean(&self) -> Result<(), FormErrors> {
        Ok(())
    }

    /// Returns the input name of a field, including the prefix.
    fn add_prefix(&self, field_name: &str) -> String {
        self.prefix()
            .map_or_else(|| field_name.to_string(), |p| format!("{p}-{field_name}"))
    }

    /// Describes the form for a JSON context.
    fn as_json(&self) -> Value {
        let fields: Vec<Value> = self
            .fields()
            .iter()
            .map(|f| {
                json!({
                    "name": self.add_prefix(&f.name),
                    "label": f.label,
                    "required": f.required,
                    "initial": self.initial().get(&f.name).cloned().unwrap_or(Value::Null),
                })
            })
            .collect();
        json!({
            "prefix": self.prefix(),
            "is_bound": self.is_bound(),
            "fields": fields,
            "errors": self.errors(),
        })
    }
}

/// A general-purpose form built from field definitions.
///
/// # Examples
///
/// ```
/// use brackets_forms::fields::{FormFieldDef, FormFieldType};
/// use brackets_forms::form::{BaseForm, Form, FormKwargs};
/// use brackets_http::QueryDict;
///
/// let fields = vec![FormFieldDef::new("name", FormFieldType::char())];
/// let kwargs = FormKwargs::new()
///     .prefix("author")
///     .data(QueryDict::parse("author-name=Ada"));
/// let form = BaseForm::from_kwargs(fields, kwargs);
/// assert!(form.is_bound());
/// assert_eq!(form.add_prefix("name"), "author-name");
/// ```
#[derive(Debug, Clone)]
pub struct BaseForm {
    fields: Vec<FormFieldDef>,
    prefix: Option<String>,
    initial: Map<String, Value>,
    instance: Option<Value>,
    data: Option<QueryDict>,
    files: HashMap<String, Vec<UploadedFile>>,
    errors: FormErrors,
    cleaned_data: Map<String, Value>,
}

impl BaseForm {
    /// Creates an unbound form.
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self::from_kwargs(fields, FormKwargs::default())
    }

    /// Creates a form from kwargs. The `user` kwarg is not kept; wrap the
    /// form in a [`UserForm`](crate::user_form::UserForm) for that.
    pub fn from_kwargs(fields: Vec<FormFieldDef>, kwargs: FormKwargs) -> Self {
        Self {
            fields,
            prefix: kwargs.prefix,
            initial: kwargs.initial,
            instance: kwargs.instance,
            data: kwargs.data,
            files: kwargs.files,
            errors: FormErrors::new(),
            cleaned_data: Map::new(),
        }
    }

    /// Returns the submitted files.
    pub const fn files(&self) -> &HashMap<String, Vec<UploadedFile>> {
        &self.files
    }

    /// Returns the form-wide errors.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get("__all__").map_or(&[], Vec::as_slice)
    }
}

#[async_trait]
impl Form for BaseForm {
    fn fields(&self) -> &[FormFieldDef] {
        &self.fields
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn initial(&self) -> &Map<String, Value> {
        &self.initial
    }

    fn instance(&self) -> Option<&Value> {
        self.instance.as_ref()
    }

    fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    async fn is_valid(&mut self) -> bool {
        self.errors.clear();
        self.cleaned_data.clear();
        let Some(data) = &self.data else {
            return false;
        };

        for field in &self.fields {
            let name = self.prefix.as_deref().map_or_else(
                || field.name.clone(),
                |p| format!("{p}-{}", field.name),
            );
            match field.clean(data.get(&name)) {
                Ok(value) => {
                    self.cleaned_data.insert(field.name.clone(), value);
                }
                Err(messages) => {
                    self.errors.insert(field.name.clone(), messages);
                }
            }
        }

        if let Err(form_errors) = self.clean().await {
            for (key, messages) in form_errors {
                self.errors.entry(key).or_default().extend(messages);
            }
        }
        self.errors.is_empty()
    }

    fn errors(&self) -> &FormErrors {
        &self.errors
    }

    fn cleaned_data(&self) -> &Map<String, Value> {
        &self.cleaned_data
    }
}
