//! Form field definitions and cleaning.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// The kind of a form field, which decides how raw input is cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormFieldType {
    /// Free text.
    Char {
        min_length: Option<usize>,
        max_length: Option<usize>,
        /// Trim surrounding whitespace before validating.
        strip: bool,
    },
    /// Letters, digits, underscores and hyphens.
    Slug,
    /// A whole number.
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
    /// An email address.
    Email,
    /// A checkbox. When required it must be checked.
    Boolean,
}

impl FormFieldType {
    /// A `Char` field with no length limits that strips whitespace.
    pub const fn char() -> Self {
        Self::Char {
            min_length: None,
            max_length: None,
            strip: true,
        }
    }

    /// An `Integer` field with no bounds.
    pub const fn integer() -> Self {
        Self::Integer {
            min_value: None,
            max_value: None,
        }
    }
}

/// One field of a form.
///
/// # Examples
///
/// ```
/// use brackets_forms::fields::{FormFieldDef, FormFieldType};
///
/// let field = FormFieldDef::new("title", FormFieldType::char()).label("Title");
/// assert_eq!(field.clean(Some("  Hello ")), Ok(serde_json::json!("Hello")));
/// assert_eq!(
///     field.clean(None),
///     Err(vec!["This field is required.".to_string()])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldDef {
    pub name: String,
    pub field_type: FormFieldType,
    pub required: bool,
    pub label: String,
    pub help_text: String,
}

impl FormFieldDef {
    /// Creates a required field labelled after its name.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let label = name.replace('_', " ");
        Self {
            name,
            field_type,
            required: true,
            label,
            help_text: String::new(),
        }
    }

    /// Sets whether the field is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    /// Cleans a raw submitted value.
    ///
    /// Missing or empty input fails a required field and becomes `null`
    /// otherwise. Errors accumulate, so a value can fail several checks.
    pub fn clean(&self, raw: Option<&str>) -> Result<Value, Vec<String>> {
        if self.field_type == FormFieldType::Boolean {
            return self.clean_boolean(raw);
        }

        let raw = raw.unwrap_or("");
        let raw = match self.field_type {
            FormFieldType::Char { strip: false, .. } => raw,
            _ => raw.trim(),
        };
        if raw.is_empty() {
            return if self.required {
                Err(vec![REQUIRED.to_string()])
            } else {
                Ok(Value::Null)
            };
        }

        let mut errors = Vec::new();
        let value = match &self.field_type {
            FormFieldType::Char {
                min_length,
                max_length,
                ..
            } => {
                let len = raw.chars().count();
                if let Some(min) = min_length.filter(|min| len < *min) {
                    errors.push(format!(
                        "Ensure this value has at least {min} characters (it has {len})."
                    ));
                }
                if let Some(max) = max_length.filter(|max| len > *max) {
                    errors.push(format!(
                        "Ensure this value has at most {max} characters (it has {len})."
                    ));
                }
                Value::String(raw.to_string())
            }
            FormFieldType::Slug => {
                if !slug_re().is_match(raw) {
                    errors.push(
                        "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens."
                            .to_string(),
                    );
                }
                Value::String(raw.to_string())
            }
            FormFieldType::Integer {
                min_value,
                max_value,
            } => match raw.parse::<i64>() {
                Ok(n) => {
                    if let Some(min) = min_value.filter(|min| n < *min) {
                        errors.push(format!(
                            "Ensure this value is greater than or equal to {min}."
                        ));
                    }
                    if let Some(max) = max_value.filter(|max| n > *max) {
                        errors.push(format!("Ensure this value is less than or equal to {max}."));
                    }
                    Value::from(n)
                }
                Err(_) => {
                    errors.push("Enter a whole number.".to_string());
                    Value::Null
                }
            },
            FormFieldType::Email => {
                if !email_re().is_match(raw) {
                    errors.push("Enter a valid email address.".to_string());
                }
                Value::String(raw.to_string())
            }
            FormFieldType::Boolean => return self.clean_boolean(Some(raw)),
        };

        if errors.is_empty() {
            Ok(value)
        } else {
            Err(errors)
        }
    }

    fn clean_boolean(&self, raw: Option<&str>) -> Result<Value, Vec<String>> {
        let checked = raw.is_some_and(|v| {
            !matches!(v.trim().to_lowercase().as_str(), "" | "false" | "0" | "off")
        });
        if self.required && !checked {
            return Err(vec![REQUIRED.to_string()]);
        }
        Ok(Value::Bool(checked))
    }
}

const REQUIRED: &str = "This field is required.";

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
    })
}
