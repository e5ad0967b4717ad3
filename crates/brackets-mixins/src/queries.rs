//! Queryset shaping for list views.
//!
//! Each mixin contributes a `*_queryset` step. A view layers them in its
//! own [`get_queryset`](brackets_views::views::generic::MultipleObjectMixin::get_queryset):
//!
//! ```
//! use brackets_core::DjangoResult;
//! use brackets_db::QuerySet;
//! use brackets_http::HttpRequest;
//! use brackets_mixins::queries::{OrderableListMixin, SelectRelatedMixin};
//! use brackets_views::views::generic::MultipleObjectMixin;
//!
//! struct Articles;
//!
//! impl SelectRelatedMixin for Articles {
//!     fn select_related(&self) -> &[&str] {
//!         &["author"]
//!     }
//! }
//!
//! impl OrderableListMixin for Articles {
//!     fn orderable_fields(&self) -> &[&str] {
//!         &["title", "published"]
//!     }
//!
//!     fn orderable_field_default(&self) -> &str {
//!         "published"
//!     }
//! }
//!
//! impl MultipleObjectMixin for Articles {
//!     fn model(&self) -> Option<&str> {
//!         Some("blog.Article")
//!     }
//!
//!     fn get_queryset(&self, request: &HttpRequest) -> DjangoResult<QuerySet> {
//!         let queryset = self.select_related_queryset(self.base_queryset()?)?;
//!         self.orderable_queryset(request, queryset)
//!     }
//! }
//!
//! let request = HttpRequest::builder().query_string("order_by=title&order_dir=desc").build();
//! let queryset = Articles.get_queryset(&request).unwrap();
//! assert_eq!(queryset.get_select_related(), ["author"]);
//! assert_eq!(queryset.ordering()[0].to_string(), "-title");
//! ```

use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult};
use brackets_db::{OrderBy, QuerySet};
use brackets_http::HttpRequest;

/// Adds `select_related` lookups to a queryset.
pub trait SelectRelatedMixin {
    fn select_related(&self) -> &[&str] {
        &[]
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `select_related` is empty.
    fn get_select_related(&self) -> DjangoResult<Vec<String>> {
        let fields = self.select_related();
        if fields.is_empty() {
            let c = short_type_name::<Self>();
            return Err(DjangoError::ImproperlyConfigured(format!(
                "{c} is missing the select_related attribute. Define `{c}.select_related`, \
                 or override `{c}.get_select_related()`."
            )));
        }
        Ok(fields.iter().map(ToString::to_string).collect())
    }

    /// Adds the lookups to `queryset`, keeping the ones it already has.
    fn select_related_queryset(&self, queryset: QuerySet) -> DjangoResult<QuerySet> {
        let fields = self.get_select_related()?;
        Ok(queryset.select_related(fields.iter().map(String::as_str).collect()))
    }
}

/// Adds `prefetch_related` lookups to a queryset.
pub trait PrefetchRelatedMixin {
    fn prefetch_related(&self) -> &[&str] {
        &[]
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when `prefetch_related` is empty.
    fn get_prefetch_related(&self) -> DjangoResult<Vec<String>> {
        let fields = self.prefetch_related();
        if fields.is_empty() {
            let c = short_type_name::<Self>();
            return Err(DjangoError::ImproperlyConfigured(format!(
                "{c} is missing the prefetch_related attribute. Define `{c}.prefetch_related`, \
                 or override `{c}.get_prefetch_related()`."
            )));
        }
        Ok(fields.iter().map(ToString::to_string).collect())
    }

    fn prefetch_related_queryset(&self, queryset: QuerySet) -> DjangoResult<QuerySet> {
        let fields = self.get_prefetch_related()?;
        Ok(queryset.prefetch_related(fields.iter().map(String::as_str).collect()))
    }
}

/// Orders a list by a field picked from the query string.
///
/// `?order_by=<field>&order_dir=<asc|desc>` selects the ordering; fields
/// outside [`orderable_fields`](OrderableListMixin::orderable_fields) are
/// ignored.
pub trait OrderableListMixin {
    fn orderable_fields(&self) -> &[&str] {
        &[]
    }

    fn orderable_field_default(&self) -> &str {
        ""
    }

    fn orderable_direction_default(&self) -> &str {
        "asc"
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when no field is orderable.
    fn get_orderable_fields(&self) -> DjangoResult<Vec<String>> {
        let fields = self.orderable_fields();
        if fields.is_empty() {
            return Err(DjangoError::missing_attribute(
                short_type_name::<Self>(),
                "orderable_fields",
                "get_orderable_fields",
            ));
        }
        Ok(fields.iter().map(ToString::to_string).collect())
    }

    fn get_orderable_field_default(&self) -> DjangoResult<String> {
        let field = self.orderable_field_default();
        if field.is_empty() {
            return Err(DjangoError::missing_attribute(
                short_type_name::<Self>(),
                "orderable_field_default",
                "get_orderable_field_default",
            ));
        }
        Ok(field.to_string())
    }

    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] unless the default is `asc`
    /// or `desc`.
    fn get_orderable_direction_default(&self) -> DjangoResult<String> {
        let direction = self.orderable_direction_default();
        if matches!(direction, "asc" | "desc") {
            return Ok(direction.to_string());
        }
        Err(DjangoError::ImproperlyConfigured(format!(
            "{}.orderable_direction_default must be 'asc' or 'desc'.",
            short_type_name::<Self>()
        )))
    }

    /// Returns the lower-cased `(field, direction)` requested, falling
    /// back to the defaults for missing parameters.
    fn get_order_from_request(&self, request: &HttpRequest) -> DjangoResult<(String, String)> {
        let field = match request.get().get("order_by").filter(|f| !f.is_empty()) {
            Some(field) => field.to_lowercase(),
            None => self.get_orderable_field_default()?,
        };
        let direction = match request.get().get("order_dir").filter(|d| !d.is_empty()) {
            Some(direction) => direction.to_lowercase(),
            None => self.get_orderable_direction_default()?,
        };
        Ok((field, direction))
    }

    /// Orders `queryset` by the requested field when it is orderable.
    /// Anything but `desc` sorts ascending.
    fn orderable_queryset(&self, request: &HttpRequest, queryset: QuerySet) -> DjangoResult<QuerySet> {
        let (field, direction) = self.get_order_from_request(request)?;
        let allowed = self.get_orderable_fields()?;
        if !allowed.contains(&field) {
            tracing::debug!(field = %field, "ignoring ordering by a field that is not orderable");
            return Ok(queryset);
        }
        let order = if direction == "desc" {
            OrderBy::desc(field)
        } else {
            OrderBy::asc(field)
        };
        Ok(queryset.order_by(vec![order]))
    }
}
