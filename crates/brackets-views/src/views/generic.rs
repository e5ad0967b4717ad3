//! Generic list views.
//!
//! Objects are represented as `serde_json::Value`. A [`QuerySet`] describes
//! which rows to show and in which order; the view supplies the rows.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use brackets_core::utils::short_type_name;
use brackets_core::{DjangoError, DjangoResult};
use brackets_db::{OrderBy, QuerySet};
use brackets_http::{HttpRequest, HttpResponse, JsonResponse};

use super::class_based::ContextMixin;

/// Provides the queryset of a view that works with a list of objects.
///
/// To layer behavior onto the queryset, override
/// [`get_queryset`](MultipleObjectMixin::get_queryset) and start from
/// [`base_queryset`](MultipleObjectMixin::base_queryset).
pub trait MultipleObjectMixin: Send + Sync {
    /// The model label, e.g. `"blog.Article"`.
    fn model(&self) -> Option<&str> {
        None
    }

    /// An explicit queryset, used instead of the model's default one.
    fn queryset(&self) -> Option<QuerySet> {
        None
    }

    /// Default ordering, in `"-field"` notation.
    fn ordering(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Returns the explicit queryset, otherwise the model's default one,
    /// ordered by [`ordering`](MultipleObjectMixin::ordering) when set.
    ///
    /// # Errors
    ///
    /// [`DjangoError::ImproperlyConfigured`] when neither is defined.
    fn base_queryset(&self) -> DjangoResult<QuerySet> {
        let queryset = match (self.queryset(), self.model()) {
            (Some(queryset), _) => queryset,
            (None, Some(model)) => QuerySet::new(model),
            (None, None) => {
                let view = short_type_name::<Self>();
                return Err(DjangoError::ImproperlyConfigured(format!(
                    "{view} is missing a QuerySet. Define {view}.model, {view}.queryset, \
                     or override {view}.get_queryset()."
                )));
            }
        };

        let ordering = self.ordering();
        if ordering.is_empty() {
            Ok(queryset)
        } else {
            Ok(queryset.order_by(ordering.into_iter().map(OrderBy::parse).collect()))
        }
    }

    /// Returns the queryset for `request`.
    fn get_queryset(&self, _request: &HttpRequest) -> DjangoResult<QuerySet> {
        self.base_queryset()
    }
}

/// A view listing objects as JSON under `object_list`.
#[async_trait]
pub trait ListView: MultipleObjectMixin + ContextMixin {
    /// Loads the rows the queryset is evaluated against.
    async fn load_rows(&self, queryset: &QuerySet) -> DjangoResult<Vec<Value>>;

    /// Handles GET: evaluates the queryset and renders the context.
    async fn list(&self, request: HttpRequest) -> HttpResponse {
        let result = async {
            let queryset = self.get_queryset(&request)?;
            let rows = self.load_rows(&queryset).await?;
            let mut context = self.get_context_data(&request, &HashMap::new())?;
            context.insert(
                "object_list".to_string(),
                Value::Array(queryset.evaluate(&rows)),
            );
            Ok::<_, DjangoError>(context)
        }
        .await;

        match result {
            Ok(context) => JsonResponse::new(&context),
            Err(e) => {
                tracing::error!(error = %e, path = request.path(), "list view failed");
                HttpResponse::from_error(&e)
            }
        }
    }
}
