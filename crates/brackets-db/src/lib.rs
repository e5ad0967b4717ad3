//! Query descriptors for brackets views.
//!
//! A [`QuerySet`] records how a list of model rows should be shaped: which
//! relations to follow, which filters and which ordering to apply. Nothing
//! is executed against a database; [`QuerySet::evaluate`] applies the
//! filters and ordering to rows already in memory.

pub mod queryset;

pub use queryset::{OrderBy, QuerySet};
