//! Views for brackets.
//!
//! - [`views`] - the class-based [`View`](views::class_based::View) protocol,
//!   list and form hosts, and the `ViewFunction` routers mount
//! - [`csrf`] - per-view CSRF checking

pub mod csrf;
pub mod views;

pub use csrf::CsrfViewMiddleware;
pub use views::class_based::{ContextMixin, View};
pub use views::function::ViewFunction;
