//! Core types shared by the brackets crates.
//!
//! - [`error`] - the [`DjangoError`](error::DjangoError) enum and result alias
//! - [`settings`] - [`Settings`](settings::Settings) and the global [`SETTINGS`](settings::SETTINGS)
//! - [`settings_loader`] - TOML, JSON and environment loading
//! - [`logging`] - subscriber setup and dispatch spans
//! - [`utils`] - small shared helpers

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

pub use error::{DjangoError, DjangoResult, ValidationError};
pub use settings::{Settings, SETTINGS};
