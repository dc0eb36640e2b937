//! Internationalization module
//!
//! JSON-file based translations with nested-key lookup and parameter
//! formatting.

pub mod loader;

pub use loader::{I18n, TranslationParams};
