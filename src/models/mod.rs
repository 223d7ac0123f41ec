//! Data models for the blog backend.
//!
//! Serialized camelCase so the persisted files and the HTTP payloads share one shape.

mod post;
mod settings;

pub use post::*;
pub use settings::*;
