//! # muse-content
//!
//! Static response templates and the card renderer.
//!
//! Templates are pre-authored JSON documents, one per content intent,
//! bundled into the binary and deployed to the data directory on first
//! run. Rendering is data-driven: one generic shell walks a per-intent
//! layout descriptor instead of seven hand-rolled card builders.

pub mod layout;
pub mod render;
pub mod templates;

pub use render::{render, render_failure, render_help, render_profile, render_update_help};
pub use templates::TemplateStore;
