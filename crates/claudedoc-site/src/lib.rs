//! ClaudeDoc site generation
//!
//! Ties the scanner and the renderer to a documentation site on disk:
//! [`SiteConfig`] locates everything, the [`Reconciler`] commits pages, and
//! [`generate`] runs one full pass including the sidebar and title files.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod titles;

pub use claudedoc_render::EscapeDepth;
pub use config::SiteConfig;
pub use error::{Result, SiteError};
pub use pipeline::{generate, GenerationReport};
pub use reconcile::{write_if_changed, ReconcileReport, Reconciler, CATEGORY_FILE};
pub use titles::collect_titles;
