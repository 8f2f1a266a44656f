//! ClaudeDoc source watcher
//!
//! [`SourceWatcher`] turns filesystem notifications into a stream of changed
//! paths, filtered through an [`IgnoreFilter`]; [`DebounceScheduler`]
//! coalesces that stream into single-flight regeneration runs.

pub mod ignore;
pub mod scheduler;
pub mod watcher;

pub use ignore::IgnoreFilter;
pub use scheduler::{DebounceScheduler, DEFAULT_DEBOUNCE};
pub use watcher::{SourceWatcher, WatchTargets};
