//! Stale-now signalling to the presentation layer.
//!
//! Services that mutate user-visible state tell the presentation layer which
//! paths are stale. Rendering and cache eviction live outside this crate, so
//! the signal is a trait the embedder implements; [`NoopRevalidator`] is the
//! default for contexts with nothing to invalidate (CLI, tests).

/// Receives stale-path notifications after a successful mutation.
pub trait Revalidator: Send + Sync {
    /// Mark a rendered path as stale.
    fn revalidate(&self, path: &str);
}

/// Revalidator that drops every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRevalidator;

impl Revalidator for NoopRevalidator {
    fn revalidate(&self, _path: &str) {}
}
