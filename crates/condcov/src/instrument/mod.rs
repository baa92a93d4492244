//! Source instrumentation
//!
//! Decomposes every conditional test into atomic conditions, records a
//! [`ConditionalSite`](crate::coverage::ConditionalSite) for it, and inserts a
//! probe call ahead of the conditional. The rewrite is a pure tree
//! transformation: the original statements are kept verbatim.

mod decompose;
mod instrumenter;

pub use decompose::decompose;
pub use instrumenter::{instrument, Instrumenter};
