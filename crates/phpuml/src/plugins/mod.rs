//! Plugin implementations
//!
//! `php` turns PHP sources into syntax trees, `class` extracts and renders
//! the class model, and the orchestrator runs them over a batch.

pub mod class;
pub mod orchestrator;
pub mod php;

pub use class::*;
pub use orchestrator::*;
pub use php::PhpParser;
