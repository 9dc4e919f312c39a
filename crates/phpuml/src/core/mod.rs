//! Core abstractions for model extraction
//!
//! The syntax tree shape, the grammar engine, database and renderer traits,
//! errors and logging. Plugins implement these for a concrete language and
//! diagram format.

pub mod chumsky_utils;
mod database;
mod error;
pub mod logging;
mod renderer;
mod syntax;

pub use database::*;
pub use error::*;
pub use logging::*;
pub use renderer::*;
pub use syntax::*;
