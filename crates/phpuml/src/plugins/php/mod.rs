//! PHP grammar engine
//!
//! A chumsky lexer feeding a recursive descent parser that models
//! declarations and keeps every other statement as an opaque container.

pub mod lexer;
pub mod parser;

pub use parser::PhpParser;
