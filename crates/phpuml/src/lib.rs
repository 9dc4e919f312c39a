//! phpuml - Convert PHP class hierarchies to nomnoml diagrams
//!
//! A library for extracting classes and interfaces from PHP sources and
//! rendering them as nomnoml text, ready for any nomnoml renderer.
//!
//! # Quick Start
//!
//! ```rust
//! use phpuml::render;
//!
//! let sources = ["<?php class Dog extends Animal implements Pet { private $name; }"];
//! let uml = render(&sources).unwrap();
//! assert_eq!(
//!     uml,
//!     "[Dog|-name;]\n[Dog] -:> [Animal]\n[Dog] --:> [<abstract><Pet>]\n"
//! );
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use phpuml::prelude::*;
//!
//! let source = "<?php interface Shape { public function area(): float; }";
//!
//! // Parse into a syntax tree
//! let tree = PhpParser::new().parse(source).unwrap();
//!
//! // Extract entities
//! let mut registry = EntityRegistry::new();
//! EntityExtractor::new().extract(&tree, &mut registry);
//! assert_eq!(registry.node_count(), 1);
//!
//! // Render to nomnoml
//! let uml = NomnomlRenderer::new().render(&registry).unwrap();
//! assert_eq!(uml, "[<abstract><Shape>||+area();]\n");
//! ```

pub mod core;
pub mod plugins;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{Database, DiagramError, GrammarEngine, Renderer, SyntaxNode, Tree, TreeRef};
    pub use crate::plugins::class::{
        Attribute, Entity, EntityExtractor, EntityKind, EntityRegistry, Method, NomnomlRenderer,
        Parameter, Visibility,
    };
    pub use crate::plugins::orchestrator::{BatchReport, Orchestrator, SourceFailure};
    pub use crate::plugins::php::PhpParser;
}

/// Render a batch of PHP sources to nomnoml text
///
/// Sources that fail to parse are skipped; see [`render_with_report`] to
/// find out which.
///
/// # Returns
/// * `Ok(String)` - The nomnoml text, possibly empty
/// * `Err` - If `sources` is empty
///
/// # Example
/// ```rust
/// use phpuml::render;
///
/// let uml = render(&["<?php class A {}", "<?php class {"]).unwrap();
/// assert_eq!(uml, "[A]\n");
/// ```
pub fn render<S: AsRef<str>>(sources: &[S]) -> anyhow::Result<String> {
    use crate::plugins::orchestrator::Orchestrator;

    Ok(Orchestrator::new().run(sources)?)
}

/// Render a batch and report entity count and per-source failures
///
/// # Example
/// ```rust
/// use phpuml::render_with_report;
///
/// let report = render_with_report(&["<?php class A {}", "<?php }"]).unwrap();
/// assert_eq!(report.entity_count, 1);
/// assert_eq!(report.failures[0].index, 1);
/// ```
pub fn render_with_report<S: AsRef<str>>(
    sources: &[S],
) -> anyhow::Result<plugins::orchestrator::BatchReport> {
    use crate::plugins::orchestrator::Orchestrator;

    Ok(Orchestrator::new().run_with_report(sources)?)
}

/// Extract entities without rendering
///
/// Useful when you need to inspect the model before rendering.
///
/// # Example
/// ```rust
/// use phpuml::parse;
///
/// let registry = parse(&["<?php class B extends A {}"]).unwrap();
/// assert_eq!(registry.get("B").unwrap().superclass.as_deref(), Some("A"));
/// ```
pub fn parse<S: AsRef<str>>(sources: &[S]) -> anyhow::Result<plugins::class::EntityRegistry> {
    use crate::plugins::orchestrator::Orchestrator;

    let (registry, _failures) = Orchestrator::new().extract(sources)?;
    Ok(registry)
}
