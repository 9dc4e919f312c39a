//! Class diagram plugin
//!
//! Extracts classes and interfaces from syntax trees and renders them as
//! nomnoml.

mod database;
mod extractor;
mod renderer;

pub use database::{
    Attribute, Entity, EntityKind, EntityRegistry, Method, Parameter, Relationship,
    RelationshipKind, Visibility,
};
pub use extractor::EntityExtractor;
pub use renderer::NomnomlRenderer;
