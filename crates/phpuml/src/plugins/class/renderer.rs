//! nomnoml renderer
//!
//! One line per entity, followed by its generalization and realization edges:
//!
//! ```text
//! [Dog|-name: string;|+bark(times: int);]
//! [Dog] -:> [Animal]
//! [Dog] --:> [<abstract><Pet>]
//! ```

use std::fmt::Write;

use tracing::{debug, span, Level};

use super::database::{
    Attribute, Entity, EntityRegistry, Method, Parameter, Relationship, RelationshipKind,
};
use crate::core::{DiagramError, Renderer};

/// Label of an interface box
fn abstract_label(name: &str) -> String {
    format!("<abstract><{}>", name)
}

/// Renders an [`EntityRegistry`] as nomnoml text
#[derive(Debug, Clone, Copy, Default)]
pub struct NomnomlRenderer;

impl NomnomlRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render every entity in registry order; empty registry gives ""
    pub fn render_registry(&self, registry: &EntityRegistry) -> String {
        let render_span = span!(Level::DEBUG, "render_nomnoml", entities = registry.len());
        let _enter = render_span.enter();

        let mut out = String::new();
        for entity in registry.entities() {
            self.write_entity(&mut out, entity);
            for relationship in entity.relationships() {
                self.write_relationship(&mut out, &relationship);
            }
        }

        debug!(output_len = out.len(), "Rendering completed");
        out
    }

    fn write_entity(&self, out: &mut String, entity: &Entity) {
        out.push('[');
        if entity.is_interface() {
            out.push_str(&abstract_label(&entity.name));
        } else {
            out.push_str(&entity.name);
        }

        if !entity.attributes.is_empty() || !entity.methods.is_empty() {
            out.push('|');
            for attribute in &entity.attributes {
                self.write_attribute(out, attribute);
            }
            if !entity.methods.is_empty() {
                out.push('|');
                for method in &entity.methods {
                    self.write_method(out, method);
                }
            }
        }

        out.push_str("]\n");
    }

    fn write_attribute(&self, out: &mut String, attribute: &Attribute) {
        out.push(attribute.visibility.to_char());
        out.push_str(&attribute.name);
        if let Some(ty) = &attribute.attr_type {
            out.push_str(": ");
            out.push_str(ty);
        }
        out.push(';');
    }

    fn write_method(&self, out: &mut String, method: &Method) {
        let params = method
            .parameters
            .iter()
            .map(format_parameter)
            .collect::<Vec<_>>()
            .join(", ");
        // writing into a String cannot fail
        let _ = write!(
            out,
            "{}{}({});",
            method.visibility.to_char(),
            method.name,
            params
        );
    }

    fn write_relationship(&self, out: &mut String, relationship: &Relationship) {
        let _ = match relationship.kind {
            RelationshipKind::Generalization => {
                writeln!(out, "[{}] -:> [{}]", relationship.from, relationship.to)
            }
            RelationshipKind::Realization => writeln!(
                out,
                "[{}] --:> [{}]",
                relationship.from,
                abstract_label(&relationship.to)
            ),
        };
    }
}

fn format_parameter(parameter: &Parameter) -> String {
    match &parameter.param_type {
        Some(ty) => format!("{}: {}", parameter.name, ty),
        None => parameter.name.clone(),
    }
}

impl Renderer<EntityRegistry> for NomnomlRenderer {
    type Output = String;

    fn render(&self, database: &EntityRegistry) -> Result<Self::Output, DiagramError> {
        Ok(self.render_registry(database))
    }

    fn name(&self) -> &'static str {
        "nomnoml"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "nomnoml"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::class::database::Visibility;

    fn render(registry: &EntityRegistry) -> String {
        NomnomlRenderer::new().render(registry).unwrap()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&EntityRegistry::new()), "");
    }

    #[test]
    fn test_render_empty_class() {
        let mut registry = EntityRegistry::new();
        registry.upsert(Entity::class("ClassName"));
        assert_eq!(render(&registry), "[ClassName]\n");
    }

    #[test]
    fn test_render_interface_label() {
        let mut registry = EntityRegistry::new();
        registry.upsert(Entity::interface("Shape"));
        assert_eq!(render(&registry), "[<abstract><Shape>]\n");
    }

    #[test]
    fn test_render_attributes_only() {
        let mut registry = EntityRegistry::new();
        let mut user = Entity::class("User");
        user.add_attribute(
            Attribute::new("email")
                .with_visibility(Visibility::Private)
                .with_type("string"),
        );
        user.add_attribute(Attribute::new("id").with_visibility(Visibility::Protected));
        registry.upsert(user);

        assert_eq!(render(&registry), "[User|-email: string;#id;]\n");
    }

    #[test]
    fn test_render_methods_only_keeps_empty_attribute_section() {
        let mut registry = EntityRegistry::new();
        let mut service = Entity::class("Service");
        service.add_method(
            Method::new("run")
                .with_parameter(Parameter::new("input").with_type("array"))
                .with_parameter(Parameter::new("flags")),
        );
        service.add_method(Method::new("stop").with_visibility(Visibility::Private));
        registry.upsert(service);

        assert_eq!(
            render(&registry),
            "[Service||+run(input: array, flags);-stop();]\n"
        );
    }

    #[test]
    fn test_render_relationships() {
        let mut registry = EntityRegistry::new();
        registry.upsert(Entity::class("Dog").with_superclass("Animal").with_interface("Pet"));
        registry.upsert(Entity::interface("Pet"));

        assert_eq!(
            render(&registry),
            "[Dog]\n[Dog] -:> [Animal]\n[Dog] --:> [<abstract><Pet>]\n[<abstract><Pet>]\n"
        );
    }

    #[test]
    fn test_renderer_metadata() {
        let renderer = NomnomlRenderer::new();
        assert_eq!(Renderer::<EntityRegistry>::name(&renderer), "nomnoml");
        assert_eq!(Renderer::<EntityRegistry>::format(&renderer), "nomnoml");
    }
}
