//! Entity extraction
//!
//! Walks a syntax tree depth-first and upserts one entity per named class or
//! interface. Every node's `children` and `body` edges are followed whatever
//! its kind, so declarations nested in blocks, statements and function bodies
//! are found too.

use tracing::{debug, trace};

use super::database::{Attribute, Entity, EntityKind, EntityRegistry, Method, Parameter, Visibility};
use crate::core::{ArgumentDecl, NodeKind, SyntaxNode, TreeRef};

/// Stateless tree walker feeding an [`EntityRegistry`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Walk `tree` and upsert every class and interface found
    pub fn extract<'a>(&self, tree: impl Into<TreeRef<'a>>, registry: &mut EntityRegistry) {
        self.walk(tree.into(), registry);
    }

    fn walk(&self, tree: TreeRef<'_>, registry: &mut EntityRegistry) {
        match tree {
            TreeRef::List(nodes) => {
                for node in nodes {
                    self.visit(node, registry);
                }
            }
            TreeRef::Node(node) => self.visit(node, registry),
        }
    }

    fn visit(&self, node: &SyntaxNode, registry: &mut EntityRegistry) {
        trace!(kind = node.kind_name(), start = node.span.start, "Visiting node");

        if let Some(entity) = self.entity_of(node) {
            debug!(
                entity = %entity.name,
                kind = ?entity.kind,
                attributes = entity.attributes.len(),
                methods = entity.methods.len(),
                "Entity extracted"
            );
            if registry.upsert(entity).is_some() {
                trace!("Replaced earlier entity with the same name");
            }
        }

        if let Some(children) = node.children() {
            self.walk(children, registry);
        }
        if let Some(body) = node.body() {
            self.walk(body, registry);
        }
    }

    /// The entity a class or interface node declares, if it has a name
    fn entity_of(&self, node: &SyntaxNode) -> Option<Entity> {
        let (name, kind, superclass, interfaces, body) = match &node.kind {
            NodeKind::Class {
                name,
                extends,
                implements,
                body,
                ..
            } => (
                name.as_ref()?,
                EntityKind::Class,
                extends.as_ref().map(|e| e.name.clone()),
                implements.iter().map(|i| i.name.clone()).collect::<Vec<_>>(),
                body,
            ),
            // an interface's parents are not modeled as a superclass
            NodeKind::Interface { name, body, .. } => {
                (name, EntityKind::Interface, None, Vec::new(), body)
            }
            _ => return None,
        };

        let mut entity = Entity::new(&name.name, kind);
        entity.superclass = superclass;
        entity.interfaces = interfaces;

        for member in body {
            match &member.kind {
                NodeKind::PropertyStatement {
                    visibility,
                    properties,
                    ..
                } => {
                    let visibility = Visibility::from_modifier(visibility.as_deref());
                    for property in properties {
                        let mut attribute =
                            Attribute::new(&property.name.name).with_visibility(visibility);
                        attribute.attr_type = property.ty.as_ref().map(|t| t.name.clone());
                        entity.add_attribute(attribute);
                    }
                }
                NodeKind::Method {
                    name,
                    visibility,
                    arguments,
                    ..
                } => {
                    let mut method = Method::new(&name.name)
                        .with_visibility(Visibility::from_modifier(visibility.as_deref()));
                    method.parameters = arguments.iter().map(parameter_of).collect();
                    entity.add_method(method);
                }
                _ => {}
            }
        }

        Some(entity)
    }
}

fn parameter_of(argument: &ArgumentDecl) -> Parameter {
    let parameter = Parameter::new(&argument.name.name);
    match &argument.ty {
        Some(ty) => parameter.with_type(&ty.name),
        None => parameter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Identifier, PropertyDecl, TypeRef};

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, 0..0)
    }

    fn node(kind: NodeKind) -> SyntaxNode {
        SyntaxNode::new(kind, 0..0)
    }

    fn class(name: Option<&str>, body: Vec<SyntaxNode>) -> SyntaxNode {
        node(NodeKind::Class {
            name: name.map(ident),
            extends: None,
            implements: vec![],
            is_abstract: false,
            is_final: false,
            body,
        })
    }

    fn method(name: &str, visibility: Option<&str>, body: Option<SyntaxNode>) -> SyntaxNode {
        node(NodeKind::Method {
            name: ident(name),
            visibility: visibility.map(str::to_string),
            is_static: false,
            is_abstract: false,
            arguments: vec![ArgumentDecl {
                name: ident("value"),
                ty: Some(TypeRef {
                    name: "int".to_string(),
                    span: 0..0,
                }),
                by_ref: false,
                variadic: false,
                promoted: None,
            }],
            return_type: None,
            body: body.map(Box::new),
        })
    }

    fn extract(tree: &SyntaxNode) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        EntityExtractor::new().extract(tree, &mut registry);
        registry
    }

    #[test]
    fn test_extract_members_with_default_visibility() {
        let props = node(NodeKind::PropertyStatement {
            visibility: None,
            is_static: false,
            properties: vec![
                PropertyDecl {
                    name: ident("a"),
                    ty: None,
                },
                PropertyDecl {
                    name: ident("b"),
                    ty: None,
                },
            ],
        });
        let program = node(NodeKind::Program {
            children: vec![class(
                Some("Box"),
                vec![
                    props,
                    method("set", Some("protected"), None),
                    node(NodeKind::ClassConstant {
                        names: vec![ident("MAX")],
                    }),
                ],
            )],
        });

        let registry = extract(&program);
        let entity = registry.get("Box").unwrap();
        assert_eq!(entity.attributes.len(), 2);
        assert!(entity
            .attributes
            .iter()
            .all(|a| a.visibility == Visibility::Public));
        assert_eq!(entity.methods[0].visibility, Visibility::Protected);
        assert_eq!(entity.methods[0].parameters[0].param_type.as_deref(), Some("int"));
    }

    #[test]
    fn test_extract_follows_method_and_function_bodies() {
        let inner = class(Some("Inner"), vec![]);
        let in_method = method(
            "build",
            None,
            Some(node(NodeKind::Block {
                children: vec![inner],
            })),
        );
        let in_function = node(NodeKind::Function {
            name: ident("factory"),
            arguments: vec![],
            return_type: None,
            body: Box::new(node(NodeKind::Block {
                children: vec![node(NodeKind::Statement {
                    children: vec![node(NodeKind::Block {
                        children: vec![class(Some("Deep"), vec![])],
                    })],
                })],
            })),
        });
        let program = node(NodeKind::Program {
            children: vec![class(Some("Outer"), vec![in_method]), in_function],
        });

        let registry = extract(&program);
        let names: Vec<_> = registry.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner", "Deep"]);
    }

    #[test]
    fn test_unnamed_class_is_walked_but_not_registered() {
        let anonymous = class(None, vec![method(
            "run",
            None,
            Some(node(NodeKind::Block {
                children: vec![class(Some("Hidden"), vec![])],
            })),
        )]);

        let registry = extract(&anonymous);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Hidden").is_some());
    }

    #[test]
    fn test_interface_extends_is_not_a_superclass() {
        let iface = node(NodeKind::Interface {
            name: ident("Shape"),
            extends: vec![ident("Drawable")],
            body: vec![],
        });
        let registry = extract(&iface);
        let entity = registry.get("Shape").unwrap();
        assert_eq!(entity.kind, EntityKind::Interface);
        assert!(entity.superclass.is_none());
        assert!(entity.interfaces.is_empty());
    }

    #[test]
    fn test_extract_from_list_position() {
        let nodes = vec![class(Some("A"), vec![]), class(Some("B"), vec![])];
        let mut registry = EntityRegistry::new();
        EntityExtractor::new().extract(nodes.as_slice(), &mut registry);
        assert_eq!(registry.len(), 2);
    }
}
