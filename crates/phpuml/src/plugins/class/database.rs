//! Entity registry
//!
//! Stores the classes and interfaces extracted from one batch, keyed by name
//! in first-seen order.

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::Database;

/// Visibility modifier for class members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public, // +
    Private,   // -
    Protected, // #
}

impl Visibility {
    /// Map a source modifier; missing or unknown modifiers are public
    pub fn from_modifier(modifier: Option<&str>) -> Self {
        match modifier.map(str::to_ascii_lowercase).as_deref() {
            Some("private") => Visibility::Private,
            Some("protected") => Visibility::Protected,
            _ => Visibility::Public,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
        }
    }

    pub fn with_type(mut self, t: impl Into<String>) -> Self {
        self.param_type = Some(t.into());
        self
    }
}

/// A property of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub visibility: Visibility,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub attr_type: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::default(),
            attr_type: None,
        }
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = v;
        self
    }

    pub fn with_type(mut self, t: impl Into<String>) -> Self {
        self.attr_type = Some(t.into());
        self
    }
}

/// A method of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub visibility: Visibility,
    pub parameters: Vec<Parameter>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::default(),
            parameters: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = v;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Class,
    Interface,
}

/// A class or interface in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Vec::new(),
            methods: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Interface)
    }

    pub fn with_superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    pub fn is_interface(&self) -> bool {
        self.kind == EntityKind::Interface
    }

    /// Generalization first, then one realization per interface
    pub fn relationships(&self) -> impl Iterator<Item = Relationship> + '_ {
        let generalization = self.superclass.iter().map(|parent| {
            Relationship::new(&self.name, parent, RelationshipKind::Generalization)
        });
        let realizations = self
            .interfaces
            .iter()
            .map(|iface| Relationship::new(&self.name, iface, RelationshipKind::Realization));
        generalization.chain(realizations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Generalization, // -:>
    Realization,    // --:>
}

/// A relationship between entities, named as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub kind: RelationshipKind,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

/// Insertion-ordered entity store for one batch
///
/// Upserting an existing name replaces the whole entity but keeps the
/// position where the name was first seen.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EntityRegistry {
    entities: IndexMap<String, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the replaced entity, if any
    pub fn upsert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.name.clone(), entity)
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl Database for EntityRegistry {
    type Node = Entity;
    type Edge = Relationship;

    fn add_node(&mut self, node: Self::Node) {
        self.upsert(node);
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.entities()
    }

    fn edges(&self) -> impl Iterator<Item = Self::Edge> {
        self.entities().flat_map(Entity::relationships)
    }

    fn clear(&mut self) {
        EntityRegistry::clear(self);
    }

    fn node_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_empty_entity() {
        let entity = Entity::class("Animal");
        assert_eq!(entity.name, "Animal");
        assert_eq!(entity.kind, EntityKind::Class);
        assert!(entity.attributes.is_empty());
        assert!(entity.methods.is_empty());
        assert!(entity.superclass.is_none());
    }

    #[test]
    fn test_add_members() {
        let mut entity = Entity::class("Person");
        entity.add_attribute(Attribute::new("name").with_type("string"));
        entity.add_attribute(Attribute::new("age").with_visibility(Visibility::Private));
        entity.add_method(
            Method::new("greet")
                .with_visibility(Visibility::Protected)
                .with_parameter(Parameter::new("other").with_type("Person")),
        );

        assert_eq!(entity.attributes.len(), 2);
        assert_eq!(entity.attributes[0].visibility, Visibility::Public);
        assert_eq!(entity.attributes[0].attr_type.as_deref(), Some("string"));
        assert_eq!(entity.methods[0].parameters[0].name, "other");
    }

    #[test]
    fn test_visibility_from_modifier() {
        assert_eq!(Visibility::from_modifier(None), Visibility::Public);
        assert_eq!(Visibility::from_modifier(Some("public")), Visibility::Public);
        assert_eq!(Visibility::from_modifier(Some("private")), Visibility::Private);
        assert_eq!(Visibility::from_modifier(Some("PROTECTED")), Visibility::Protected);
        assert_eq!(Visibility::from_modifier(Some("internal")), Visibility::Public);

        assert_eq!(Visibility::Public.to_char(), '+');
        assert_eq!(Visibility::Private.to_char(), '-');
        assert_eq!(Visibility::Protected.to_char(), '#');
    }

    #[test]
    fn test_upsert_replaces_and_keeps_position() {
        let mut registry = EntityRegistry::new();
        registry.upsert(Entity::class("Foo").with_superclass("Base"));
        registry.upsert(Entity::class("Bar"));
        let replaced = registry.upsert(Entity::interface("Foo"));

        assert!(replaced.is_some_and(|old| old.superclass.as_deref() == Some("Base")));
        assert_eq!(registry.len(), 2);

        let names: Vec<_> = registry.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Foo", "Bar"]);

        let foo = registry.get("Foo").unwrap();
        assert!(foo.is_interface());
        assert!(foo.superclass.is_none());
    }

    #[test]
    fn test_relationships_order() {
        let dog = Entity::class("Dog")
            .with_superclass("Animal")
            .with_interface("Pet")
            .with_interface("Loud");
        let rels: Vec<_> = dog.relationships().collect();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[0].kind, RelationshipKind::Generalization);
        assert_eq!(rels[0].to, "Animal");
        assert_eq!(rels[2], Relationship::new("Dog", "Loud", RelationshipKind::Realization));
    }

    #[test]
    fn test_database_trait() {
        let mut db = EntityRegistry::new();
        db.add_node(Entity::class("A").with_superclass("B"));
        db.add_node(Entity::class("B").with_interface("I"));

        assert_eq!(db.node_count(), 2);
        assert_eq!(db.edge_count(), 2);
        assert!(db.get_node("A").is_some());
        assert!(db.get_node("C").is_none());

        Database::clear(&mut db);
        assert!(db.is_empty());
    }

    #[test]
    fn test_registry_serializes_as_map() {
        let mut registry = EntityRegistry::new();
        registry.upsert(Entity::class("User"));
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["User"]["kind"], "class");
        assert_eq!(json["User"]["superclass"], serde_json::Value::Null);
    }
}
