//! Syntax tree produced by a grammar engine
//!
//! Nodes are a tagged union over the declaration kinds the extractor cares
//! about plus generic containers. Whatever the kind, a node exposes at most two
//! generic edges, [`SyntaxNode::children`] and [`SyntaxNode::body`], and each
//! edge is either a single node or an ordered list of nodes ([`TreeRef`]).

use std::ops::Range;

use super::error::DiagramError;

/// Byte range of a node in its source text
pub type Span = Range<usize>;

/// A declared name, e.g. a class name or a property name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A type annotation as written, whitespace removed (`?Foo`, `A|B`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub span: Span,
}

/// One property inside a property statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: Identifier,
    pub ty: Option<TypeRef>,
}

/// One declared function/method argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDecl {
    pub name: Identifier,
    pub ty: Option<TypeRef>,
    pub by_ref: bool,
    pub variadic: bool,
    /// Promotion modifier of a constructor argument, if any
    pub promoted: Option<String>,
}

/// Node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program {
        children: Vec<SyntaxNode>,
    },
    Namespace {
        name: Option<String>,
        children: Vec<SyntaxNode>,
    },
    Block {
        children: Vec<SyntaxNode>,
    },
    /// Any statement that is not modeled; keeps the blocks nested in it
    Statement {
        children: Vec<SyntaxNode>,
    },
    Class {
        name: Option<Identifier>,
        extends: Option<Identifier>,
        implements: Vec<Identifier>,
        is_abstract: bool,
        is_final: bool,
        body: Vec<SyntaxNode>,
    },
    Interface {
        name: Identifier,
        extends: Vec<Identifier>,
        body: Vec<SyntaxNode>,
    },
    Trait {
        name: Identifier,
        body: Vec<SyntaxNode>,
    },
    Enum {
        name: Identifier,
        implements: Vec<Identifier>,
        body: Vec<SyntaxNode>,
    },
    Function {
        name: Identifier,
        arguments: Vec<ArgumentDecl>,
        return_type: Option<TypeRef>,
        body: Box<SyntaxNode>,
    },
    PropertyStatement {
        visibility: Option<String>,
        is_static: bool,
        properties: Vec<PropertyDecl>,
    },
    Method {
        name: Identifier,
        visibility: Option<String>,
        is_static: bool,
        is_abstract: bool,
        arguments: Vec<ArgumentDecl>,
        return_type: Option<TypeRef>,
        body: Option<Box<SyntaxNode>>,
    },
    ClassConstant {
        names: Vec<Identifier>,
    },
    TraitUse {
        traits: Vec<Identifier>,
    },
    EnumCase {
        name: Identifier,
    },
}

/// A syntax tree node
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The kind discriminator, as used in logs
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "program",
            NodeKind::Namespace { .. } => "namespace",
            NodeKind::Block { .. } => "block",
            NodeKind::Statement { .. } => "statement",
            NodeKind::Class { .. } => "class",
            NodeKind::Interface { .. } => "interface",
            NodeKind::Trait { .. } => "trait",
            NodeKind::Enum { .. } => "enum",
            NodeKind::Function { .. } => "function",
            NodeKind::PropertyStatement { .. } => "propertystatement",
            NodeKind::Method { .. } => "method",
            NodeKind::ClassConstant { .. } => "classconstant",
            NodeKind::TraitUse { .. } => "traituse",
            NodeKind::EnumCase { .. } => "enumcase",
        }
    }

    /// The generic `children` edge
    pub fn children(&self) -> Option<TreeRef<'_>> {
        match &self.kind {
            NodeKind::Program { children }
            | NodeKind::Namespace { children, .. }
            | NodeKind::Block { children }
            | NodeKind::Statement { children } => Some(TreeRef::List(children)),
            _ => None,
        }
    }

    /// The generic `body` edge
    pub fn body(&self) -> Option<TreeRef<'_>> {
        match &self.kind {
            NodeKind::Class { body, .. }
            | NodeKind::Interface { body, .. }
            | NodeKind::Trait { body, .. }
            | NodeKind::Enum { body, .. } => Some(TreeRef::List(body)),
            NodeKind::Function { body, .. } => Some(TreeRef::Node(body)),
            NodeKind::Method { body, .. } => body.as_deref().map(TreeRef::Node),
            _ => None,
        }
    }
}

/// An owned tree position: one node or an ordered list of nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Node(Box<SyntaxNode>),
    List(Vec<SyntaxNode>),
}

impl Tree {
    pub fn view(&self) -> TreeRef<'_> {
        match self {
            Tree::Node(node) => TreeRef::Node(node),
            Tree::List(nodes) => TreeRef::List(nodes),
        }
    }
}

impl From<SyntaxNode> for Tree {
    fn from(node: SyntaxNode) -> Self {
        Tree::Node(Box::new(node))
    }
}

/// A borrowed tree position
#[derive(Debug, Clone, Copy)]
pub enum TreeRef<'a> {
    Node(&'a SyntaxNode),
    List(&'a [SyntaxNode]),
}

impl<'a> From<&'a Tree> for TreeRef<'a> {
    fn from(tree: &'a Tree) -> Self {
        tree.view()
    }
}

impl<'a> From<&'a SyntaxNode> for TreeRef<'a> {
    fn from(node: &'a SyntaxNode) -> Self {
        TreeRef::Node(node)
    }
}

impl<'a> From<&'a [SyntaxNode]> for TreeRef<'a> {
    fn from(nodes: &'a [SyntaxNode]) -> Self {
        TreeRef::List(nodes)
    }
}

/// Turns source text into a syntax tree
///
/// A failure only concerns the one source; callers decide whether to go on.
pub trait GrammarEngine: Send + Sync {
    fn parse(&self, source: &str) -> Result<Tree, DiagramError>;

    /// Name of the modeled source language
    fn language(&self) -> &'static str;
}
