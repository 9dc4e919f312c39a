//! Core database trait for extracted model storage
//!
//! A database stores the nodes of one batch run keyed by name. Edges are not
//! stored separately: each diagram type derives them from its nodes.

/// Core trait for model databases
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync;

    /// The edge data type derived from nodes
    type Edge: Clone + Send + Sync;

    /// Insert a node, replacing any node stored under the same key
    fn add_node(&mut self, node: Self::Node);

    /// Get a node by name
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes in insertion order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Edges implied by the stored nodes, in node order
    fn edges(&self) -> impl Iterator<Item = Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize {
        self.edges().count()
    }
}
