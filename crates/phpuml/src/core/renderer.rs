//! Core renderer trait for diagram output

use super::database::Database;
use super::error::DiagramError;

/// Turns a populated database into diagram output
pub trait Renderer<D: Database> {
    /// The output type produced by this renderer
    type Output;

    fn render(&self, database: &D) -> Result<Self::Output, DiagramError>;

    /// Renderer name
    fn name(&self) -> &'static str;

    /// Renderer version
    fn version(&self) -> &'static str;

    /// Output format, e.g. "nomnoml"
    fn format(&self) -> &'static str;
}
