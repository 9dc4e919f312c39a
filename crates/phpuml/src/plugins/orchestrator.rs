//! Batch orchestrator for the extraction pipeline
//!
//! Runs every source of a batch through the pipeline:
//! Grammar engine → Entity extractor → Entity registry, then renders the
//! registry once.
//!
//! A source that fails to parse is logged and skipped; only an empty batch
//! is an error.

use tracing::{debug, info, span, warn, Level};

use crate::core::{DiagramError, GrammarEngine, Renderer};
use crate::plugins::class::{EntityExtractor, EntityRegistry, NomnomlRenderer};
use crate::plugins::php::PhpParser;

/// A source of the batch that could not be parsed
#[derive(Debug)]
pub struct SourceFailure {
    /// Position of the source in the batch
    pub index: usize,
    pub error: DiagramError,
}

/// Everything a batch run produced
#[derive(Debug)]
pub struct BatchReport {
    pub uml: String,
    pub entity_count: usize,
    pub failures: Vec<SourceFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Orchestrator that coordinates the entire pipeline
///
/// Generic over the grammar engine; PHP by default.
pub struct Orchestrator<E: GrammarEngine = PhpParser> {
    engine: E,
    extractor: EntityExtractor,
    renderer: NomnomlRenderer,
}

impl Orchestrator<PhpParser> {
    /// Create an orchestrator for PHP sources
    pub fn new() -> Self {
        Self::with_engine(PhpParser::new())
    }
}

impl<E: GrammarEngine> Orchestrator<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            extractor: EntityExtractor::new(),
            renderer: NomnomlRenderer::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Render a batch of sources to nomnoml text
    pub fn run<S: AsRef<str>>(&self, sources: &[S]) -> Result<String, DiagramError> {
        self.run_with_report(sources).map(|report| report.uml)
    }

    /// Render a batch, also reporting entity count and per-source failures
    pub fn run_with_report<S: AsRef<str>>(
        &self,
        sources: &[S],
    ) -> Result<BatchReport, DiagramError> {
        let batch_span = span!(
            Level::INFO,
            "process_batch",
            sources = sources.len(),
            language = self.engine.language()
        );
        let _enter = batch_span.enter();

        info!("Starting extraction pipeline");

        // Step 1: Parse and extract every source
        let (registry, failures) = self.extract(sources)?;

        // Step 2: Render once
        let render_span = span!(Level::DEBUG, "pipeline_render");
        let _render_enter = render_span.enter();
        let uml = self.renderer.render(&registry)?;
        debug!(output_len = uml.len(), "Rendering completed");
        drop(_render_enter);

        info!(
            entities = registry.len(),
            failed = failures.len(),
            "Pipeline completed"
        );

        Ok(BatchReport {
            uml,
            entity_count: registry.len(),
            failures,
        })
    }

    /// Parse and extract without rendering
    pub fn extract<S: AsRef<str>>(
        &self,
        sources: &[S],
    ) -> Result<(EntityRegistry, Vec<SourceFailure>), DiagramError> {
        if sources.is_empty() {
            warn!("Empty batch");
            return Err(DiagramError::InputEmpty);
        }

        let mut registry = EntityRegistry::new();
        let mut failures = Vec::new();

        for (index, source) in sources.iter().enumerate() {
            let source = source.as_ref();
            let source_span = span!(Level::DEBUG, "pipeline_source", index, len = source.len());
            let _source_enter = source_span.enter();

            match self.engine.parse(source) {
                Ok(tree) => {
                    let before = registry.len();
                    self.extractor.extract(&tree, &mut registry);
                    debug!(
                        new_entities = registry.len() - before,
                        total = registry.len(),
                        "Source extracted"
                    );
                }
                Err(error) => {
                    warn!(index, %error, "Failed to parse source, skipping");
                    failures.push(SourceFailure { index, error });
                }
            }
        }

        Ok((registry, failures))
    }
}

impl Default for Orchestrator<PhpParser> {
    fn default() -> Self {
        Self::new()
    }
}
