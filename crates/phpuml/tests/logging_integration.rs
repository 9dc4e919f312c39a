//! Integration tests for tracing spans and events
//!
//! These tests verify that the pipeline runs with tracing enabled at every
//! level, including the per-source warnings of a partially failing batch.

use phpuml::core::logging::init_logging;
use phpuml::prelude::*;
use phpuml::{parse, render};
use tracing_subscriber::util::SubscriberInitExt;

#[test]
fn test_tracing_spans_created_during_pipeline() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let result = render(&["<?php class A extends B { public function f(int $x) {} }"]);
    assert_eq!(
        result.unwrap(),
        "[A||+f(x: int);]\n[A] -:> [B]\n"
    );
}

#[test]
fn test_failures_are_logged_not_raised() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::WARN)
        .set_default();

    let output = render(&["<?php class {", "<?php class Ok {}"]).unwrap();
    assert_eq!(output, "[Ok]\n");
}

#[test]
fn test_parse_with_tracing() {
    let _ = init_logging(Some("debug"), Some("compact"));

    let registry = parse(&["<?php interface I {} class C implements I {}"]).unwrap();
    assert_eq!(registry.node_count(), 2);
    assert_eq!(registry.edge_count(), 1);
}

#[test]
fn test_orchestrator_with_tracing() {
    let _ = init_logging(Some("debug"), Some("compact"));

    let orchestrator = Orchestrator::new();
    let report = orchestrator
        .run_with_report(&["<?php class A {}", "<?php class B {}"])
        .unwrap();
    assert_eq!(report.entity_count, 2);
    assert!(report.is_complete());
}
