//! Core error types for diagram extraction
//!
//! Only [`DiagramError::InputEmpty`] aborts a batch. Parse failures are
//! recovered per source by the orchestrator.

use thiserror::Error;

/// Core error types for the extraction pipeline
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("No files provided")]
    InputEmpty,

    #[error("Parse error: {message} at line {line}, column {column}")]
    SourceParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("IO error")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::SourceParse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a parse error positioned at a byte offset of `source`
    pub fn parse_error_at(message: impl Into<String>, source: &str, offset: usize) -> Self {
        let (line, column) = line_column(source, offset);
        Self::parse_error(message, line, column)
    }

    /// True for per-source failures that a batch recovers from
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SourceParse { .. })
    }
}

/// 1-based line and column for a byte offset, clamped to the source length
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error() {
        let error = DiagramError::parse_error("Invalid syntax", 5, 10);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Parse error"));
        assert!(error_msg.contains("Invalid syntax"));
        assert!(error_msg.contains("line 5"));
        assert!(error_msg.contains("column 10"));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_input_empty() {
        let error = DiagramError::InputEmpty;
        assert_eq!(error.to_string(), "No files provided");
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_parse_error_at_offset() {
        let source = "<?php\nclass A {\n  (";
        let error = DiagramError::parse_error_at("unclosed", source, source.len() - 1);
        match error {
            DiagramError::SourceParse { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, 3);
            }
            other => panic!("Expected SourceParse, got {:?}", other),
        }
    }

    #[test]
    fn test_line_column_clamps_past_end() {
        assert_eq!(line_column("ab", 10), (1, 3));
        assert_eq!(line_column("", 0), (1, 1));
        assert_eq!(line_column("é\nx", 1), (1, 1));
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: DiagramError = io_err.into();
        assert_eq!(error.to_string(), "IO error");

        let cause = std::error::Error::source(&error).map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("File not found"));
    }
}
