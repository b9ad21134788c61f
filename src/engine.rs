//! Execution pipeline: source in, rendered trees out.
//!
//! The CLI and the integration tests both go through [`ExecutionPipeline`], so
//! everything a user can ask for on the command line is reachable as a plain
//! library call.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use clap::ValueEnum;

use crate::{
    ast::Expr,
    errors::{AoiError, SourceContext},
    syntax::{parse_entry, BuildEvent, Entry},
};

// ============================================================================
// OPTIONS AND OUTPUT
// ============================================================================

/// Output format for each parsed tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum Emit {
    /// Tag-prefixed canonical form, e.g. `EPrim(PLUS, ENumber(1), ENumber(2))`.
    #[default]
    Canonical,
    /// Back to input syntax, e.g. `(+ 1 2)`.
    Surface,
    /// The tree as JSON.
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub emit: Emit,
    /// Accept several top-level forms instead of exactly one.
    pub all: bool,
    pub trace: bool,
    pub stats: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub depth: usize,
}

impl TreeStats {
    pub fn of(expr: &Expr) -> Self {
        Self {
            nodes: expr.node_count(),
            depth: expr.depth(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunOutput {
    /// One rendered line per top-level form.
    pub rendered: Vec<String>,
    /// Builder events; empty unless tracing was requested.
    pub events: Vec<BuildEvent>,
    /// Per-form statistics; empty unless requested.
    pub stats: Vec<TreeStats>,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct ExecutionPipeline;

impl ExecutionPipeline {
    /// Reads a source file; `-` means standard input.
    pub fn read_file(path: &Path) -> Result<SourceContext, AoiError> {
        let name = path.display().to_string();
        let io_error = |source| AoiError::Io {
            path: name.clone(),
            source,
        };

        if path.as_os_str() == "-" {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(io_error)?;
            return Ok(SourceContext::from_file("<stdin>", content));
        }

        let content = fs::read_to_string(path).map_err(io_error)?;
        Ok(SourceContext::from_file(name.clone(), content))
    }

    /// Parses `source` and renders every resulting tree.
    pub fn execute(source: &SourceContext, options: &RunOptions) -> Result<RunOutput, AoiError> {
        let entry = if options.all {
            Entry::Program
        } else {
            Entry::Single
        };
        let traced = parse_entry(source, entry, options.trace)?;

        let rendered = traced
            .forms
            .iter()
            .map(|expr| Self::render(expr, options.emit))
            .collect::<Result<Vec<_>, _>>()?;

        let stats = if options.stats {
            traced.forms.iter().map(TreeStats::of).collect()
        } else {
            Vec::new()
        };

        Ok(RunOutput {
            rendered,
            events: traced.events,
            stats,
        })
    }

    pub fn render(expr: &Expr, emit: Emit) -> Result<String, AoiError> {
        Ok(match emit {
            Emit::Canonical => expr.to_string(),
            Emit::Surface => expr.to_source(),
            Emit::Json => serde_json::to_string(expr)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;

    #[test]
    fn test_execute_default_is_canonical_single() {
        let source = SourceContext::inline("(let ((x 5)) (+ x 1))");
        let output = ExecutionPipeline::execute(&source, &RunOptions::default()).unwrap();
        assert_eq!(
            output.rendered,
            vec![r#"ELet([("x", ENumber(5))], EPrim(PLUS, EId(x), ENumber(1)))"#.to_string()]
        );
        assert!(output.events.is_empty());
        assert!(output.stats.is_empty());
    }

    #[test]
    fn test_execute_all_with_stats() {
        let source = SourceContext::inline("1 (* 2 3)");
        let options = RunOptions {
            emit: Emit::Surface,
            all: true,
            stats: true,
            ..RunOptions::default()
        };
        let output = ExecutionPipeline::execute(&source, &options).unwrap();
        assert_eq!(output.rendered, vec!["1".to_string(), "(* 2 3)".to_string()]);
        assert_eq!(
            output.stats,
            vec![
                TreeStats { nodes: 1, depth: 1 },
                TreeStats { nodes: 3, depth: 2 },
            ]
        );
    }

    #[test]
    fn test_single_mode_rejects_two_forms() {
        let source = SourceContext::inline("1 2");
        let err = ExecutionPipeline::execute(&source, &RunOptions::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_render_json() {
        let json = ExecutionPipeline::render(&Expr::id("y"), Emit::Json).unwrap();
        assert_eq!(json, r#"{"kind":"Id","name":"y"}"#);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ExecutionPipeline::read_file(Path::new("definitely/not/here.aoi")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Io);
    }
}
