//! Aoi Error Handling
//!
//! Every stage reports through `AoiError`, a `miette` diagnostic carrying the
//! named source and a labelled span. Errors are fail-fast: the first one ends
//! the parse and no partial tree is returned.

use std::sync::Arc;

use miette::{Diagnostic, NamedSource, NarratableReportHandler, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Named source text handed to the parser and attached to every diagnostic.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from file content.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a source context for text that did not come from a file
    /// (a command-line argument or a test string).
    pub fn inline(content: impl Into<String>) -> Self {
        Self::from_file("<input>", content)
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }

    pub fn syntax_error(
        &self,
        message: impl Into<String>,
        label: impl Into<String>,
        span: Span,
        help: Option<String>,
    ) -> AoiError {
        AoiError::Syntax {
            message: message.into(),
            label: label.into(),
            src: self.to_named_source(),
            span: to_source_span(span),
            help,
        }
    }

    pub fn literal_range(&self, literal: &str, span: Span) -> AoiError {
        AoiError::LiteralRange {
            literal: literal.to_string(),
            src: self.to_named_source(),
            span: to_source_span(span),
            help: Some(format!(
                "integer literals must lie between {} and {}",
                i64::MIN,
                i64::MAX
            )),
        }
    }

    pub fn duplicate_binding(&self, name: &str, span: Span, first: Span) -> AoiError {
        AoiError::DuplicateBinding {
            name: name.to_string(),
            src: self.to_named_source(),
            span: to_source_span(span),
            first: to_source_span(first),
            help: Some("each name may be bound only once per `let`".into()),
        }
    }

    pub fn nesting_limit(&self, limit: usize, span: Span) -> AoiError {
        AoiError::NestingLimit {
            limit,
            src: self.to_named_source(),
            span: to_source_span(span),
            help: Some("split the expression with `let` bindings to flatten it".into()),
        }
    }

    /// Creates an internal error. These indicate a builder bug, never bad input.
    pub fn internal(&self, message: impl Into<String>, span: Span) -> AoiError {
        AoiError::Internal {
            message: message.into(),
            src: self.to_named_source(),
            span: to_source_span(span),
            help: Some("This is an internal parser error. Please report this as a bug.".into()),
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum AoiError {
    #[error("Syntax error: {message}")]
    #[diagnostic(code(aoi::syntax))]
    Syntax {
        message: String,
        label: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("{label}")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("Literal out of range: '{literal}' does not fit in a signed 64-bit integer")]
    #[diagnostic(code(aoi::literal_range))]
    LiteralRange {
        literal: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("literal too large")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("Syntax error: duplicate binding of '{name}'")]
    #[diagnostic(code(aoi::duplicate_binding))]
    DuplicateBinding {
        name: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("bound again here")]
        span: SourceSpan,
        #[label("first bound here")]
        first: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("Nesting too deep: more than {limit} levels of parentheses")]
    #[diagnostic(code(aoi::nesting_limit))]
    NestingLimit {
        limit: usize,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("nesting limit exceeded here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("Internal error: {message}")]
    #[diagnostic(code(aoi::internal))]
    Internal {
        message: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("while building this")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("Could not read '{path}'")]
    #[diagnostic(code(aoi::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode the tree as JSON")]
    #[diagnostic(code(aoi::io))]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Coarse classification used by tests and exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    LiteralRange,
    NestingLimit,
    Internal,
    Io,
}

impl AoiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. } | Self::DuplicateBinding { .. } => ErrorCategory::Syntax,
            Self::LiteralRange { .. } => ErrorCategory::LiteralRange,
            Self::NestingLimit { .. } => ErrorCategory::NestingLimit,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Io { .. } | Self::Json { .. } => ErrorCategory::Io,
        }
    }

    /// The primary source span, if the error points into source text.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. }
            | Self::LiteralRange { span, .. }
            | Self::DuplicateBinding { span, .. }
            | Self::NestingLimit { span, .. }
            | Self::Internal { span, .. } => Some(from_source_span(*span)),
            Self::Io { .. } | Self::Json { .. } => None,
        }
    }

    /// The source text the error points into, if any.
    pub fn source_text(&self) -> Option<&str> {
        match self {
            Self::Syntax { src, .. }
            | Self::LiteralRange { src, .. }
            | Self::DuplicateBinding { src, .. }
            | Self::NestingLimit { src, .. }
            | Self::Internal { src, .. } => Some(src.inner().as_str()),
            Self::Io { .. } | Self::Json { .. } => None,
        }
    }

    /// True when some source line is too long for a graphical snippet.
    pub fn has_oversized_line(&self) -> bool {
        self.source_text()
            .is_some_and(|text| text.lines().any(|line| line.len() > MAX_SNIPPET_LINE))
    }
}

/// Converts an AST Span to a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

fn from_source_span(span: SourceSpan) -> Span {
    Span::new(span.offset(), span.offset() + span.len())
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Longest source line the graphical report handler is asked to draw.
pub const MAX_SNIPPET_LINE: usize = 1024;

/// Prints an AoiError with full miette diagnostics
///
/// Sources with an oversized line fall back to the plain narratable handler,
/// which does not lay the line out in columns.
pub fn print_error(error: AoiError) {
    if error.has_oversized_line() {
        eprintln!("{}", render_narrated(&error));
        return;
    }
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

fn render_narrated(error: &AoiError) -> String {
    let mut out = String::new();
    if NarratableReportHandler::new()
        .render_report(&mut out, error)
        .is_err()
    {
        out = format!("Error: {error}");
    }
    out
}
