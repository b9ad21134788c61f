//! Aoi Parser
//!
//! Matches source text against the grammar and replays the resulting pair
//! tree through the [`TreeBuilder`]. This parser is purely syntactic.

use pest::{
    error::{Error, ErrorVariant, InputLocation},
    iterators::Pair,
    Parser,
};

use crate::ast::{Expr, Span};
use crate::errors::{AoiError, SourceContext};

use super::builder::{BuildEvent, TreeBuilder};
use super::grammar::{describe_rule, is_layout, AoiGrammar, Entry, Rule};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Deepest parenthesis nesting a source may reach. Matching, replay,
/// rendering and drop all recurse once per level.
pub const MAX_NESTING: usize = 128;

/// Parse exactly one Aoi expression.
pub fn parse(source_text: &str) -> Result<Expr, AoiError> {
    parse_source(&SourceContext::inline(source_text))
}

/// Parse exactly one expression from a named source.
pub fn parse_source(source: &SourceContext) -> Result<Expr, AoiError> {
    let (forms, _) = build(source, Entry::Single, false)?;
    single(forms, source)
}

/// Parse any number of whitespace-separated top-level expressions.
pub fn parse_program(source_text: &str) -> Result<Vec<Expr>, AoiError> {
    let (forms, _) = build(&SourceContext::inline(source_text), Entry::Program, false)?;
    Ok(forms)
}

/// Result of a traced parse.
#[derive(Debug)]
pub struct Traced {
    pub forms: Vec<Expr>,
    pub events: Vec<BuildEvent>,
}

/// Parse and keep the full builder event trace.
pub fn parse_traced(source: &SourceContext, entry: Entry) -> Result<Traced, AoiError> {
    parse_entry(source, entry, true)
}

/// Parse from the given entry rule; `events` stays empty unless `trace` is set.
pub fn parse_entry(source: &SourceContext, entry: Entry, trace: bool) -> Result<Traced, AoiError> {
    let (forms, events) = build(source, entry, trace)?;
    let forms = match entry {
        Entry::Single => vec![single(forms, source)?],
        Entry::Program => forms,
    };
    Ok(Traced { forms, events })
}

// ============================================================================
// DRIVER
// ============================================================================

fn build(
    source: &SourceContext,
    entry: Entry,
    trace: bool,
) -> Result<(Vec<Expr>, Vec<BuildEvent>), AoiError> {
    let text = source.content.as_str();
    check_nesting(source)?;
    let mut pairs = AoiGrammar::parse(entry.rule(), text)
        .map_err(|e| convert_parse_error(e, source))?;

    let mut builder = if trace {
        TreeBuilder::traced(source)
    } else {
        TreeBuilder::new(source)
    };

    let whole = Span::new(0, text.len());
    let top = pairs
        .next()
        .ok_or_else(|| source.internal("grammar produced no top-level pair", whole))?;
    replay(top, &mut builder)?;

    builder.finish(whole)
}

/// Rejects sources whose parentheses open deeper than [`MAX_NESTING`] before
/// the grammar ever sees them. Unbalanced closers are left to the grammar.
fn check_nesting(source: &SourceContext) -> Result<(), AoiError> {
    let mut depth = 0usize;
    for (pos, byte) in source.content.bytes().enumerate() {
        match byte {
            b'(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(source.nesting_limit(MAX_NESTING, Span::new(pos, pos + 1)));
                }
            }
            b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Feeds a successfully matched pair tree to the builder, depth first:
/// `enter` before the children, `complete` after them.
fn replay(pair: Pair<'_, Rule>, builder: &mut TreeBuilder<'_>) -> Result<(), AoiError> {
    let rule = pair.as_rule();
    if is_layout(rule) {
        return Ok(());
    }
    let span = get_span(&pair);
    let text = pair.as_str();

    builder.enter(rule, span, text)?;
    for child in pair.clone().into_inner() {
        replay(child, builder)?;
    }
    builder.complete(rule, span, text)
}

fn single(forms: Vec<Expr>, source: &SourceContext) -> Result<Expr, AoiError> {
    let count = forms.len();
    let mut forms = forms.into_iter();
    match (forms.next(), count) {
        (Some(expr), 1) => Ok(expr),
        _ => Err(source.internal(
            format!("expected exactly one expression, builder produced {count}"),
            Span::new(0, source.content.len()),
        )),
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<'_, Rule>) -> Span {
    Span::new(pair.as_span().start(), pair.as_span().end())
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, source: &SourceContext) -> AoiError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };

    let found = describe_found(&source.content, span.start);
    let (message, help) = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let expected = join_expected(positives);
            (
                format!("expected {expected}, found {found}"),
                help_for(positives),
            )
        }
        ErrorVariant::ParsingError { .. } => (format!("unexpected {found}"), None),
        // The grammar defines no custom errors; pest only raises one when its
        // own call or stack limit trips.
        ErrorVariant::CustomError { .. } => {
            return source.nesting_limit(MAX_NESTING, span);
        }
    };

    source.syntax_error(message, "here", span, help)
}

fn describe_found(text: &str, pos: usize) -> String {
    match text.get(pos..).and_then(|rest| rest.chars().next()) {
        Some(c) if c.is_whitespace() => "whitespace".to_string(),
        Some(c) => format!("'{c}'"),
        None => "end of input".to_string(),
    }
}

fn join_expected(rules: &[Rule]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for rule in rules {
        let name = describe_rule(*rule);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    match names.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    }
}

fn help_for(positives: &[Rule]) -> Option<String> {
    if positives.contains(&Rule::EOI) {
        Some("only whitespace may follow the expression".into())
    } else if positives.contains(&Rule::ws) {
        Some("tokens inside a form must be separated by whitespace".into())
    } else if positives.contains(&Rule::binop) {
        Some("a primitive form is `(op a b)` with op one of `+`, `-`, `*`".into())
    } else if positives.contains(&Rule::binding) {
        Some("a `let` needs at least one binding: `(let ((x 1)) x)`".into())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Op;
    use crate::errors::ErrorCategory;

    #[test]
    fn test_simple_number() {
        assert_eq!(parse("42").unwrap(), Expr::num(42));
    }

    #[test]
    fn test_nested_prim_keeps_operand_order() {
        let expected = Expr::prim(
            Op::Sub,
            Expr::num(10),
            Expr::prim(Op::Sub, Expr::num(4), Expr::num(1)),
        );
        assert_eq!(parse("(- 10 (- 4 1))").unwrap(), expected);
    }

    #[test]
    fn test_unmatched_paren() {
        let err = parse("(+ 1 2").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert_eq!(err.span().map(|s| s.start), Some(6));
    }

    #[test]
    fn test_program_forms_in_order() {
        let forms = parse_program(" 1\nx\t(* 2 3) ").unwrap();
        assert_eq!(
            forms,
            vec![
                Expr::num(1),
                Expr::id("x"),
                Expr::prim(Op::Mul, Expr::num(2), Expr::num(3)),
            ]
        );
        assert!(parse_program("").unwrap().is_empty());
    }

    #[test]
    fn test_trace_brackets_each_rule() {
        let source = SourceContext::inline("(+ 1 2)");
        let traced = parse_traced(&source, Entry::Single).unwrap();
        assert_eq!(traced.forms.len(), 1);
        let first = traced.events.first().unwrap();
        let last = traced.events.last().unwrap();
        assert_eq!(first.rule, Rule::main);
        assert_eq!(last.rule, Rule::main);
        assert!(traced.events.iter().any(|e| e.rule == Rule::rhs));
    }

    #[test]
    fn test_missing_operand_points_at_close_paren() {
        let err = parse("(+ 1)").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert_eq!(err.span().map(|s| s.start), Some(4));
    }

    #[test]
    fn test_layout_rules_are_not_replayed() {
        let source = SourceContext::inline("( let ( (x 1) ) x )");
        let traced = parse_traced(&source, Entry::Single).unwrap();
        assert!(traced.events.iter().all(|e| !is_layout(e.rule)));
    }

    fn nested_sum(levels: usize) -> String {
        format!("{}1{}", "(+ 1 ".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn test_nesting_at_limit_parses() {
        let expr = parse(&nested_sum(MAX_NESTING)).unwrap();
        assert_eq!(expr.depth(), MAX_NESTING + 1);
    }

    #[test]
    fn test_nesting_past_limit_is_rejected() {
        let text = nested_sum(MAX_NESTING + 1);
        let err = parse(&text).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NestingLimit);
        let offset = MAX_NESTING * "(+ 1 ".len();
        assert_eq!(err.span(), Some(Span::new(offset, offset + 1)));
    }

    #[test]
    fn test_stray_closers_do_not_hide_depth() {
        let text = format!("){}", nested_sum(MAX_NESTING + 1));
        let err = parse_program(&text).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NestingLimit);
    }

    #[test]
    fn test_pest_custom_error_is_nesting_limit() {
        let source = SourceContext::inline("(+ 1 2)");
        let error = Error::new_from_pos(
            ErrorVariant::<Rule>::CustomError {
                message: "call limit reached".into(),
            },
            pest::Position::from_start("(+ 1 2)"),
        );
        let err = convert_parse_error(error, &source);
        assert_eq!(err.category(), ErrorCategory::NestingLimit);
        assert_eq!(err.span(), Some(Span::new(0, 0)));
    }

    #[test]
    fn test_join_expected() {
        assert_eq!(join_expected(&[Rule::number]), "number");
        assert_eq!(
            join_expected(&[Rule::number, Rule::symbol, Rule::number]),
            "number or symbol"
        );
        assert_eq!(
            join_expected(&[Rule::number, Rule::symbol, Rule::prim]),
            "number, symbol, or primitive form"
        );
    }
}
