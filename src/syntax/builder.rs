//! Tree builder: turns grammar rule events into AST nodes.
//!
//! The builder never inspects the input on its own. It reacts to two kinds of
//! event, in the order the grammar matched them:
//!
//! - `enter(rule)` when a rule begins,
//! - `complete(rule)` once the rule has fully matched.
//!
//! Nodes are assembled bottom-up on an explicit [`Accumulator`]. A `prim`'s
//! two operands land on the same expression stack, so the completed second
//! operand (`rhs`) is parked in a one-slot holding cell until the enclosing
//! `prim` completes.

use std::fmt;

use crate::ast::{Binding, Expr, Op, Span};
use crate::errors::{AoiError, SourceContext};

use super::grammar::{describe_rule, Rule};

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// A binding name waiting for its value expression.
#[derive(Debug, Clone)]
struct PendingName {
    name: String,
    span: Span,
}

/// A binding list under construction, one per `let` currently open.
#[derive(Debug, Default)]
struct PendingList {
    bindings: Vec<Binding>,
    name_spans: Vec<Span>,
}

impl PendingList {
    fn first_span_of(&self, name: &str) -> Option<Span> {
        self.bindings
            .iter()
            .zip(&self.name_spans)
            .find(|(binding, _)| binding.name == name)
            .map(|(_, span)| *span)
    }
}

/// Per-parse working state. Lives for exactly one parse invocation.
#[derive(Debug, Default)]
pub struct Accumulator {
    exprs: Vec<Expr>,
    ops: Vec<Op>,
    names: Vec<PendingName>,
    binding_lists: Vec<PendingList>,
    rhs: Option<Expr>,
}

impl Accumulator {
    /// True when nothing but completed expressions remains.
    pub fn is_settled(&self) -> bool {
        self.ops.is_empty()
            && self.names.is_empty()
            && self.binding_lists.is_empty()
            && self.rhs.is_none()
    }
}

// ============================================================================
// BUILD EVENTS
// ============================================================================

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    Enter,
    Complete,
}

/// One replayed rule event, kept when tracing is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub kind: EventKind,
    pub rule: Rule,
    pub span: Span,
    pub text: String,
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            EventKind::Enter => "enter",
            EventKind::Complete => "match",
        };
        write!(
            f,
            "{verb} {} `{}` @ {}..{}",
            describe_rule(self.rule),
            self.text,
            self.span.start,
            self.span.end
        )
    }
}

// ============================================================================
// TREE BUILDER
// ============================================================================

pub struct TreeBuilder<'s> {
    source: &'s SourceContext,
    acc: Accumulator,
    events: Option<Vec<BuildEvent>>,
}

impl<'s> TreeBuilder<'s> {
    pub fn new(source: &'s SourceContext) -> Self {
        Self {
            source,
            acc: Accumulator::default(),
            events: None,
        }
    }

    /// A builder that also records every event it receives.
    pub fn traced(source: &'s SourceContext) -> Self {
        Self {
            events: Some(Vec::new()),
            ..Self::new(source)
        }
    }

    /// A rule has started matching.
    pub fn enter(&mut self, rule: Rule, span: Span, text: &str) -> Result<(), AoiError> {
        self.record(EventKind::Enter, rule, span, text);

        if rule == Rule::bindings {
            self.acc.binding_lists.push(PendingList::default());
        }
        Ok(())
    }

    /// A rule has fully matched.
    pub fn complete(&mut self, rule: Rule, span: Span, text: &str) -> Result<(), AoiError> {
        self.record(EventKind::Complete, rule, span, text);

        match rule {
            Rule::number => {
                let value = text
                    .parse::<i64>()
                    .map_err(|_| self.source.literal_range(text, span))?;
                self.acc.exprs.push(Expr::num(value));
            }

            Rule::symbol => self.acc.exprs.push(Expr::id(text)),

            Rule::binop => {
                let op = Op::from_symbol(text).ok_or_else(|| {
                    self.source
                        .internal(format!("unknown operator lexeme '{text}'"), span)
                })?;
                self.acc.ops.push(op);
            }

            Rule::rhs => {
                let right = self.pop_expr("second operand", span)?;
                if self.acc.rhs.replace(right).is_some() {
                    return Err(self
                        .source
                        .internal("holding cell already occupied", span));
                }
            }

            Rule::prim => {
                let left = self.pop_expr("first operand", span)?;
                let right = self.acc.rhs.take().ok_or_else(|| {
                    self.source.internal("holding cell is empty", span)
                })?;
                let op = self
                    .acc
                    .ops
                    .pop()
                    .ok_or_else(|| self.source.internal("operator stack underflow", span))?;
                self.acc.exprs.push(Expr::prim(op, left, right));
            }

            Rule::binding_name => self.acc.names.push(PendingName {
                name: text.to_string(),
                span,
            }),

            Rule::binding => {
                let value = self.pop_expr("binding value", span)?;
                let name = self
                    .acc
                    .names
                    .pop()
                    .ok_or_else(|| self.source.internal("name stack underflow", span))?;
                let list = self.acc.binding_lists.last_mut().ok_or_else(|| {
                    self.source.internal("no binding list is open", span)
                })?;
                if let Some(first) = list.first_span_of(&name.name) {
                    return Err(self.source.duplicate_binding(&name.name, name.span, first));
                }
                list.bindings.push(Binding::new(name.name, value));
                list.name_spans.push(name.span);
            }

            Rule::let_expr => {
                let body = self.pop_expr("`let` body", span)?;
                let list = self.acc.binding_lists.pop().ok_or_else(|| {
                    self.source.internal("binding list stack underflow", span)
                })?;
                self.acc.exprs.push(Expr::let_in(list.bindings, body));
            }

            // Structural rules carry no action.
            _ => {}
        }
        Ok(())
    }

    /// Checks the end-of-parse invariant and hands over every completed
    /// top-level expression in source order.
    pub fn finish(self, span: Span) -> Result<(Vec<Expr>, Vec<BuildEvent>), AoiError> {
        if !self.acc.is_settled() {
            return Err(self.source.internal(
                format!("builder finished with unconsumed state: {:?}", self.acc),
                span,
            ));
        }
        Ok((self.acc.exprs, self.events.unwrap_or_default()))
    }

    fn pop_expr(&mut self, role: &str, span: Span) -> Result<Expr, AoiError> {
        self.acc.exprs.pop().ok_or_else(|| {
            self.source
                .internal(format!("expression stack underflow taking {role}"), span)
        })
    }

    fn record(&mut self, kind: EventKind, rule: Rule, span: Span, text: &str) {
        if let Some(events) = self.events.as_mut() {
            events.push(BuildEvent {
                kind,
                rule,
                span,
                text: text.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;

    const NO_SPAN: Span = Span { start: 0, end: 0 };

    fn leaf(builder: &mut TreeBuilder<'_>, rule: Rule, text: &str) {
        builder.enter(rule, NO_SPAN, text).unwrap();
        builder.complete(rule, NO_SPAN, text).unwrap();
    }

    #[test]
    fn test_prim_takes_right_operand_from_holding_cell() {
        let source = SourceContext::inline("(- 7 x)");
        let mut b = TreeBuilder::new(&source);
        b.enter(Rule::prim, NO_SPAN, "").unwrap();
        leaf(&mut b, Rule::binop, "-");
        leaf(&mut b, Rule::number, "7");
        b.enter(Rule::rhs, NO_SPAN, "x").unwrap();
        leaf(&mut b, Rule::symbol, "x");
        b.complete(Rule::rhs, NO_SPAN, "x").unwrap();
        assert!(b.acc.rhs.is_some());
        assert_eq!(b.acc.exprs, vec![Expr::num(7)]);
        b.complete(Rule::prim, NO_SPAN, "(- 7 x)").unwrap();

        let (exprs, events) = b.finish(NO_SPAN).unwrap();
        assert_eq!(exprs, vec![Expr::prim(Op::Sub, Expr::num(7), Expr::id("x"))]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_let_collects_bindings_in_order() {
        let source = SourceContext::inline("(let ((a 1) (b 2)) a)");
        let mut b = TreeBuilder::new(&source);
        b.enter(Rule::let_expr, NO_SPAN, "").unwrap();
        b.enter(Rule::bindings, NO_SPAN, "").unwrap();
        for (name, value) in [("a", "1"), ("b", "2")] {
            b.enter(Rule::binding, NO_SPAN, "").unwrap();
            leaf(&mut b, Rule::binding_name, name);
            leaf(&mut b, Rule::number, value);
            b.complete(Rule::binding, NO_SPAN, "").unwrap();
        }
        b.complete(Rule::bindings, NO_SPAN, "").unwrap();
        leaf(&mut b, Rule::symbol, "a");
        b.complete(Rule::let_expr, NO_SPAN, "").unwrap();

        let (exprs, _) = b.finish(NO_SPAN).unwrap();
        assert_eq!(
            exprs,
            vec![Expr::let_in(
                vec![Binding::new("a", Expr::num(1)), Binding::new("b", Expr::num(2))],
                Expr::id("a"),
            )]
        );
    }

    #[test]
    fn test_overflowing_literal() {
        let source = SourceContext::inline("9223372036854775808");
        let mut b = TreeBuilder::new(&source);
        let err = b
            .complete(Rule::number, Span::new(0, 19), "9223372036854775808")
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::LiteralRange);
    }

    #[test]
    fn test_duplicate_name_in_one_list() {
        let source = SourceContext::inline("(let ((x 1) (x 2)) x)");
        let mut b = TreeBuilder::new(&source);
        b.enter(Rule::bindings, NO_SPAN, "").unwrap();
        for (span, value) in [(Span::new(7, 8), "1"), (Span::new(13, 14), "2")] {
            b.complete(Rule::binding_name, span, "x").unwrap();
            leaf(&mut b, Rule::number, value);
            let result = b.complete(Rule::binding, NO_SPAN, "");
            if value == "2" {
                let err = result.unwrap_err();
                assert!(matches!(err, AoiError::DuplicateBinding { ref name, .. } if name == "x"));
                assert_eq!(err.span(), Some(Span::new(13, 14)));
            } else {
                result.unwrap();
            }
        }
    }

    #[test]
    fn test_unbalanced_events_are_internal_errors() {
        let source = SourceContext::inline("");
        let mut b = TreeBuilder::new(&source);
        let err = b.complete(Rule::prim, NO_SPAN, "").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);

        let mut b = TreeBuilder::new(&source);
        leaf(&mut b, Rule::binop, "+");
        let err = b.finish(NO_SPAN).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_traced_builder_records_events() {
        let source = SourceContext::inline("42");
        let mut b = TreeBuilder::traced(&source);
        b.enter(Rule::number, Span::new(0, 2), "42").unwrap();
        b.complete(Rule::number, Span::new(0, 2), "42").unwrap();
        let (_, events) = b.finish(Span::new(0, 2)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, EventKind::Complete);
        assert_eq!(events[1].to_string(), "match number `42` @ 0..2");
    }
}
