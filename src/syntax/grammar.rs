//! The Aoi grammar, compiled from `grammar.pest` by `pest_derive`.
//!
//! The grammar has no semantic actions of its own. `pest` only materializes a
//! pair tree for a match that has fully succeeded, which is what lets the
//! tree builder replay rule events without ever seeing a backtracked branch.

use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct AoiGrammar;

/// Which top-level rule to match the input against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Entry {
    /// Exactly one expression, surrounded by optional whitespace.
    #[default]
    Single,
    /// Zero or more whitespace-separated expressions.
    Program,
}

impl Entry {
    pub fn rule(self) -> Rule {
        match self {
            Entry::Single => Rule::main,
            Entry::Program => Rule::program,
        }
    }
}

/// Separators and delimiters. They shape the match but never reach the builder.
pub fn is_layout(rule: Rule) -> bool {
    matches!(rule, Rule::ws | Rule::open | Rule::close)
}

/// Human-readable name of a rule, for diagnostics and traces.
pub fn describe_rule(rule: Rule) -> &'static str {
    match rule {
        Rule::number => "number",
        Rule::symbol => "symbol",
        Rule::binding_name => "binding name",
        Rule::binop => "operator (`+`, `-` or `*`)",
        Rule::binding => "binding `(name expr)`",
        Rule::bindings => "binding list",
        Rule::let_expr => "`let` form",
        Rule::rhs => "second operand",
        Rule::prim => "primitive form",
        Rule::main | Rule::program => "program",
        Rule::EOI => "end of input",
        Rule::ws => "whitespace",
        Rule::open => "`(`",
        Rule::close => "`)`",
        _ => "expression",
    }
}
