//! AST module for the Aoi language
//!
//! A closed set of four node kinds. Every node owns its children outright; the
//! tree handed back by the parser is never shared or aliased.

use serde::Serialize;

pub mod render;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Byte range into the parsed source.
///
/// AST nodes do not carry spans; spans only travel with builder events and
/// diagnostics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The three binary primitives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Op {
    Add,
    Sub,
    Mul,
}

impl Op {
    /// Maps an operator lexeme to its tag.
    ///
    /// ```rust
    /// use aoi::ast::Op;
    /// assert_eq!(Op::from_symbol("-"), Some(Op::Sub));
    /// assert_eq!(Op::from_symbol("/"), None);
    /// ```
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            _ => None,
        }
    }

    /// The lexeme as written in source.
    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
        }
    }

    /// The tag used by the canonical rendering.
    pub fn tag(&self) -> &'static str {
        match self {
            Op::Add => "PLUS",
            Op::Sub => "MINUS",
            Op::Mul => "TIMES",
        }
    }
}

/// One `(name value)` pair of a `let` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Expr,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The core AST node for Aoi expressions.
///
/// # Examples
///
/// ```rust
/// use aoi::ast::{Expr, Op};
/// let sum = Expr::prim(Op::Add, Expr::num(1), Expr::num(2));
/// assert_eq!(sum.to_string(), "EPrim(PLUS, ENumber(1), ENumber(2))");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Let {
        bindings: Vec<Binding>,
        body: Box<Expr>,
    },
    Prim {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Num {
        value: i64,
    },
    Id {
        name: String,
    },
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl Expr {
    pub fn num(value: i64) -> Self {
        Expr::Num { value }
    }

    pub fn id(name: impl Into<String>) -> Self {
        Expr::Id { name: name.into() }
    }

    pub fn prim(op: Op, left: Expr, right: Expr) -> Self {
        Expr::Prim {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn let_in(bindings: Vec<Binding>, body: Expr) -> Self {
        Expr::Let {
            bindings,
            body: Box::new(body),
        }
    }
}

// ============================================================================
// QUERIES
// ============================================================================

impl Expr {
    /// Returns the variant name (for diagnostics and traces).
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Let { .. } => "Let",
            Expr::Prim { .. } => "Prim",
            Expr::Num { .. } => "Num",
            Expr::Id { .. } => "Id",
        }
    }

    /// Direct children in source order: binding values first, then the body.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Let { bindings, body } => bindings
                .iter()
                .map(|b| &b.value)
                .chain(std::iter::once(body.as_ref()))
                .collect(),
            Expr::Prim { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::Num { .. } | Expr::Id { .. } => Vec::new(),
        }
    }

    /// Total number of nodes in the tree, this one included.
    ///
    /// ```rust
    /// use aoi::ast::{Expr, Op};
    /// let e = Expr::prim(Op::Mul, Expr::num(2), Expr::id("x"));
    /// assert_eq!(e.node_count(), 3);
    /// ```
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expr::node_count)
            .sum::<usize>()
    }

    /// Height of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expr::depth)
            .max()
            .unwrap_or(0)
    }
}
