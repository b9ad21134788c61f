//! Textual renderings of the AST.
//!
//! `Display` gives the canonical, tag-prefixed form used for output and for
//! checking tree shape. `to_source` prints the tree back in input syntax.

use std::fmt;

use super::{Binding, Expr};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num { value } => write!(f, "ENumber({value})"),
            Expr::Id { name } => write!(f, "EId({name})"),
            Expr::Prim { op, left, right } => {
                write!(f, "EPrim({}, {left}, {right})", op.tag())
            }
            Expr::Let { bindings, body } => {
                f.write_str("ELet([")?;
                for (index, binding) in bindings.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "(\"{}\", {})", binding.name, binding.value)?;
                }
                write!(f, "], {body})")
            }
        }
    }
}

impl Expr {
    /// Renders the tree in the surface syntax it was parsed from.
    ///
    /// ```rust
    /// use aoi::ast::{Binding, Expr, Op};
    /// let e = Expr::let_in(
    ///     vec![Binding::new("x", Expr::num(5))],
    ///     Expr::prim(Op::Add, Expr::id("x"), Expr::num(1)),
    /// );
    /// assert_eq!(e.to_source(), "(let ((x 5)) (+ x 1))");
    /// ```
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        write_source(self, &mut out);
        out
    }
}

fn write_source(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Num { value } => out.push_str(&value.to_string()),
        Expr::Id { name } => out.push_str(name),
        Expr::Prim { op, left, right } => {
            out.push('(');
            out.push_str(op.symbol());
            out.push(' ');
            write_source(left, out);
            out.push(' ');
            write_source(right, out);
            out.push(')');
        }
        Expr::Let { bindings, body } => {
            out.push_str("(let (");
            write_bindings(bindings, out);
            out.push_str(") ");
            write_source(body, out);
            out.push(')');
        }
    }
}

fn write_bindings(bindings: &[Binding], out: &mut String) {
    for (index, binding) in bindings.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        out.push('(');
        out.push_str(&binding.name);
        out.push(' ');
        write_source(&binding.value, out);
        out.push(')');
    }
}
