//! Source rendering of the program tree
//!
//! Produces re-parsable text; indentation is four spaces per level.

use std::fmt;

use super::{Block, Expr, ExprKind, Literal, LiteralKind, Stmt, StmtKind, TypedName};

/// Prefix every line of `text` with four spaces
pub(crate) fn indent(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("    {}", text.replace('\n', "\n    "))
}

/// Quote `text` as a string literal, escaping quotes and backslashes.
/// Bytes outside printable ASCII become `\xNN`, so multi-byte characters
/// are written one escape per byte.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for byte in text.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push('"');
    out
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LiteralKind::Number | LiteralKind::Boolean => f.write_str(&self.value)?,
            LiteralKind::String => f.write_str(&quote(&self.value))?,
        }
        if let Some(ty) = self.ty {
            write!(f, ":{ty}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Some(ty) => write!(f, "{}:{ty}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(literal) => write!(f, "{literal}"),
            ExprKind::Identifier(name) => write!(f, "{name}"),
            ExprKind::Call(call) => write!(f, "{}({})", call.name.name, join(&call.args)),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Expr(expr) => write!(f, "{expr}"),
            StmtKind::Assign { targets, value } => {
                let names: Vec<_> = targets.iter().map(|t| t.name).collect();
                write!(f, "{} := {value}", join(&names))
            }
            StmtKind::Let { variables, value } => {
                write!(f, "let {}", join(variables))?;
                if let Some(value) = value {
                    write!(f, " := {value}")?;
                }
                Ok(())
            }
            StmtKind::Function(function) => {
                write!(f, "function {}({})", function.name.name, join(&function.params))?;
                if !function.returns.is_empty() {
                    write!(f, " -> {}", join(&function.returns))?;
                }
                write!(f, "\n{}", function.body)
            }
            StmtKind::If { condition, body } => write!(f, "if {condition} {body}"),
            StmtKind::Switch { scrutinee, cases } => {
                write!(f, "switch {scrutinee}")?;
                for case in cases {
                    match &case.value {
                        Some(value) => write!(f, "\ncase {value} {}", case.body)?,
                        None => write!(f, "\ndefault {}", case.body)?,
                    }
                }
                Ok(())
            }
            StmtKind::For(for_loop) => write!(
                f,
                "for {} {} {}\n{}",
                for_loop.init, for_loop.condition, for_loop.post, for_loop.body
            ),
            StmtKind::Break => f.write_str("break"),
            StmtKind::Continue => f.write_str("continue"),
            StmtKind::Leave => f.write_str("leave"),
            StmtKind::Block(block) => write!(f, "{block}"),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{ }");
        }
        let body = self.statements.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
        write!(f, "{{\n{}\n}}", indent(&body))
    }
}
