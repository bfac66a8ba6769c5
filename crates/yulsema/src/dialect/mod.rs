//! Dialect capability
//!
//! A dialect fixes the builtin operation catalogue, the set of types, the
//! literal grammar and which operations are deprecated or unavailable for the
//! configured target version. The analyzer only talks to the [`Dialect`]
//! trait; [`EvmDialect`] is the reference implementation.

mod evm;

use crate::ast::{Literal, LiteralKind};
use crate::common::Ident;

pub use evm::{EvmDialect, EvmVersion};

/// How a builtin argument position must be filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralArgument {
    /// Any literal, its value is not type-checked
    Any,
    /// A string literal naming a known data or object path (`"A.x"`)
    ObjectName,
}

/// Signature of a builtin operation
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinFunction {
    pub name: Ident,
    pub parameters: Vec<Ident>,
    pub returns: Vec<Ident>,
    /// Per-parameter literal requirement; empty when no position needs one
    pub literal_arguments: Vec<Option<LiteralArgument>>,
}

impl BuiltinFunction {
    pub fn new(name: Ident, parameters: Vec<Ident>, returns: Vec<Ident>) -> Self {
        Self {
            name,
            parameters,
            returns,
            literal_arguments: Vec::new(),
        }
    }

    pub fn with_literal_arguments(mut self, literal_arguments: Vec<Option<LiteralArgument>>) -> Self {
        self.literal_arguments = literal_arguments;
        self
    }

    pub fn literal_argument(&self, index: usize) -> Option<LiteralArgument> {
        self.literal_arguments.get(index).copied().flatten()
    }
}

/// Availability of an operation for the configured target version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Available,
    /// Usable, but reported with a warning
    Deprecated(String),
    /// Not supported by the target version
    Unavailable(String),
}

/// Builtins, types and literal grammar of the analyzed IR
pub trait Dialect {
    /// The name of this dialect (e.g. "evm", "evm-typed")
    fn name(&self) -> &'static str;

    /// Type used when none is written and as the fallback after an error
    fn default_type(&self) -> Ident;

    /// Type conditions must evaluate to
    fn bool_type(&self) -> Ident;

    /// Type of an identifier naming a data or object path
    fn address_type(&self) -> Ident;

    fn is_valid_type(&self, ty: Ident) -> bool;

    /// Type of an unannotated literal of `kind`
    fn literal_type(&self, kind: LiteralKind) -> Ident;

    fn builtin(&self, name: Ident) -> Option<&BuiltinFunction>;

    /// Check `literal` against the literal grammar and against `ty`.
    ///
    /// `ty` is already known to be a valid type.
    fn validate_literal(&self, literal: &Literal, ty: Ident) -> Result<(), String>;

    fn operation_status(&self, name: Ident) -> OperationStatus {
        let _ = name;
        OperationStatus::Available
    }
}

/// Literal grammar shared by all dialects: numbers fit 256 bits, strings fit
/// 32 bytes, booleans are `true` or `false`.
pub fn check_literal_value(literal: &Literal) -> Result<(), String> {
    if literal.value().is_some() {
        return Ok(());
    }
    Err(match literal.kind {
        LiteralKind::Number if is_number_syntax(&literal.value) => {
            "Number literal too large (> 256 bits)".to_string()
        }
        LiteralKind::Number => format!("Invalid number literal \"{}\"", literal.value),
        LiteralKind::String => {
            format!("String literal too long ({} > 32)", literal.value.len())
        }
        LiteralKind::Boolean => format!("Invalid boolean literal \"{}\"", literal.value),
    })
}

fn is_number_syntax(text: &str) -> bool {
    match text.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => {
            !text.is_empty()
                && text.chars().all(|c| c.is_ascii_digit())
                && (text == "0" || !text.starts_with('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_argument_lookup() {
        let builtin = BuiltinFunction::new(Ident::new("datasize"), vec![Ident::new("u256")], vec![])
            .with_literal_arguments(vec![Some(LiteralArgument::ObjectName)]);
        assert_eq!(builtin.literal_argument(0), Some(LiteralArgument::ObjectName));
        assert_eq!(builtin.literal_argument(1), None);
    }

    #[test]
    fn test_check_literal_value() {
        assert!(check_literal_value(&Literal::number("0x10")).is_ok());
        assert_eq!(
            check_literal_value(&Literal::number(format!("0x1{}", "0".repeat(64)))),
            Err("Number literal too large (> 256 bits)".to_string())
        );
        assert_eq!(
            check_literal_value(&Literal::number("12z")),
            Err("Invalid number literal \"12z\"".to_string())
        );
        assert_eq!(
            check_literal_value(&Literal::number("007")),
            Err("Invalid number literal \"007\"".to_string())
        );
        assert_eq!(
            check_literal_value(&Literal::string("a".repeat(40))),
            Err("String literal too long (40 > 32)".to_string())
        );
        assert!(check_literal_value(&Literal::boolean(true)).is_ok());
    }
}
