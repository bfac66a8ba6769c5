//! EVM flavoured reference dialect
//!
//! Untyped mode treats every value as `u256`. Typed mode adds `bool`, makes
//! comparisons return it and provides explicit conversion builtins.

use std::collections::HashMap;
use std::fmt;

use super::{check_literal_value, BuiltinFunction, Dialect, LiteralArgument, OperationStatus};
use crate::ast::{Literal, LiteralKind};
use crate::common::Ident;

/// Target VM version, in release order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EvmVersion {
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    London,
    Paris,
    Shanghai,
    #[default]
    Cancun,
}

impl EvmVersion {
    pub const ALL: [EvmVersion; 12] = [
        Self::Homestead,
        Self::TangerineWhistle,
        Self::SpuriousDragon,
        Self::Byzantium,
        Self::Constantinople,
        Self::Petersburg,
        Self::Istanbul,
        Self::Berlin,
        Self::London,
        Self::Paris,
        Self::Shanghai,
        Self::Cancun,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Homestead => "homestead",
            Self::TangerineWhistle => "tangerineWhistle",
            Self::SpuriousDragon => "spuriousDragon",
            Self::Byzantium => "byzantium",
            Self::Constantinople => "constantinople",
            Self::Petersburg => "petersburg",
            Self::Istanbul => "istanbul",
            Self::Berlin => "berlin",
            Self::London => "london",
            Self::Paris => "paris",
            Self::Shanghai => "shanghai",
            Self::Cancun => "cancun",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

impl fmt::Display for EvmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result shape of an opcode in typed mode
#[derive(Clone, Copy, PartialEq)]
enum Shape {
    /// All arguments and results are words
    Word,
    /// Word arguments, one boolean result
    Predicate,
}

// (name, arguments, results, available since)
const OPCODES: &[(&str, usize, usize, EvmVersion)] = &[
    ("stop", 0, 0, EvmVersion::Homestead),
    ("add", 2, 1, EvmVersion::Homestead),
    ("sub", 2, 1, EvmVersion::Homestead),
    ("mul", 2, 1, EvmVersion::Homestead),
    ("div", 2, 1, EvmVersion::Homestead),
    ("sdiv", 2, 1, EvmVersion::Homestead),
    ("mod", 2, 1, EvmVersion::Homestead),
    ("smod", 2, 1, EvmVersion::Homestead),
    ("exp", 2, 1, EvmVersion::Homestead),
    ("not", 1, 1, EvmVersion::Homestead),
    ("lt", 2, 1, EvmVersion::Homestead),
    ("gt", 2, 1, EvmVersion::Homestead),
    ("slt", 2, 1, EvmVersion::Homestead),
    ("sgt", 2, 1, EvmVersion::Homestead),
    ("eq", 2, 1, EvmVersion::Homestead),
    ("iszero", 1, 1, EvmVersion::Homestead),
    ("and", 2, 1, EvmVersion::Homestead),
    ("or", 2, 1, EvmVersion::Homestead),
    ("xor", 2, 1, EvmVersion::Homestead),
    ("byte", 2, 1, EvmVersion::Homestead),
    ("shl", 2, 1, EvmVersion::Constantinople),
    ("shr", 2, 1, EvmVersion::Constantinople),
    ("sar", 2, 1, EvmVersion::Constantinople),
    ("addmod", 3, 1, EvmVersion::Homestead),
    ("mulmod", 3, 1, EvmVersion::Homestead),
    ("signextend", 2, 1, EvmVersion::Homestead),
    ("keccak256", 2, 1, EvmVersion::Homestead),
    ("address", 0, 1, EvmVersion::Homestead),
    ("balance", 1, 1, EvmVersion::Homestead),
    ("selfbalance", 0, 1, EvmVersion::Istanbul),
    ("origin", 0, 1, EvmVersion::Homestead),
    ("caller", 0, 1, EvmVersion::Homestead),
    ("callvalue", 0, 1, EvmVersion::Homestead),
    ("calldataload", 1, 1, EvmVersion::Homestead),
    ("calldatasize", 0, 1, EvmVersion::Homestead),
    ("calldatacopy", 3, 0, EvmVersion::Homestead),
    ("codesize", 0, 1, EvmVersion::Homestead),
    ("codecopy", 3, 0, EvmVersion::Homestead),
    ("extcodesize", 1, 1, EvmVersion::Homestead),
    ("extcodecopy", 4, 0, EvmVersion::Homestead),
    ("returndatasize", 0, 1, EvmVersion::Byzantium),
    ("returndatacopy", 3, 0, EvmVersion::Byzantium),
    ("extcodehash", 1, 1, EvmVersion::Constantinople),
    ("gasprice", 0, 1, EvmVersion::Homestead),
    ("blockhash", 1, 1, EvmVersion::Homestead),
    ("coinbase", 0, 1, EvmVersion::Homestead),
    ("timestamp", 0, 1, EvmVersion::Homestead),
    ("number", 0, 1, EvmVersion::Homestead),
    ("difficulty", 0, 1, EvmVersion::Homestead),
    ("prevrandao", 0, 1, EvmVersion::Paris),
    ("gaslimit", 0, 1, EvmVersion::Homestead),
    ("chainid", 0, 1, EvmVersion::Istanbul),
    ("basefee", 0, 1, EvmVersion::London),
    ("blobhash", 1, 1, EvmVersion::Cancun),
    ("blobbasefee", 0, 1, EvmVersion::Cancun),
    ("pop", 1, 0, EvmVersion::Homestead),
    ("mload", 1, 1, EvmVersion::Homestead),
    ("mstore", 2, 0, EvmVersion::Homestead),
    ("mstore8", 2, 0, EvmVersion::Homestead),
    ("sload", 1, 1, EvmVersion::Homestead),
    ("sstore", 2, 0, EvmVersion::Homestead),
    ("tload", 1, 1, EvmVersion::Cancun),
    ("tstore", 2, 0, EvmVersion::Cancun),
    ("mcopy", 3, 0, EvmVersion::Cancun),
    ("msize", 0, 1, EvmVersion::Homestead),
    ("gas", 0, 1, EvmVersion::Homestead),
    ("log0", 2, 0, EvmVersion::Homestead),
    ("log1", 3, 0, EvmVersion::Homestead),
    ("log2", 4, 0, EvmVersion::Homestead),
    ("log3", 5, 0, EvmVersion::Homestead),
    ("log4", 6, 0, EvmVersion::Homestead),
    ("create", 3, 1, EvmVersion::Homestead),
    ("create2", 4, 1, EvmVersion::Constantinople),
    ("call", 7, 1, EvmVersion::Homestead),
    ("callcode", 7, 1, EvmVersion::Homestead),
    ("delegatecall", 6, 1, EvmVersion::Homestead),
    ("staticcall", 6, 1, EvmVersion::Byzantium),
    ("return", 2, 0, EvmVersion::Homestead),
    ("revert", 2, 0, EvmVersion::Byzantium),
    ("selfdestruct", 1, 0, EvmVersion::Homestead),
    ("invalid", 0, 0, EvmVersion::Homestead),
];

const PREDICATES: &[&str] = &["lt", "gt", "slt", "sgt", "eq", "iszero"];

// (name, deprecated from, replacement hint)
const DEPRECATIONS: &[(&str, EvmVersion, &str)] = &[
    ("callcode", EvmVersion::Homestead, "Use \"delegatecall\" instead."),
    ("selfdestruct", EvmVersion::Shanghai, "The underlying opcode will eventually change its behaviour."),
    ("difficulty", EvmVersion::Paris, "It was replaced by \"prevrandao\"."),
];

/// EVM dialect for one target version
#[derive(Debug, Clone)]
pub struct EvmDialect {
    version: EvmVersion,
    typed: bool,
    word: Ident,
    boolean: Ident,
    builtins: HashMap<Ident, BuiltinFunction>,
    available_since: HashMap<Ident, EvmVersion>,
}

impl EvmDialect {
    /// Untyped dialect: every value is a `u256`
    pub fn new(version: EvmVersion) -> Self {
        Self::build(version, false)
    }

    /// Typed dialect with `u256` and `bool`
    pub fn typed(version: EvmVersion) -> Self {
        Self::build(version, true)
    }

    fn build(version: EvmVersion, typed: bool) -> Self {
        let word = Ident::new("u256");
        let boolean = if typed { Ident::new("bool") } else { word };

        let mut dialect = Self {
            version,
            typed,
            word,
            boolean,
            builtins: HashMap::new(),
            available_since: HashMap::new(),
        };

        for &(name, arguments, results, since) in OPCODES {
            let shape = if PREDICATES.contains(&name) { Shape::Predicate } else { Shape::Word };
            let result = if shape == Shape::Predicate { boolean } else { word };
            let name = Ident::new(name);
            dialect.add(BuiltinFunction::new(name, vec![word; arguments], vec![result; results]));
            dialect.available_since.insert(name, since);
        }

        // Object access, resolved against the names of the enclosing object
        for name in ["datasize", "dataoffset"] {
            dialect.add(
                BuiltinFunction::new(Ident::new(name), vec![word], vec![word])
                    .with_literal_arguments(vec![Some(LiteralArgument::ObjectName)]),
            );
        }
        dialect.add(BuiltinFunction::new(Ident::new("datacopy"), vec![word; 3], vec![]));
        dialect.add(
            BuiltinFunction::new(Ident::new("linkersymbol"), vec![word], vec![word])
                .with_literal_arguments(vec![Some(LiteralArgument::Any)]),
        );

        if typed {
            dialect.add(BuiltinFunction::new(Ident::new("bool_to_u256"), vec![boolean], vec![word]));
            dialect.add(BuiltinFunction::new(Ident::new("u256_to_bool"), vec![word], vec![boolean]));
        }

        dialect
    }

    fn add(&mut self, builtin: BuiltinFunction) {
        self.builtins.insert(builtin.name, builtin);
    }

    pub fn version(&self) -> EvmVersion {
        self.version
    }

    pub fn is_typed(&self) -> bool {
        self.typed
    }
}

impl Dialect for EvmDialect {
    fn name(&self) -> &'static str {
        if self.typed { "evm-typed" } else { "evm" }
    }

    fn default_type(&self) -> Ident {
        self.word
    }

    fn bool_type(&self) -> Ident {
        self.boolean
    }

    fn address_type(&self) -> Ident {
        self.word
    }

    fn is_valid_type(&self, ty: Ident) -> bool {
        ty == self.word || ty == self.boolean
    }

    fn literal_type(&self, kind: LiteralKind) -> Ident {
        match kind {
            LiteralKind::Boolean => self.boolean,
            LiteralKind::Number | LiteralKind::String => self.word,
        }
    }

    fn builtin(&self, name: Ident) -> Option<&BuiltinFunction> {
        self.builtins.get(&name)
    }

    fn validate_literal(&self, literal: &Literal, ty: Ident) -> Result<(), String> {
        check_literal_value(literal)?;
        if !self.typed {
            return Ok(());
        }
        let expected = self.literal_type(literal.kind);
        if ty != expected {
            return Err(format!("Invalid type \"{ty}\" for literal \"{}\".", literal.value));
        }
        Ok(())
    }

    fn operation_status(&self, name: Ident) -> OperationStatus {
        if let Some(&since) = self.available_since.get(&name) {
            if self.version < since {
                return OperationStatus::Unavailable(format!(
                    "The \"{name}\" instruction is only available for {}-compatible VMs (you are currently compiling for \"{}\").",
                    capitalize(since.name()),
                    self.version
                ));
            }
        }

        let deprecation = name.with_str(|text| {
            DEPRECATIONS
                .iter()
                .find(|(op, from, _)| *op == text && self.version >= *from)
                .map(|(_, _, hint)| *hint)
        });
        match deprecation {
            Some(hint) => OperationStatus::Deprecated(format!("\"{name}\" has been deprecated. {hint}")),
            None => OperationStatus::Available,
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_order_and_names() {
        assert!(EvmVersion::Byzantium < EvmVersion::Istanbul);
        assert_eq!(EvmVersion::from_name("london"), Some(EvmVersion::London));
        assert_eq!(EvmVersion::from_name("frontier"), None);
        assert_eq!(EvmVersion::default().to_string(), "cancun");
    }

    #[test]
    fn test_untyped_builtins() {
        let dialect = EvmDialect::new(EvmVersion::Cancun);
        let add = dialect.builtin(Ident::new("add")).unwrap();
        assert_eq!(add.parameters.len(), 2);
        assert_eq!(add.returns, vec![Ident::new("u256")]);
        assert_eq!(dialect.bool_type(), dialect.default_type());
        assert!(dialect.builtin(Ident::new("bool_to_u256")).is_none());
    }

    #[test]
    fn test_typed_predicates_return_bool() {
        let dialect = EvmDialect::typed(EvmVersion::Cancun);
        let lt = dialect.builtin(Ident::new("lt")).unwrap();
        assert_eq!(lt.returns, vec![Ident::new("bool")]);
        assert!(dialect.is_valid_type(Ident::new("bool")));
        assert!(!dialect.is_valid_type(Ident::new("u8")));
    }

    #[test]
    fn test_operation_status() {
        let old = EvmDialect::new(EvmVersion::Homestead);
        assert!(matches!(
            old.operation_status(Ident::new("returndatasize")),
            OperationStatus::Unavailable(msg) if msg.contains("Byzantium-compatible")
        ));
        assert_eq!(old.operation_status(Ident::new("add")), OperationStatus::Available);
        assert!(matches!(
            old.operation_status(Ident::new("callcode")),
            OperationStatus::Deprecated(_)
        ));
        assert_eq!(old.operation_status(Ident::new("selfdestruct")), OperationStatus::Available);

        let new = EvmDialect::new(EvmVersion::Cancun);
        assert!(matches!(
            new.operation_status(Ident::new("selfdestruct")),
            OperationStatus::Deprecated(_)
        ));
        assert_eq!(new.operation_status(Ident::new("tstore")), OperationStatus::Available);
    }

    #[test]
    fn test_typed_literals() {
        let dialect = EvmDialect::typed(EvmVersion::Cancun);
        let u256 = Ident::new("u256");
        let boolean = Ident::new("bool");
        assert!(dialect.validate_literal(&Literal::number("1"), u256).is_ok());
        assert!(dialect.validate_literal(&Literal::boolean(true), boolean).is_ok());
        assert!(dialect.validate_literal(&Literal::number("1"), boolean).is_err());

        let untyped = EvmDialect::new(EvmVersion::Cancun);
        assert!(untyped.validate_literal(&Literal::boolean(true), u256).is_ok());
    }
}
