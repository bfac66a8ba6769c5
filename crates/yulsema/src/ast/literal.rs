//! Literal nodes and their 256-bit values

use crate::common::Ident;

/// Big-endian 256-bit word, the value domain of every literal
pub type U256 = [u8; 32];

/// Literal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
}

/// Literal with its source text and optional explicit type
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Number text as written (`42`, `0x2a`), string contents, or `true`/`false`
    pub value: String,
    /// Explicit type annotation (`42:u256`); `None` means the dialect default
    pub ty: Option<Ident>,
}

impl Literal {
    pub fn new(kind: LiteralKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            ty: None,
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self::new(LiteralKind::Number, value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(LiteralKind::String, value)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(LiteralKind::Boolean, if value { "true" } else { "false" })
    }

    pub fn with_type(mut self, ty: impl Into<Ident>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// The 256-bit value of the literal, `None` if it is malformed or does not fit.
    ///
    /// Strings are left-aligned in the word, booleans are 0 or 1.
    pub fn value(&self) -> Option<U256> {
        match self.kind {
            LiteralKind::Number => parse_number(&self.value),
            LiteralKind::String => {
                let bytes = self.value.as_bytes();
                if bytes.len() > 32 {
                    return None;
                }
                let mut word = [0u8; 32];
                word[..bytes.len()].copy_from_slice(bytes);
                Some(word)
            }
            LiteralKind::Boolean => match self.value.as_str() {
                "true" => Some(word_from_u8(1)),
                "false" => Some(word_from_u8(0)),
                _ => None,
            },
        }
    }
}

fn word_from_u8(value: u8) -> U256 {
    let mut word = [0u8; 32];
    word[31] = value;
    word
}

/// Parse a decimal (`0`, `[1-9][0-9]*`) or hex (`0x[0-9a-fA-F]+`) number.
///
/// Returns `None` for malformed text and for values above 2^256 - 1.
pub fn parse_number(text: &str) -> Option<U256> {
    let (digits, radix) = match text.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => {
            if text.len() > 1 && text.starts_with('0') {
                return None;
            }
            (text, 10)
        }
    };
    if digits.is_empty() {
        return None;
    }

    let mut word = [0u8; 32];
    for c in digits.chars() {
        let digit = c.to_digit(radix)?;
        let mut carry = digit;
        for byte in word.iter_mut().rev() {
            let next = u32::from(*byte) * radix + carry;
            *byte = (next & 0xff) as u8;
            carry = next >> 8;
        }
        if carry != 0 {
            return None;
        }
    }
    Some(word)
}
