//! Interned identifiers
//!
//! Every name in the IR (variables, functions, types, object names and
//! qualified object paths) is an [`Ident`]. Interning makes names `Copy` and
//! turns comparisons into integer comparisons.

use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use string_interner::{DefaultStringInterner, DefaultSymbol};

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned name
///
/// The empty identifier is a sentinel meaning "unnamed".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(DefaultSymbol);

impl Ident {
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn is_empty(self) -> bool {
        self.with_str(str::is_empty)
    }

    /// Run `f` on the interned text.
    ///
    /// The interner is locked while `f` runs, so `f` must not create idents.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }

    pub fn as_string(self) -> String {
        self.with_str(str::to_owned)
    }

    /// `self.inner`, the dotted path used to address nested objects
    pub fn qualify(self, inner: Ident) -> Ident {
        let path = format!("{self}.{inner}");
        Ident::new(&path)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "Ident({s:?})"))
    }
}
