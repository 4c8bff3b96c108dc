//! Symbolic handles crossing the interpreter boundary.

use std::fmt;

use crate::ids::{ObjectRef, SymbolId};

/// A concrete interpreter value united with its optional symbolic shadow.
///
/// A handle without a symbol is purely concrete. That is the common case and
/// not an error: bridge operations whose operands carry no symbol are simply
/// not traced. A handle without a concrete object is a freshly produced
/// symbolic result that the interpreter has not bound yet.
///
/// Handles never escape to the interpreter except as identity tokens.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SymbolicHandle {
    concrete: Option<ObjectRef>,
    symbol: Option<SymbolId>,
}

impl SymbolicHandle {
    /// A purely concrete value with no symbolic shadow.
    #[must_use]
    pub const fn concrete(obj: ObjectRef) -> Self {
        SymbolicHandle {
            concrete: Some(obj),
            symbol: None,
        }
    }

    /// A concrete value shadowed by `symbol`.
    #[must_use]
    pub const fn symbolic(obj: ObjectRef, symbol: SymbolId) -> Self {
        SymbolicHandle {
            concrete: Some(obj),
            symbol: Some(symbol),
        }
    }

    /// A symbolic result not yet bound to a concrete object.
    #[must_use]
    pub const fn unbound(symbol: SymbolId) -> Self {
        SymbolicHandle {
            concrete: None,
            symbol: Some(symbol),
        }
    }

    /// Binds the handle to the concrete object the interpreter produced.
    #[must_use]
    pub const fn bind(self, obj: ObjectRef) -> Self {
        SymbolicHandle {
            concrete: Some(obj),
            symbol: self.symbol,
        }
    }

    /// The concrete object, if bound.
    #[must_use]
    pub const fn object(&self) -> Option<ObjectRef> {
        self.concrete
    }

    /// The symbolic shadow, if any.
    #[must_use]
    pub const fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    /// Returns `true` if the handle carries a symbol.
    #[must_use]
    pub const fn is_symbolic(&self) -> bool {
        self.symbol.is_some()
    }
}

impl fmt::Debug for SymbolicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for SymbolicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.symbol, self.concrete) {
            (Some(symbol), Some(obj)) => write!(f, "{symbol}:{obj}"),
            (Some(symbol), None) => write!(f, "{symbol}:unbound"),
            (None, Some(obj)) => write!(f, "{obj}"),
            (None, None) => write!(f, "<none>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_states() {
        let obj = ObjectRef(0x10);
        let concrete = SymbolicHandle::concrete(obj);
        assert!(!concrete.is_symbolic());
        assert_eq!(concrete.object(), Some(obj));

        let result = SymbolicHandle::unbound(SymbolId(3));
        assert!(result.is_symbolic());
        assert_eq!(result.object(), None);

        let bound = result.bind(obj);
        assert_eq!(bound, SymbolicHandle::symbolic(obj, SymbolId(3)));
        assert_eq!(bound.to_string(), "sym3:obj@0x10");
    }
}
