use std::collections::HashMap;
use std::fmt;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BuiltinType {
    Integer,
    Real,
}

/// Declared shape of a name. Symbols never carry run-time values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Builtin(BuiltinType),
    Variable { name: String, ty: BuiltinType },
}

impl Symbol {
    pub fn name(&self) -> String {
        match self {
            Self::Builtin(ty) => ty.to_string(),
            Self::Variable { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(ty) => write!(f, "{ty}"),
            Self::Variable { name, ty } => write!(f, "<{name}:{ty}>"),
        }
    }
}

/// Insertion-ordered, case-sensitive name → symbol mapping, seeded with the
/// builtin types.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            index: HashMap::new(),
        };
        table.define(Symbol::Builtin(BuiltinType::Integer));
        table.define(Symbol::Builtin(BuiltinType::Real));
        table
    }

    /// Insert or overwrite. An overwritten name keeps its original position.
    /// Returns the symbol that was replaced, if any.
    pub fn define(&mut self, symbol: Symbol) -> Option<Symbol> {
        trace!(%symbol, "define");
        let name = symbol.name();
        match self.index.get(&name) {
            Some(&slot) => Some(std::mem::replace(&mut self.symbols[slot], symbol)),
            None => {
                self.index.insert(name, self.symbols.len());
                self.symbols.push(symbol);
                None
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        trace!(name, "lookup");
        self.index.get(name).map(|&slot| &self.symbols[slot])
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbols: [")?;
        for (i, symbol) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{symbol}")?;
        }
        write!(f, "]")
    }
}
