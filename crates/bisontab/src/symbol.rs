//! Terminal and nonterminal symbol tables.

use crate::types::Set;
use std::fmt;

/// The pseudo-token bison reserves for error recovery.
///
/// It has no slot in the generated tables.
pub const ERROR_TOKEN: &str = "error";

/// The token bison appends to every input.
pub const END_TOKEN: &str = "$end";

/// The token name bison uses for a state's fallback action.
pub const DEFAULT_TOKEN: &str = "$default";

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}
impl TerminalID {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}
impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T#{:03}", self.raw)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}
impl NonterminalID {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}
impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N#{:03}", self.raw)
    }
}

/// Dense, order-stable indices for the symbols listed in a report.
///
/// Indices are assigned in first-seen order, starting from zero, so the
/// position of a name in the report listing is its table column.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    terminals: Set<String>,
    nonterminals: Set<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a terminal symbol, returning its index.
    ///
    /// Declaring a name twice yields the index of the first declaration.
    pub fn declare_terminal(&mut self, name: &str) -> TerminalID {
        declare(&mut self.terminals, name, TerminalID::new)
    }

    /// Register a nonterminal symbol, returning its index.
    pub fn declare_nonterminal(&mut self, name: &str) -> NonterminalID {
        declare(&mut self.nonterminals, name, NonterminalID::new)
    }

    pub fn terminal(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .get_index_of(name)
            .map(|i| TerminalID::new(i as u16))
    }

    pub fn nonterminal(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .get_index_of(name)
            .map(|i| NonterminalID::new(i as u16))
    }

    pub fn terminal_name(&self, id: TerminalID) -> &str {
        &self.terminals[id.index()]
    }

    pub fn nonterminal_name(&self, id: NonterminalID) -> &str {
        &self.nonterminals[id.index()]
    }

    pub fn num_terminals(&self) -> usize {
        self.terminals.len()
    }

    pub fn num_nonterminals(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn terminals(&self) -> impl Iterator<Item = (TerminalID, &str)> + '_ {
        self.terminals
            .iter()
            .enumerate()
            .map(|(i, name)| (TerminalID::new(i as u16), name.as_str()))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalID, &str)> + '_ {
        self.nonterminals
            .iter()
            .enumerate()
            .map(|(i, name)| (NonterminalID::new(i as u16), name.as_str()))
    }
}

fn declare<T>(set: &mut Set<String>, name: &str, id: impl FnOnce(u16) -> T) -> T {
    let index = match set.get_index_of(name) {
        Some(index) => index,
        None => set.insert_full(name.to_owned()).0,
    };
    id(index as u16)
}
