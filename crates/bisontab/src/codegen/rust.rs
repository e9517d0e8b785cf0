//! Rust module layout, for consumers that drive the tables from Rust.

use super::{symbol_ident, Codegen};
use crate::util::write_wrapped;
use std::fmt;

const WRAP: usize = 80;

pub(super) fn render(g: &Codegen<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let symbols = &g.automaton.symbols;

    writeln!(f, "// This file was generated by bisontab. Do not edit.")?;
    writeln!(f)?;

    write_enum(f, "Terminal", &g.terminal_idents)?;
    writeln!(
        f,
        "pub const NUM_TERMINALS: usize = {};",
        g.terminal_idents.len()
    )?;
    writeln!(f)?;
    write_enum(f, "Nonterminal", &g.nonterminal_idents)?;
    writeln!(
        f,
        "pub const NUM_NONTERMINALS: usize = {};",
        g.nonterminal_idents.len()
    )?;
    writeln!(f)?;

    writeln!(f, "pub static TERMINAL_NAMES: [&str; NUM_TERMINALS] = [")?;
    f.write_str("    ")?;
    write_wrapped(
        f,
        "    ",
        WRAP,
        symbols.terminals().map(|(_, name)| format!("{:?}", name)),
    )?;
    writeln!(f)?;
    writeln!(f, "];")?;
    writeln!(f, "pub static NONTERMINAL_NAMES: [&str; NUM_NONTERMINALS] = [")?;
    f.write_str("    ")?;
    write_wrapped(
        f,
        "    ",
        WRAP,
        symbols.nonterminals().map(|(_, name)| format!("{:?}", name)),
    )?;
    writeln!(f)?;
    writeln!(f, "];")?;
    writeln!(f)?;

    writeln!(f, "/// Action and goto cells of a single state.")?;
    writeln!(f, "///")?;
    writeln!(
        f,
        "/// An action is `+K` to shift to state `K`, `-R` to reduce by rule `R`,"
    )?;
    writeln!(f, "/// `127` to accept and `0` to reject the lookahead.")?;
    writeln!(f, "#[derive(Debug)]")?;
    writeln!(f, "pub struct BisonState {{")?;
    writeln!(f, "    pub actions: [i8; NUM_TERMINALS],")?;
    writeln!(f, "    pub gotos: [i8; NUM_NONTERMINALS],")?;
    writeln!(f, "}}")?;
    writeln!(f)?;
    writeln!(
        f,
        "pub static STATES: [BisonState; {}] = [",
        g.packed.rows.len()
    )?;
    for (i, row) in g.packed.rows.iter().enumerate() {
        if i % 5 == 0 {
            writeln!(f, "    // state {}", i)?;
        }
        writeln!(
            f,
            "    BisonState {{ actions: {:?}, gotos: {:?} }},",
            row.actions, row.gotos
        )?;
    }
    writeln!(f, "];")?;
    writeln!(f)?;

    writeln!(f, "/// Arity and produced nonterminal of a rule.")?;
    writeln!(f, "///")?;
    writeln!(
        f,
        "/// `GRAMMAR` and `RULE_PATTERNS` hold one entry per rule in ascending rule"
    )?;
    writeln!(
        f,
        "/// number; a reduce cell `-R` selects entry `R` when the numbers have no gaps."
    )?;
    writeln!(f, "#[derive(Debug)]")?;
    writeln!(f, "pub struct BisonReduce {{")?;
    writeln!(f, "    pub n_reduce: u8,")?;
    writeln!(f, "    pub produced_nonterminal: Nonterminal,")?;
    writeln!(f, "}}")?;
    writeln!(f)?;
    writeln!(
        f,
        "pub static GRAMMAR: [BisonReduce; {}] = [",
        g.automaton.rules.len()
    )?;
    for rule in g.automaton.rules.iter() {
        writeln!(f, "    // {}", rule.display())?;
        writeln!(
            f,
            "    BisonReduce {{ n_reduce: {}, produced_nonterminal: Nonterminal::{} }},",
            rule.arity(),
            super::nonterminal_ident(rule.left()),
        )?;
    }
    writeln!(f, "];")?;
    writeln!(f)?;

    writeln!(
        f,
        "pub static RULE_PATTERNS: [&str; {}] = [",
        g.patterns.len()
    )?;
    for pattern in &g.patterns {
        writeln!(f, "    {:?},", pattern.display(symbol_ident).to_string())?;
    }
    writeln!(f, "];")?;

    Ok(())
}

fn write_enum(f: &mut fmt::Formatter<'_>, name: &str, idents: &[String]) -> fmt::Result {
    writeln!(f, "#[allow(non_camel_case_types)]")?;
    writeln!(f, "#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]")?;
    if !idents.is_empty() {
        // zero-variant enums cannot carry a repr
        writeln!(f, "#[repr(u8)]")?;
    }
    writeln!(f, "pub enum {} {{", name)?;
    for ident in idents {
        writeln!(f, "    {},", ident)?;
    }
    writeln!(f, "}}")
}
