//! The compiled automaton and the configuration used to produce it.

use crate::{
    grammar::RuleSet,
    pattern::RulePattern,
    report::{self, ReadError},
    symbol::SymbolTable,
    table::{ParseTable, TableError},
};
use std::{fmt, fs, io, path::Path};

/// How literally the report is taken.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Keep only the actions bison settled on, reject a second action for
    /// the same lookahead and check every reference in the table.
    #[default]
    Strict,

    /// Take every listed action at face value: actions that
    /// bison discarded (listed in brackets) are recorded as well, the last
    /// entry for a lookahead wins and references are not checked.
    Legacy,
}

/// A recoverable problem found while reading a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// The automaton described by a report, normalized into dense tables.
#[derive(Debug)]
#[non_exhaustive]
pub struct Automaton {
    pub symbols: SymbolTable,
    pub rules: RuleSet,
    pub table: ParseTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Automaton {
    /// Compute the reduction descriptor of every rule, in rule order.
    pub fn patterns(&self) -> Vec<RulePattern> {
        self.rules.iter().map(RulePattern::encode).collect()
    }

    /// Check the cross references between rules, symbols and states.
    pub fn validate(&self) -> Result<(), TableError> {
        for rule in self.rules.iter() {
            if self.symbols.nonterminal(rule.left()).is_none() {
                return Err(TableError::UndeclaredNonterminal {
                    rule: rule.id().raw(),
                    name: rule.left().to_owned(),
                });
            }
        }
        self.table.validate(&self.rules)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("IO error: {}", _0)]
    IO(io::Error),

    #[error("malformed report")]
    Read(
        #[from]
        #[source]
        ReadError,
    ),

    #[error("inconsistent automaton")]
    Table(
        #[from]
        #[source]
        TableError,
    ),
}

/// Options for compiling a report.
#[derive(Debug, Default, Clone)]
pub struct Config {
    strictness: Strictness,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn use_legacy(self) -> Self {
        self.strictness(Strictness::Legacy)
    }

    pub fn use_strict(self) -> Self {
        self.strictness(Strictness::Strict)
    }

    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<Automaton, CompileError> {
        let source = fs::read_to_string(path).map_err(CompileError::IO)?;
        self.compile(&source)
    }

    pub fn compile(&self, source: &str) -> Result<Automaton, CompileError> {
        let span = tracing::trace_span!("compile", strictness = ?self.strictness);
        let _entered = span.enter();

        let automaton = report::read(source, self.strictness)?;
        if self.strictness == Strictness::Strict {
            automaton.validate()?;
        }
        tracing::trace!(
            "parse table:\n---\n{}",
            automaton.table.display(&automaton.symbols)
        );
        Ok(automaton)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Grammar

    0 $accept: expr $end
    1 expr: NUM

Terminals, with rules where they appear

$end (0) 0
NUM (258) 1

Nonterminals, with rules where they appear

$accept (4)
expr (5)

state 0

    NUM  shift, and go to state 1

    expr  go to state 2

state 1

    $default  reduce using rule 1 (expr)

state 2

    $end  shift, and go to state 3

state 3

    $default  accept
";

    #[test]
    fn compile_and_encode() {
        let automaton = Config::new().compile(REPORT).unwrap();
        assert_eq!(automaton.table.len(), 4);
        let patterns = automaton.patterns();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].left(), "$accept");
        assert_eq!(patterns[1].arity(), 1);
    }

    #[test]
    fn strict_mode_rejects_dangling_rules() {
        let source = REPORT.replace("reduce using rule 1", "reduce using rule 7");
        assert!(matches!(
            Config::new().compile(&source),
            Err(CompileError::Table(TableError::UndeclaredRule { state: 1, rule: 7 }))
        ));

        let automaton = Config::new().use_legacy().compile(&source).unwrap();
        assert_eq!(automaton.table.pack().unwrap().rows[1].actions, [-7, -7]);
    }

    #[test]
    fn strict_mode_rejects_unlisted_left_symbols() {
        let source = REPORT.replace("    1 expr: NUM", "    1 term: NUM");
        assert!(matches!(
            Config::new().compile(&source),
            Err(CompileError::Table(TableError::UndeclaredNonterminal { rule: 1, .. }))
        ));
    }

    #[test]
    fn missing_file() {
        let err = Config::new()
            .compile_file("/nonexistent/bisontab/parser.output")
            .unwrap_err();
        assert!(matches!(err, CompileError::IO(..)));
    }
}
