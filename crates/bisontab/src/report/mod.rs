//! Reader for the automaton report written by `bison -v`.
//!
//! The report is consumed line by line. The reader keeps track of the
//! section it is in and routes each line to the symbol table, the rule set
//! or the state table builder.

pub mod line;

use self::line::{Header, StateLine};
use crate::{
    automaton::{Automaton, Diagnostic},
    grammar::{tokenize_right, Rule, RuleID, RuleSet},
    symbol::{SymbolTable, DEFAULT_TOKEN, ERROR_TOKEN},
    table::{Action, StateID, TableBuilder},
    Strictness,
};

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("missing `{section}' section")]
    MissingSection { section: &'static str },

    #[error("line {line}: expected state {expected}, found state {found}")]
    StateOutOfOrder { line: usize, expected: u16, found: u16 },

    #[error("line {line}: rule {rule} is defined twice")]
    DuplicateRule { line: usize, rule: u16 },

    #[error("line {line}: alternative without a preceding rule")]
    OrphanAlternative { line: usize },

    #[error("line {line}: unknown terminal `{name}'")]
    UnknownTerminal { line: usize, name: String },

    #[error("line {line}: unknown nonterminal `{name}'")]
    UnknownNonterminal { line: usize, name: String },

    #[error("line {line}: conflicting actions on `{token}' in state {state}")]
    ConflictingActions {
        line: usize,
        state: u16,
        token: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mode {
    Unknown,
    Grammar,
    Terminals,
    Nonterminals,
    State,
}

/// Accumulates the model while the report is being scanned.
#[derive(Debug)]
pub struct Reader {
    strictness: Strictness,
    mode: Mode,
    symbols: SymbolTable,
    rules: RuleSet,
    last_left: Option<String>,
    /// Indentation of the names in the current symbol listing.
    name_column: Option<usize>,
    table: Option<TableBuilder>,
    diagnostics: Vec<Diagnostic>,
}

impl Reader {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            mode: Mode::Unknown,
            symbols: SymbolTable::new(),
            rules: RuleSet::new(),
            last_left: None,
            name_column: None,
            table: None,
            diagnostics: vec![],
        }
    }

    /// Process one line of the report. `lineno` is 1-based.
    pub fn feed(&mut self, lineno: usize, line: &str) -> Result<(), ReadError> {
        if line.trim().is_empty() {
            return Ok(());
        }

        match (self.mode, line::header(line)) {
            (Mode::Unknown, Some(Header::Grammar)) => self.enter(Mode::Grammar),
            (Mode::Unknown, _) => (),

            (Mode::Grammar, Some(Header::Terminals)) => self.enter(Mode::Terminals),
            (Mode::Grammar, _) => self.rule_line(lineno, line)?,

            (Mode::Terminals, Some(Header::Nonterminals)) => self.enter(Mode::Nonterminals),
            (Mode::Terminals, _) => self.terminal_line(line),

            (Mode::Nonterminals, Some(Header::State(n))) => {
                self.enter(Mode::State);
                self.table = Some(TableBuilder::new(&self.symbols, self.strictness));
                self.begin_state(lineno, n)?;
            }
            (Mode::Nonterminals, _) => self.nonterminal_line(line),

            (Mode::State, Some(Header::State(n))) => self.begin_state(lineno, n)?,
            (Mode::State, _) => self.state_line(lineno, line)?,
        }

        Ok(())
    }

    pub fn finish(self) -> Result<Automaton, ReadError> {
        let missing = match self.mode {
            Mode::Unknown => Some("Grammar"),
            Mode::Grammar => Some("Terminals"),
            Mode::Terminals => Some("Nonterminals"),
            Mode::Nonterminals => Some("state"),
            Mode::State => None,
        };
        if let Some(section) = missing {
            return Err(ReadError::MissingSection { section });
        }

        let table = self.table.map(TableBuilder::finish).unwrap_or_default();
        tracing::debug!(
            "read {} terminals, {} nonterminals, {} rules, {} states",
            self.symbols.num_terminals(),
            self.symbols.num_nonterminals(),
            self.rules.len(),
            table.len()
        );

        Ok(Automaton {
            symbols: self.symbols,
            rules: self.rules,
            table,
            diagnostics: self.diagnostics,
        })
    }

    fn enter(&mut self, mode: Mode) {
        tracing::trace!("enter section {:?}", mode);
        self.mode = mode;
        self.name_column = None;
    }

    fn diagnose(&mut self, line: usize, message: String) {
        tracing::warn!("line {}: {}", line, message);
        self.diagnostics.push(Diagnostic { line, message });
    }

    fn rule_line(&mut self, lineno: usize, line: &str) -> Result<(), ReadError> {
        let Some(parsed) = line::rule_line(line) else {
            self.diagnose(lineno, format!("unrecognized grammar line: {}", line.trim()));
            return Ok(());
        };

        let left = match parsed.left {
            Some(left) => {
                self.last_left = Some(left.to_owned());
                left
            }
            None => self
                .last_left
                .as_deref()
                .ok_or(ReadError::OrphanAlternative { line: lineno })?,
        };

        let rule = Rule::new(
            RuleID::new(parsed.number),
            left,
            tokenize_right(parsed.right),
        );
        tracing::trace!("rule {}: {}", parsed.number, rule.display());
        let expected = self.rules.len();
        self.rules
            .insert(rule)
            .map_err(|rule| ReadError::DuplicateRule {
                line: lineno,
                rule: rule.id().raw(),
            })?;
        // the rule table is indexed by position
        if usize::from(parsed.number) != expected {
            self.diagnose(
                lineno,
                format!(
                    "rule {} follows {} rules; reductions will index the wrong rule record",
                    parsed.number, expected
                ),
            );
        }
        Ok(())
    }

    fn terminal_line(&mut self, line: &str) {
        let Some(name) = self.listed_name(line) else {
            return;
        };
        if name != ERROR_TOKEN {
            self.symbols.declare_terminal(name);
        }
    }

    fn nonterminal_line(&mut self, line: &str) {
        if let Some(name) = self.listed_name(line) {
            self.symbols.declare_nonterminal(name);
        }
    }

    /// The symbol named by a line of a symbol listing, or `None` for the
    /// `on left: 1 2` details, which are indented deeper than the names.
    fn listed_name<'l>(&mut self, line: &'l str) -> Option<&'l str> {
        let indent = line.len() - line.trim_start().len();
        match self.name_column {
            Some(column) if indent > column => return None,
            Some(..) => (),
            None => self.name_column = Some(indent),
        }
        Some(line::symbol_name(line))
    }

    fn begin_state(&mut self, lineno: usize, found: u16) -> Result<(), ReadError> {
        let Some(table) = self.table.as_mut() else {
            return Ok(());
        };
        let expected = table.next_state().raw();
        if found != expected {
            return Err(ReadError::StateOutOfOrder {
                line: lineno,
                expected,
                found,
            });
        }
        table.begin_state();
        Ok(())
    }

    fn state_line(&mut self, lineno: usize, line: &str) -> Result<(), ReadError> {
        let (token, action, discarded) = match line::state_line(line) {
            StateLine::Item | StateLine::Note => return Ok(()),
            StateLine::Unrecognized => {
                self.diagnose(lineno, format!("unrecognized state line: {}", line.trim()));
                return Ok(());
            }
            StateLine::Goto { symbol, target } => {
                let nonterminal = self.symbols.nonterminal(symbol).ok_or_else(|| {
                    ReadError::UnknownNonterminal {
                        line: lineno,
                        name: symbol.to_owned(),
                    }
                })?;
                if let Some(table) = self.table.as_mut() {
                    table.goto(nonterminal, StateID::new(target));
                }
                return Ok(());
            }
            StateLine::Shift {
                token,
                target,
                discarded,
            } => (token, Action::Shift(StateID::new(target)), discarded),
            StateLine::Reduce {
                token,
                rule,
                discarded,
            } => (token, Action::Reduce(RuleID::new(rule)), discarded),
            StateLine::Accept { token, discarded } => (token, Action::Accept, discarded),
            StateLine::Error { token, discarded } => (token, Action::Error, discarded),
        };

        let Some(table) = self.table.as_mut() else {
            return Ok(());
        };
        let state = table.next_state().raw().saturating_sub(1);
        let recorded = if token == DEFAULT_TOKEN {
            table.default_action(action, discarded)
        } else {
            let terminal =
                self.symbols
                    .terminal(token)
                    .ok_or_else(|| ReadError::UnknownTerminal {
                        line: lineno,
                        name: token.to_owned(),
                    })?;
            table.action(terminal, action, discarded)
        };
        recorded.map_err(|_| ReadError::ConflictingActions {
            line: lineno,
            state,
            token: token.to_owned(),
        })
    }
}

/// Read a whole report.
pub fn read(source: &str, strictness: Strictness) -> Result<Automaton, ReadError> {
    let span = tracing::trace_span!("read");
    let _entered = span.enter();

    let mut reader = Reader::new(strictness);
    for (i, line) in source.lines().enumerate() {
        reader.feed(i + 1, line)?;
    }
    reader.finish()
}
