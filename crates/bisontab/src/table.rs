//! Construction of the per-state action/goto table.

use crate::{
    grammar::{RuleID, RuleSet},
    symbol::{NonterminalID, SymbolTable, TerminalID},
    util::display_fn,
    Strictness,
};
use bit_set::BitSet;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: u16,
}
impl StateID {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.raw
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}
impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.raw)
    }
}

/// The action that the automaton in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Read a lookahead symbol and transition to the specified state.
    Shift(StateID),

    /// Reduce to the specified production rule.
    Reduce(RuleID),

    Accept,

    /// Reject the lookahead symbol.
    Error,
}

/// The cell value reserved for [`Action::Accept`].
///
/// It lies outside the range of state ids and rule numbers a packed table
/// can hold.
pub const ACCEPT_CELL: i8 = 127;

impl Action {
    /// Pack this action into a signed table cell.
    ///
    /// `Reduce` of rule 0 and `Error` both pack to zero; rule 0 augments the
    /// start symbol and is never reduced.
    pub fn to_cell(self) -> Option<i8> {
        match self {
            Self::Shift(target) => i8::try_from(target.raw())
                .ok()
                .filter(|&cell| cell != ACCEPT_CELL),
            Self::Reduce(rule) => i8::try_from(-i32::from(rule.raw())).ok(),
            Self::Accept => Some(ACCEPT_CELL),
            Self::Error => Some(0),
        }
    }

    /// The inverse of [`Action::to_cell`], mapping zero to `Error`.
    pub fn from_cell(cell: i8) -> Self {
        match cell {
            ACCEPT_CELL => Self::Accept,
            0 => Self::Error,
            n if n > 0 => Self::Shift(StateID::new(n as u16)),
            n => Self::Reduce(RuleID::new(n.unsigned_abs().into())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(target) => write!(f, "shift({})", target.raw()),
            Self::Reduce(rule) => write!(f, "reduce({})", rule.raw()),
            Self::Accept => f.write_str("accept"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// One completed state: an action for every terminal and an optional
/// successor for every nonterminal.
#[derive(Debug, Clone)]
pub struct StateRow {
    actions: Vec<Action>,
    gotos: Vec<Option<StateID>>,
    default: Option<Action>,
}

impl StateRow {
    pub fn action(&self, terminal: TerminalID) -> Action {
        self.actions[terminal.index()]
    }

    pub fn goto(&self, nonterminal: NonterminalID) -> Option<StateID> {
        self.gotos[nonterminal.index()]
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn gotos(&self) -> &[Option<StateID>] {
        &self.gotos
    }

    /// The fallback action declared by `$default`, if any.
    pub fn default_action(&self) -> Option<Action> {
        self.default
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseTable {
    states: Vec<StateRow>,
}

impl ParseTable {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: StateID) -> &StateRow {
        &self.states[id.index()]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &StateRow)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, row)| (StateID::new(i as u16), row))
    }

    /// Check that every reduction names a declared rule and every
    /// transition lands on an existing state.
    pub fn validate(&self, rules: &RuleSet) -> Result<(), TableError> {
        let num_states = self.states.len();
        for (id, row) in self.states() {
            for action in &row.actions {
                match *action {
                    Action::Reduce(rule) if !rules.contains(rule) => {
                        return Err(TableError::UndeclaredRule {
                            state: id.raw(),
                            rule: rule.raw(),
                        });
                    }
                    Action::Shift(target) if target.index() >= num_states => {
                        return Err(TableError::StateOutOfRange {
                            state: id.raw(),
                            target: target.raw(),
                        });
                    }
                    _ => (),
                }
            }
            for target in row.gotos.iter().flatten() {
                if target.index() >= num_states {
                    return Err(TableError::StateOutOfRange {
                        state: id.raw(),
                        target: target.raw(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Pack every action and goto into signed 8-bit cells.
    pub fn pack(&self) -> Result<PackedTable, PackError> {
        let mut rows = Vec::with_capacity(self.states.len());
        for (id, row) in self.states() {
            let actions = row
                .actions
                .iter()
                .map(|action| {
                    action.to_cell().ok_or(PackError::CellOverflow {
                        state: id.raw(),
                        action: *action,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let gotos = row
                .gotos
                .iter()
                .map(|goto| match goto {
                    None => Ok(0),
                    Some(target) => Action::Shift(*target).to_cell().ok_or(
                        PackError::CellOverflow {
                            state: id.raw(),
                            action: Action::Shift(*target),
                        },
                    ),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(PackedRow { actions, gotos });
        }
        Ok(PackedTable { rows })
    }

    pub fn display<'t>(&'t self, symbols: &'t SymbolTable) -> impl fmt::Display + 't {
        display_fn(|f| {
            for (i, (id, row)) in self.states().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {}", id.raw())?;
                writeln!(f, "## actions")?;
                for (terminal, name) in symbols.terminals() {
                    writeln!(f, "- {} => {}", name, row.action(terminal))?;
                }
                if let Some(default) = row.default {
                    writeln!(f, "- $default => {}", default)?;
                }
                writeln!(f, "## gotos")?;
                for (nonterminal, name) in symbols.nonterminals() {
                    if let Some(target) = row.goto(nonterminal) {
                        writeln!(f, "- {} => goto({})", name, target.raw())?;
                    }
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("state {state} reduces by undeclared rule {rule}")]
    UndeclaredRule { state: u16, rule: u16 },

    #[error("state {state} refers to nonexistent state {target}")]
    StateOutOfRange { state: u16, target: u16 },

    #[error("rule {rule} produces `{name}', which is not a listed nonterminal")]
    UndeclaredNonterminal { rule: u16, name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("{action} in state {state} does not fit into a table cell")]
    CellOverflow { state: u16, action: Action },
}

/// The numeric form of a [`ParseTable`].
///
/// Action cells hold `+K` for a shift to state `K`, `-R` for a reduction
/// by rule `R`, [`ACCEPT_CELL`] for accept and `0` for error. Goto cells
/// hold the successor state, or `0` where there is no transition.
#[derive(Debug, Clone)]
pub struct PackedTable {
    pub rows: Vec<PackedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedRow {
    pub actions: Vec<i8>,
    pub gotos: Vec<i8>,
}

/// Returned when a (state, token) pair receives a second action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DuplicateEntry;

/// Incremental builder for a [`ParseTable`], fed one state block at a time.
#[derive(Debug)]
pub struct TableBuilder {
    num_terminals: usize,
    num_nonterminals: usize,
    strictness: Strictness,
    states: Vec<StateRow>,
    pending: Option<PendingState>,
}

#[derive(Debug)]
struct PendingState {
    id: StateID,
    actions: Vec<Action>,
    explicit: BitSet,
    default: Option<Action>,
    gotos: Vec<Option<StateID>>,
}

impl TableBuilder {
    pub fn new(symbols: &SymbolTable, strictness: Strictness) -> Self {
        Self {
            num_terminals: symbols.num_terminals(),
            num_nonterminals: symbols.num_nonterminals(),
            strictness,
            states: vec![],
            pending: None,
        }
    }

    /// The id the next state block must carry.
    pub fn next_state(&self) -> StateID {
        StateID::new((self.states.len() + usize::from(self.pending.is_some())) as u16)
    }

    /// Close the current state block, if any, and open the next one.
    pub fn begin_state(&mut self) -> StateID {
        self.end_state();
        let id = self.next_state();
        tracing::trace!("begin state {:?}", id);
        self.pending = Some(PendingState {
            id,
            actions: vec![Action::Error; self.num_terminals],
            explicit: BitSet::with_capacity(self.num_terminals),
            default: None,
            gotos: vec![None; self.num_nonterminals],
        });
        id
    }

    /// Record the action on `terminal` in the current state.
    ///
    /// `discarded` marks an action bison listed in brackets, i.e. one it
    /// dropped while resolving a conflict.
    pub fn action(
        &mut self,
        terminal: TerminalID,
        action: Action,
        discarded: bool,
    ) -> Result<(), DuplicateEntry> {
        let strictness = self.strictness;
        let Some(state) = self.pending.as_mut() else {
            return Ok(());
        };
        if discarded && strictness == Strictness::Strict {
            tracing::trace!("{:?}: drop discarded {} on {:?}", state.id, action, terminal);
            return Ok(());
        }
        let fresh = state.explicit.insert(terminal.index());
        if !fresh && strictness == Strictness::Strict {
            return Err(DuplicateEntry);
        }
        state.actions[terminal.index()] = action;
        Ok(())
    }

    /// Record the `$default` action of the current state.
    pub fn default_action(&mut self, action: Action, discarded: bool) -> Result<(), DuplicateEntry> {
        let strictness = self.strictness;
        let Some(state) = self.pending.as_mut() else {
            return Ok(());
        };
        if discarded && strictness == Strictness::Strict {
            return Ok(());
        }
        if state.default.is_some() && strictness == Strictness::Strict {
            return Err(DuplicateEntry);
        }
        state.default = Some(action);
        Ok(())
    }

    pub fn goto(&mut self, nonterminal: NonterminalID, target: StateID) {
        if let Some(state) = self.pending.as_mut() {
            state.gotos[nonterminal.index()] = Some(target);
        }
    }

    fn end_state(&mut self) {
        let Some(mut state) = self.pending.take() else {
            return;
        };
        let fallback = state.default.unwrap_or(Action::Error);
        for (i, action) in state.actions.iter_mut().enumerate() {
            if !state.explicit.contains(i) {
                *action = fallback;
            }
        }
        self.states.push(StateRow {
            actions: state.actions,
            gotos: state.gotos,
            default: state.default,
        });
    }

    pub fn finish(mut self) -> ParseTable {
        self.end_state();
        ParseTable {
            states: self.states,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        symbols.declare_terminal("$end");
        symbols.declare_terminal("PLUS");
        symbols.declare_terminal("NUM");
        symbols.declare_nonterminal("$accept");
        symbols.declare_nonterminal("expr");
        symbols
    }

    const END: TerminalID = TerminalID::new(0);
    const PLUS: TerminalID = TerminalID::new(1);
    const NUM: TerminalID = TerminalID::new(2);
    const EXPR: NonterminalID = NonterminalID::new(1);

    #[test]
    fn default_action_fills_unassigned_terminals() {
        let mut builder = TableBuilder::new(&symbols(), Strictness::Strict);
        builder.begin_state();
        builder.action(PLUS, Action::Shift(StateID::new(1)), false).unwrap();
        builder
            .default_action(Action::Reduce(RuleID::new(2)), false)
            .unwrap();
        builder.goto(EXPR, StateID::new(1));
        builder.begin_state();
        builder.action(NUM, Action::Shift(StateID::new(0)), false).unwrap();
        let table = builder.finish();

        assert_eq!(table.len(), 2);
        let s0 = table.state(StateID::new(0));
        assert_eq!(s0.action(PLUS), Action::Shift(StateID::new(1)));
        assert_eq!(s0.action(END), Action::Reduce(RuleID::new(2)));
        assert_eq!(s0.action(NUM), Action::Reduce(RuleID::new(2)));
        assert_eq!(s0.goto(EXPR), Some(StateID::new(1)));
        assert_eq!(s0.goto(NonterminalID::new(0)), None);

        let s1 = table.state(StateID::new(1));
        assert_eq!(s1.actions(), [Action::Error, Action::Error, Action::Shift(StateID::new(0))]);
        assert_eq!(s1.default_action(), None);
    }

    #[test]
    fn strict_mode_drops_discarded_and_rejects_duplicates() {
        let mut builder = TableBuilder::new(&symbols(), Strictness::Strict);
        builder.begin_state();
        builder.action(PLUS, Action::Shift(StateID::new(0)), false).unwrap();
        builder.action(PLUS, Action::Reduce(RuleID::new(1)), true).unwrap();
        assert_eq!(
            builder.action(PLUS, Action::Reduce(RuleID::new(1)), false),
            Err(DuplicateEntry)
        );
        builder.default_action(Action::Accept, false).unwrap();
        assert_eq!(builder.default_action(Action::Error, false), Err(DuplicateEntry));

        let table = builder.finish();
        assert_eq!(table.state(StateID::new(0)).action(PLUS), Action::Shift(StateID::new(0)));
    }

    #[test]
    fn legacy_mode_last_entry_wins() {
        let mut builder = TableBuilder::new(&symbols(), Strictness::Legacy);
        builder.begin_state();
        builder.action(PLUS, Action::Shift(StateID::new(0)), false).unwrap();
        builder.action(PLUS, Action::Reduce(RuleID::new(1)), true).unwrap();
        let table = builder.finish();
        assert_eq!(table.state(StateID::new(0)).action(PLUS), Action::Reduce(RuleID::new(1)));
    }

    #[test]
    fn cells_round_trip_except_rule_zero() {
        assert_eq!(Action::Shift(StateID::new(5)).to_cell(), Some(5));
        assert_eq!(Action::Reduce(RuleID::new(7)).to_cell(), Some(-7));
        assert_eq!(Action::Reduce(RuleID::new(128)).to_cell(), Some(-128));
        assert_eq!(Action::Reduce(RuleID::new(129)).to_cell(), None);
        assert_eq!(Action::Accept.to_cell(), Some(ACCEPT_CELL));
        assert_eq!(Action::Error.to_cell(), Some(0));
        assert_eq!(Action::Shift(StateID::new(127)).to_cell(), None);
        assert_eq!(Action::Shift(StateID::new(126)).to_cell(), Some(126));

        assert_eq!(Action::from_cell(-7), Action::Reduce(RuleID::new(7)));
        assert_eq!(Action::from_cell(-128), Action::Reduce(RuleID::new(128)));
        assert_eq!(Action::from_cell(5), Action::Shift(StateID::new(5)));
        assert_eq!(Action::from_cell(ACCEPT_CELL), Action::Accept);
        // indistinguishable from "no action"
        assert_eq!(Action::Reduce(RuleID::new(0)).to_cell(), Some(0));
        assert_eq!(Action::from_cell(0), Action::Error);
    }

    #[test]
    fn validate_and_pack() {
        let mut rules = RuleSet::new();
        rules
            .insert(crate::grammar::Rule::new(RuleID::new(1), "expr", vec![]))
            .unwrap();

        let mut builder = TableBuilder::new(&symbols(), Strictness::Strict);
        builder.begin_state();
        builder.action(NUM, Action::Accept, false).unwrap();
        builder.default_action(Action::Reduce(RuleID::new(1)), false).unwrap();
        builder.goto(EXPR, StateID::new(0));
        let table = builder.finish();
        table.validate(&rules).unwrap();

        let packed = table.pack().unwrap();
        assert_eq!(
            packed.rows,
            [PackedRow {
                actions: vec![-1, -1, ACCEPT_CELL],
                gotos: vec![0, 0],
            }]
        );

        let mut builder = TableBuilder::new(&symbols(), Strictness::Strict);
        builder.begin_state();
        builder.action(NUM, Action::Reduce(RuleID::new(9)), false).unwrap();
        builder.goto(EXPR, StateID::new(3));
        let table = builder.finish();
        assert!(matches!(
            table.validate(&rules),
            Err(TableError::UndeclaredRule { state: 0, rule: 9 })
        ));
    }

    fn expr_rule() -> RuleSet {
        let mut rules = RuleSet::new();
        rules
            .insert(crate::grammar::Rule::new(RuleID::new(1), "expr", vec![]))
            .unwrap();
        rules
    }

    #[test]
    fn validate_rejects_shift_past_last_state() {
        let mut builder = TableBuilder::new(&symbols(), Strictness::Strict);
        builder.begin_state();
        builder.action(END, Action::Shift(StateID::new(5)), false).unwrap();
        builder.default_action(Action::Reduce(RuleID::new(1)), false).unwrap();
        let table = builder.finish();
        assert!(matches!(
            table.validate(&expr_rule()),
            Err(TableError::StateOutOfRange { state: 0, target: 5 })
        ));
    }

    #[test]
    fn validate_rejects_goto_past_last_state() {
        let mut builder = TableBuilder::new(&symbols(), Strictness::Strict);
        builder.begin_state();
        builder.action(NUM, Action::Shift(StateID::new(1)), false).unwrap();
        builder.begin_state();
        builder.default_action(Action::Reduce(RuleID::new(1)), false).unwrap();
        builder.goto(EXPR, StateID::new(2));
        let table = builder.finish();
        assert!(matches!(
            table.validate(&expr_rule()),
            Err(TableError::StateOutOfRange { state: 1, target: 2 })
        ));
    }

    #[test]
    fn pack_rejects_overflowing_cells() {
        let mut builder = TableBuilder::new(&symbols(), Strictness::Legacy);
        builder.begin_state();
        builder.action(PLUS, Action::Shift(StateID::new(200)), false).unwrap();
        let table = builder.finish();
        assert!(matches!(
            table.pack(),
            Err(PackError::CellOverflow { state: 0, .. })
        ));
    }
}
