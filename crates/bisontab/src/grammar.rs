//! Grammar rules as listed in the `Grammar` section of a report.

use crate::{
    symbol::{END_TOKEN, ERROR_TOKEN},
    util::display_fn,
};
use std::{collections::BTreeMap, fmt};

/// The rule number assigned by bison.
///
/// Rule numbers are keys, not positions: a report may skip numbers
/// (e.g. for rules removed as useless).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RuleID {
    raw: u16,
}
impl RuleID {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.raw
    }
}
impl fmt::Debug for RuleID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R#{:03}", self.raw)
    }
}

/// A reference to a symbol from the right-hand side of a rule.
///
/// The classification follows bison's reporting convention: quoted
/// characters are literal tokens, all-upper-case names are tokens and
/// everything else names a nonterminal. String aliases (`"end of file"`)
/// and the reserved tokens `$end` and `error` are tokens too, while the
/// names bison makes up for mid-rule actions (`$@1`, `@2`) are
/// nonterminals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolRef {
    Literal(char),
    Terminal(String),
    Nonterminal(String),
}

impl SymbolRef {
    pub fn classify(token: &str) -> Self {
        if let Some(ch) = quoted_char(token) {
            return Self::Literal(ch);
        }
        if matches!(token, END_TOKEN | ERROR_TOKEN) || token.starts_with('"') {
            return Self::Terminal(token.to_owned());
        }
        // `$accept`, `$@1`, `@2`: nonterminals made up by bison
        if token.starts_with(['$', '@']) || token.to_uppercase() != token {
            Self::Nonterminal(token.to_owned())
        } else {
            Self::Terminal(token.to_owned())
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Nonterminal(..))
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(ch) => write!(f, "'{}'", ch),
            Self::Terminal(name) | Self::Nonterminal(name) => f.write_str(name),
        }
    }
}

/// `'c'` → `c`
fn quoted_char(token: &str) -> Option<char> {
    let inner = token.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// Split the right-hand side of a rule line into symbol references.
///
/// Quoted characters are taken as one token even if the quoted character
/// is a space. The explicit empty markers (`/* empty */`, `%empty` and
/// `ε`, depending on the bison version) produce an empty sequence.
pub fn tokenize_right(text: &str) -> Vec<SymbolRef> {
    let text = text.trim();
    if matches!(text, "" | "/* empty */" | "%empty" | "ε") {
        return vec![];
    }

    let mut right = vec![];
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let len = if let Some(len) = quoted_len(rest) {
            len
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        right.push(SymbolRef::classify(&rest[..len]));
        rest = &rest[len..];
    }
    right
}

/// The length of a quoted character (`'c'`) or string alias (`"end of
/// file"`) at the start of `s`, quotes included.
pub(crate) fn quoted_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, '\'')) => match (chars.next(), chars.next()) {
            (Some(_), Some((i, '\''))) => Some(i + 1),
            _ => None,
        },
        Some((_, '"')) => {
            let mut escaped = false;
            for (i, ch) in chars {
                match ch {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => return Some(i + 1),
                    _ => (),
                }
            }
            None
        }
        _ => None,
    }
}

/// A production rule.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleID,
    left: String,
    right: Vec<SymbolRef>,
}

impl Rule {
    pub fn new(id: RuleID, left: impl Into<String>, right: Vec<SymbolRef>) -> Self {
        Self {
            id,
            left: left.into(),
            right,
        }
    }

    pub fn id(&self) -> RuleID {
        self.id
    }

    /// Return the name of the produced nonterminal.
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolRef] {
        &self.right[..]
    }

    /// The number of symbols popped when reducing this rule.
    pub fn arity(&self) -> usize {
        self.right.len()
    }

    // `"LHS: R1 R2 R3"`
    pub fn display(&self) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            write!(f, "{}:", self.left)?;
            if self.right.is_empty() {
                return f.write_str(" %empty");
            }
            for symbol in &self.right {
                write!(f, " {}", symbol)?;
            }
            Ok(())
        })
    }
}

/// The rules of a grammar, ordered by rule number.
#[derive(Debug, Default, Clone)]
pub struct RuleSet {
    rules: BTreeMap<RuleID, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, handing it back if its number is already taken.
    pub fn insert(&mut self, rule: Rule) -> Result<(), Rule> {
        if self.rules.contains_key(&rule.id) {
            return Err(rule);
        }
        self.rules.insert(rule.id, rule);
        Ok(())
    }

    pub fn get(&self, id: RuleID) -> Option<&Rule> {
        self.rules.get(&id)
    }

    pub fn contains(&self, id: RuleID) -> bool {
        self.rules.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules in ascending rule number.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.values()
    }
}
