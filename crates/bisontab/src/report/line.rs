//! Line classification for the sections of a report.
//!
//! Every function here looks at a single line in isolation; the reader in
//! the parent module decides which classifier applies in which section.

use crate::grammar::quoted_len;

/// A line that opens a new section of the report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Header {
    Grammar,
    Terminals,
    Nonterminals,
    State(u16),
}

pub fn header(line: &str) -> Option<Header> {
    let line = line.trim_end();
    if line == "Grammar" {
        return Some(Header::Grammar);
    }
    if line.starts_with("Terminals, ") {
        return Some(Header::Terminals);
    }
    if line.starts_with("Nonterminals, ") {
        return Some(Header::Nonterminals);
    }
    let rest = line
        .strip_prefix("state ")
        .or_else(|| line.strip_prefix("State "))?;
    number(rest).map(Header::State)
}

/// A numbered line of the `Grammar` section.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RuleLine<'a> {
    pub number: u16,
    /// `None` for an alternative (`N | ...`) of the previous rule.
    pub left: Option<&'a str>,
    pub right: &'a str,
}

// `    3 expr: expr PLUS expr`
// `    4     | NUM`
pub fn rule_line(line: &str) -> Option<RuleLine<'_>> {
    let line = line.trim();
    let (number, rest) = split_number(line)?;
    let rest = rest.trim_start();
    if let Some(right) = rest.strip_prefix('|') {
        return Some(RuleLine {
            number,
            left: None,
            right: right.trim(),
        });
    }
    let (left, right) = rest.split_once(':')?;
    let left = left.trim();
    if left.is_empty() || left.contains(char::is_whitespace) {
        return None;
    }
    Some(RuleLine {
        number,
        left: Some(left),
        right: right.trim(),
    })
}

/// Extract the symbol name from a line of the `Terminals` or
/// `Nonterminals` listing, dropping the annotations after it.
///
/// `NUM <ival> (258) 4 5` → `NUM`
///
/// Leading indentation, as used by the listings of newer bison releases,
/// is ignored.
pub fn symbol_name(line: &str) -> &str {
    let line = line.trim();
    let end = quoted_len(line).unwrap_or(0);
    let mut name = line;
    for annotation in [" (", " <"] {
        if let Some(pos) = name[end.min(name.len())..].find(annotation) {
            name = &name[..end + pos];
        }
    }
    name.trim_end()
}

/// The kinds of line found inside a `state N` block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StateLine<'a> {
    /// A kernel or closure item, e.g. `    3 expr: expr . PLUS expr`.
    Item,

    /// A remark on how bison resolved a conflict.
    Note,

    /// `T  shift, and go to state K`
    Shift {
        token: &'a str,
        target: u16,
        discarded: bool,
    },

    /// `T  reduce using rule R (lhs)`
    Reduce {
        token: &'a str,
        rule: u16,
        discarded: bool,
    },

    /// `N  go to state K`
    Goto { symbol: &'a str, target: u16 },

    /// `T  accept`
    Accept { token: &'a str, discarded: bool },

    /// `T  error (nonassociative)`
    Error { token: &'a str, discarded: bool },

    Unrecognized,
}

/// Classify a line inside a state block.
///
/// The leading token is a bare name, a quoted character (`' '`) or a
/// quoted string alias (`"end of file"`); the latter two may contain
/// spaces.
pub fn state_line(line: &str) -> StateLine<'_> {
    let line = line.trim();
    if split_number(line).is_some() {
        return StateLine::Item;
    }
    if line.starts_with("Conflict between ") {
        return StateLine::Note;
    }

    let token_len = quoted_len(line)
        .or_else(|| line.find(char::is_whitespace))
        .unwrap_or(line.len());
    let (token, rest) = line.split_at(token_len);
    let rest = rest.trim();
    if token.is_empty() || rest.is_empty() {
        return StateLine::Unrecognized;
    }

    let (rest, discarded) = match rest.strip_prefix('[') {
        Some(inner) => (inner.strip_suffix(']').unwrap_or(inner).trim(), true),
        None => (rest, false),
    };

    if let Some(target) = rest.strip_prefix("shift, and go to state ") {
        if let Some(target) = number(target) {
            return StateLine::Shift {
                token,
                target,
                discarded,
            };
        }
    } else if let Some(rule) = rest.strip_prefix("reduce using rule ") {
        if let Some((rule, _)) = split_number(rule) {
            return StateLine::Reduce {
                token,
                rule,
                discarded,
            };
        }
    } else if let Some(target) = rest.strip_prefix("go to state ") {
        if let (Some(target), false) = (number(target), discarded) {
            return StateLine::Goto {
                symbol: token,
                target,
            };
        }
    } else if rest == "accept" {
        return StateLine::Accept { token, discarded };
    } else if rest == "error" || rest.starts_with("error (") {
        return StateLine::Error { token, discarded };
    }

    StateLine::Unrecognized
}

fn number(s: &str) -> Option<u16> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `"12 rest"` → `(12, " rest")`
fn split_number(s: &str) -> Option<(u16, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let (digits, rest) = s.split_at(end);
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    digits.parse().ok().map(|n| (n, rest))
}
