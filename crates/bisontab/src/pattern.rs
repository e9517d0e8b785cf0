//! Reduction descriptors for the rules of a grammar.
//!
//! The consuming runtime provides specialized reduction shapes `R0` ..
//! `R6` for short rules and a generic, recursive `RulePat`/`RP` shape for
//! anything longer. Each rule is mapped onto exactly one of them.

use crate::grammar::{Rule, SymbolRef};
use std::fmt;

/// The longest right-hand side handled by a fixed-shape descriptor.
pub const MAX_FIXED_ARITY: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePattern {
    /// `R<n>(NT_lhs, s1, .., sn)` for rules with at most six symbols.
    Fixed {
        left: String,
        right: Vec<SymbolRef>,
    },
    /// `RulePat<NT_lhs, chain>` for longer rules.
    Chain { left: String, chain: Chain },
}

/// A cons-list over the right-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chain {
    Link(SymbolRef, Box<Chain>),
    End,
}

impl Chain {
    /// Fold `symbols` from the last one outward, so that the first symbol
    /// ends up in the outermost link.
    pub fn fold(symbols: &[SymbolRef]) -> Self {
        symbols.iter().rev().fold(Self::End, |rest, symbol| {
            Self::Link(symbol.clone(), Box::new(rest))
        })
    }

    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut chain = self;
        while let Self::Link(_, rest) = chain {
            len += 1;
            chain = rest;
        }
        len
    }
}

impl RulePattern {
    pub fn encode(rule: &Rule) -> Self {
        let left = rule.left().to_owned();
        if rule.arity() <= MAX_FIXED_ARITY {
            Self::Fixed {
                left,
                right: rule.right().to_vec(),
            }
        } else {
            Self::Chain {
                left,
                chain: Chain::fold(rule.right()),
            }
        }
    }

    pub fn left(&self) -> &str {
        match self {
            Self::Fixed { left, .. } | Self::Chain { left, .. } => left,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Fixed { right, .. } => right.len(),
            Self::Chain { chain, .. } => chain.len(),
        }
    }

    /// Render this descriptor with the given symbol spelling.
    pub fn display<'a, F>(&'a self, name: F) -> impl fmt::Display + 'a
    where
        F: Fn(&SymbolRef) -> String + 'a,
    {
        crate::util::display_fn(move |f| match self {
            Self::Fixed { left, right } => {
                let left = name(&SymbolRef::Nonterminal(left.clone()));
                write!(f, "R{}({}", right.len(), left)?;
                for symbol in right {
                    write!(f, ",{}", name(symbol))?;
                }
                f.write_str(")")
            }
            Self::Chain { left, chain } => {
                let left = name(&SymbolRef::Nonterminal(left.clone()));
                write!(f, "RulePat<{}, ", left)?;
                let mut depth = 0;
                let mut chain = chain;
                while let Chain::Link(symbol, rest) = chain {
                    write!(f, "RP<{}, ", name(symbol))?;
                    depth += 1;
                    chain = rest;
                }
                f.write_str("TokenEOF")?;
                for _ in 0..depth {
                    f.write_str("> ")?;
                }
                f.write_str(">")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{tokenize_right, RuleID};

    fn rule(right: &str) -> Rule {
        Rule::new(RuleID::new(1), "list", tokenize_right(right))
    }

    fn plain(symbol: &SymbolRef) -> String {
        symbol.to_string()
    }

    #[test]
    fn fixed_shape_up_to_six() {
        for arity in 0..=MAX_FIXED_ARITY {
            let right = vec!["A"; arity].join(" ");
            let pattern = RulePattern::encode(&rule(&right));
            assert!(matches!(pattern, RulePattern::Fixed { .. }), "{}", arity);
            assert_eq!(pattern.arity(), arity);
        }
        let pattern = RulePattern::encode(&rule("list ',' ITEM"));
        assert_eq!(
            pattern.display(plain).to_string(),
            "R3(list,list,',',ITEM)"
        );
        assert_eq!(
            RulePattern::encode(&rule("")).display(plain).to_string(),
            "R0(list)"
        );
    }

    #[test]
    fn chain_shape_beyond_six() {
        let pattern = RulePattern::encode(&rule("A B C D E F G"));
        let RulePattern::Chain { chain, .. } = &pattern else {
            panic!("expected a chain, got {:?}", pattern);
        };
        assert_eq!(chain.len(), 7);
        match chain {
            Chain::Link(SymbolRef::Terminal(first), _) => assert_eq!(first, "A"),
            _ => panic!("unexpected chain head: {:?}", chain),
        }
        assert_eq!(
            pattern.display(plain).to_string(),
            "RulePat<list, RP<A, RP<B, RP<C, RP<D, RP<E, RP<F, RP<G, TokenEOF> > > > > > > >"
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let r = rule("a b c d e f g h");
        assert_eq!(RulePattern::encode(&r), RulePattern::encode(&r));
        assert_eq!(Chain::fold(&[]), Chain::End);
    }
}
