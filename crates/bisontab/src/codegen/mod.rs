//! Rendering of the compiled tables as source code.

mod cpp;
mod rust;

use crate::{
    automaton::Automaton,
    grammar::SymbolRef,
    pattern::RulePattern,
    table::{PackError, PackedTable},
    types::Map,
};
use std::fmt;

/// The language of the generated declarations.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Language {
    /// A C++ header with `States[]` and `BisonGrammar[]` arrays.
    #[default]
    Cpp,
    /// A self-contained Rust module.
    Rust,
}

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("failed to pack the parse table")]
    Pack(
        #[from]
        #[source]
        PackError,
    ),

    #[error("`{first}' and `{second}' both map to the identifier `{ident}'")]
    NameCollision {
        first: String,
        second: String,
        ident: String,
    },

    #[error("rule {rule} has {arity} symbols, more than a table cell can hold")]
    ArityOverflow { rule: u16, arity: usize },
}

/// The finished tables, ready to be printed.
///
/// Everything that can fail happens in [`Codegen::new`]; formatting is
/// infallible apart from the underlying writer.
#[derive(Debug)]
pub struct Codegen<'a> {
    automaton: &'a Automaton,
    language: Language,
    packed: PackedTable,
    terminal_idents: Vec<String>,
    nonterminal_idents: Vec<String>,
    patterns: Vec<RulePattern>,
}

impl<'a> Codegen<'a> {
    pub fn new(automaton: &'a Automaton, language: Language) -> Result<Self, CodegenError> {
        let span = tracing::trace_span!("codegen", ?language);
        let _entered = span.enter();

        let packed = automaton.table.pack()?;

        for rule in automaton.rules.iter() {
            if rule.arity() > i8::MAX as usize {
                return Err(CodegenError::ArityOverflow {
                    rule: rule.id().raw(),
                    arity: rule.arity(),
                });
            }
        }

        let terminal_idents = idents(
            automaton.symbols.terminals().map(|(_, name)| name),
            terminal_ident,
        )?;
        let nonterminal_idents = idents(
            automaton.symbols.nonterminals().map(|(_, name)| name),
            nonterminal_ident,
        )?;

        let patterns = automaton.patterns();
        tracing::debug!(
            "{} fixed-shape and {} chained rule patterns",
            patterns
                .iter()
                .filter(|p| matches!(p, RulePattern::Fixed { .. }))
                .count(),
            patterns
                .iter()
                .filter(|p| matches!(p, RulePattern::Chain { .. }))
                .count(),
        );

        Ok(Self {
            automaton,
            language,
            packed,
            terminal_idents,
            nonterminal_idents,
            patterns,
        })
    }
}

impl fmt::Display for Codegen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.language {
            Language::Cpp => cpp::render(self, f),
            Language::Rust => rust::render(self, f),
        }
    }
}

fn idents<'n>(
    names: impl Iterator<Item = &'n str>,
    ident: fn(&str) -> String,
) -> Result<Vec<String>, CodegenError> {
    let mut seen: Map<String, &str> = Map::default();
    for name in names {
        let id = ident(name);
        if let Some(first) = seen.get(&id) {
            return Err(CodegenError::NameCollision {
                first: first.to_string(),
                second: name.to_owned(),
                ident: id,
            });
        }
        seen.insert(id, name);
    }
    Ok(seen.into_keys().collect())
}

pub fn terminal_ident(name: &str) -> String {
    format!("T_{}", mangle(name))
}

pub fn nonterminal_ident(name: &str) -> String {
    format!("NT_{}", mangle(name))
}

fn symbol_ident(symbol: &SymbolRef) -> String {
    match symbol {
        SymbolRef::Literal(..) => terminal_ident(&symbol.to_string()),
        SymbolRef::Terminal(name) => terminal_ident(name),
        SymbolRef::Nonterminal(name) => nonterminal_ident(name),
    }
}

/// Turn a report symbol name into the tail of an identifier.
///
/// `$` and `@` become `Z` and `A`, a quoted character `'c'` becomes
/// `LIT_<hex>` and anything else that cannot continue an identifier
/// becomes `_`.
fn mangle(name: &str) -> String {
    let mut chars = name.chars();
    if let (Some('\''), Some(ch), Some('\''), None) =
        (chars.next(), chars.next(), chars.next(), chars.next())
    {
        return format!("LIT_{:02X}", ch as u32);
    }
    name.chars()
        .map(|ch| match ch {
            '$' => 'Z',
            '@' => 'A',
            ch if unicode_ident::is_xid_continue(ch) => ch,
            _ => '_',
        })
        .collect()
}

/// Escape `s` for use inside a C string literal.
fn c_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 2);
    escaped.push('"');
    for ch in s.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            ch => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

/// Make `text` safe to embed in a block comment.
fn comment_text(text: &str) -> String {
    text.replace("*/", "*\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn mangling() {
        assert_eq!(terminal_ident("$end"), "T_Zend");
        assert_eq!(terminal_ident("'('"), "T_LIT_28");
        assert_eq!(terminal_ident("' '"), "T_LIT_20");
        assert_eq!(terminal_ident("NUM"), "T_NUM");
        assert_eq!(nonterminal_ident("$accept"), "NT_Zaccept");
        assert_eq!(nonterminal_ident("$@1"), "NT_ZA1");
        assert_eq!(nonterminal_ident("expr.list"), "NT_expr_list");
        assert_eq!(symbol_ident(&SymbolRef::Literal('+')), "T_LIT_2B");
    }

    #[test]
    fn escaping() {
        assert_eq!(c_string("$end"), "\"$end\"");
        assert_eq!(c_string("'\"'"), "\"'\\\"'\"");
        assert_eq!(c_string("'\\\\'"), "\"'\\\\\\\\'\"");
        assert_eq!(comment_text("a: '*' '/' b */"), "a: '*' '/' b *\\/");
    }

    #[test]
    fn long_rules_overflow_the_arity_cell() {
        let source = format!(
            "\
Grammar

    0 a:{}

Terminals, with rules where they appear

X (258)

Nonterminals, with rules where they appear

a (4)

state 0

    $default  accept
",
            " X".repeat(128)
        );
        let automaton = Config::new().compile(&source).unwrap();
        assert!(matches!(
            Codegen::new(&automaton, Language::Cpp),
            Err(CodegenError::ArityOverflow {
                rule: 0,
                arity: 128
            })
        ));
    }

    #[test]
    fn name_collisions_are_reported() {
        let source = "\
Grammar

    0 a: %empty

Terminals, with rules where they appear

x.y (258)
x_y (259)

Nonterminals, with rules where they appear

a (4)

state 0

    $default  accept
";
        let automaton = Config::new().compile(source).unwrap();
        match Codegen::new(&automaton, Language::Cpp) {
            Err(CodegenError::NameCollision {
                first,
                second,
                ident,
            }) => {
                assert_eq!(first, "x.y");
                assert_eq!(second, "x_y");
                assert_eq!(ident, "T_x_y");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
