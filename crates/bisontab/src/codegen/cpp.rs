//! C++ header layout, as consumed by the hand-written table-driven parser.

use super::{c_string, comment_text, symbol_ident, Codegen};
use crate::util::write_wrapped;
use std::fmt;

const WRAP: usize = 60;

pub(super) fn render(g: &Codegen<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let symbols = &g.automaton.symbols;

    writeln!(f, "/* This file was generated by bisontab. Do not edit. */")?;

    write_enum(f, "Terminals", &g.terminal_idents, "NUM_TERMINALS")?;
    write_enum(f, "NonTerminals", &g.nonterminal_idents, "NUM_NONTERMINALS")?;

    let terminal_names: Vec<_> = symbols.terminals().map(|(_, name)| name).collect();
    write_names(f, "TerminalNames", "NUM_TERMINALS", &terminal_names)?;
    let nonterminal_names: Vec<_> = symbols.nonterminals().map(|(_, name)| name).collect();
    write_names(f, "NonTerminalNames", "NUM_NONTERMINALS", &nonterminal_names)?;

    writeln!(f, "static const struct BisonState")?;
    writeln!(f, "{{")?;
    writeln!(
        f,
        "    signed char Actions[NUM_TERMINALS], Goto[NUM_NONTERMINALS];"
    )?;
    writeln!(f, "}} States[] =")?;
    writeln!(f, "{{")?;
    for (i, row) in g.packed.rows.iter().enumerate() {
        if i % 5 == 0 {
            writeln!(f, "  // state {}", i)?;
        }
        f.write_str("  { { ")?;
        for (j, cell) in row.actions.iter().enumerate() {
            if j > 0 {
                f.write_str(",")?;
            }
            write!(f, "{:3}", cell)?;
        }
        f.write_str("}, { ")?;
        for (j, cell) in row.gotos.iter().enumerate() {
            if j > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", cell)?;
        }
        writeln!(f, "}} }},")?;
    }
    writeln!(f, "}};")?;

    let width = g
        .nonterminal_idents
        .iter()
        .map(|ident| ident.len())
        .max()
        .unwrap_or(0);
    writeln!(
        f,
        "/* One record per rule in ascending rule number; a reduce cell -R selects"
    )?;
    writeln!(f, "   record R when the numbers have no gaps. */")?;
    writeln!(f, "static const struct BisonReduce")?;
    writeln!(f, "{{")?;
    writeln!(f, "  int          n_reduce:8;")?;
    writeln!(f, "  NonTerminals produced_nonterminal:8;")?;
    writeln!(f, "}} BisonGrammar[] =")?;
    writeln!(f, "{{")?;
    for rule in g.automaton.rules.iter() {
        writeln!(
            f,
            "  {{{:3}, {:width$}}}, /* {} */",
            rule.arity(),
            super::nonterminal_ident(rule.left()),
            comment_text(&rule.display().to_string()),
            width = width,
        )?;
    }
    writeln!(f, "}};")?;

    writeln!(f, "#ifdef BISON_RULE_PATTERNS")?;
    for (rule, pattern) in g.automaton.rules.iter().zip(&g.patterns) {
        writeln!(
            f,
            "typedef Reduce<{} > BisonRule{};",
            pattern.display(symbol_ident),
            rule.id().raw()
        )?;
    }
    writeln!(f, "#endif")?;

    Ok(())
}

fn write_enum(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    idents: &[String],
    count: &str,
) -> fmt::Result {
    writeln!(f, "enum {}", name)?;
    writeln!(f, "{{")?;
    if !idents.is_empty() {
        f.write_str("    ")?;
        write_wrapped(f, "    ", WRAP, idents)?;
        writeln!(f, ",")?;
    }
    writeln!(f, "    {}", count)?;
    writeln!(f, "}};")
}

fn write_names(f: &mut fmt::Formatter<'_>, name: &str, count: &str, names: &[&str]) -> fmt::Result {
    let longest = names.iter().map(|name| name.len()).max().unwrap_or(0);
    writeln!(f, "static const char {}[{}][1+{}] =", name, count, longest)?;
    writeln!(f, "{{")?;
    f.write_str("    ")?;
    write_wrapped(f, "    ", WRAP, names.iter().map(|name| c_string(name)))?;
    writeln!(f)?;
    writeln!(f, "}};")
}

#[cfg(test)]
mod tests {
    use crate::{
        codegen::{Codegen, Language},
        Config,
    };

    const REPORT: &str = "\
Grammar

    0 $accept: expr $end
    1 expr: NUM
    2     | expr '+' NUM

Terminals, with rules where they appear

$end (0) 0
'+' (43) 2
error (256)
NUM (258) 1 2

Nonterminals, with rules where they appear

$accept (6)
    on left: 0
expr (7)
    on left: 1 2, on right: 0 2

state 0

    0 $accept: . expr $end

    NUM  shift, and go to state 1

    expr  go to state 2

state 1

    $default  reduce using rule 1 (expr)

state 2

    $end  shift, and go to state 3
    '+'   shift, and go to state 4

state 3

    $default  accept

state 4

    NUM  shift, and go to state 5

state 5

    $default  reduce using rule 2 (expr)
";

    #[test]
    fn renders_header() {
        let automaton = Config::new().compile(REPORT).unwrap();
        let out = Codegen::new(&automaton, Language::Cpp).unwrap().to_string();
        eprintln!("{}", out);

        assert!(out.contains("enum Terminals\n{\n    T_Zend, T_LIT_2B, T_NUM,\n    NUM_TERMINALS\n};"));
        assert!(out.contains("enum NonTerminals\n{\n    NT_Zaccept, NT_expr,\n    NUM_NONTERMINALS\n};"));
        assert!(out.contains("static const char TerminalNames[NUM_TERMINALS][1+4] ="));
        assert!(out.contains("    \"$end\", \"'+'\", \"NUM\"\n"));
        assert!(out.contains("  // state 0\n  { {   0,  0,  1}, { 0,2} },\n"));
        assert!(out.contains("  { {  -1, -1, -1}, { 0,0} },\n"));
        assert!(out.contains("  { { 127,127,127}, { 0,0} },\n"));
        assert!(out.contains("  // state 5\n  { {  -2, -2, -2}, { 0,0} },\n"));
        assert!(out.contains("  {  2, NT_Zaccept}, /* $accept: expr $end */\n"));
        assert!(out.contains("  {  3, NT_expr   }, /* expr: expr '+' NUM */\n"));
        assert!(out.contains("typedef Reduce<R2(NT_Zaccept,NT_expr,T_Zend) > BisonRule0;"));
        assert!(out.contains("typedef Reduce<R3(NT_expr,NT_expr,T_LIT_2B,T_NUM) > BisonRule2;"));
    }
}
