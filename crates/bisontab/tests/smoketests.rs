use bisontab::{
    codegen::{Codegen, Language},
    Config,
};
use std::{env, path::PathBuf};

macro_rules! define_tests {
    ($($name:ident),*$(,)?) => {$(
        #[test]
        fn $name() {
            let path = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap())
                .join(concat!("tests/fixtures/", stringify!($name), ".output"));
            for config in [Config::new().use_strict(), Config::new().use_legacy()] {
                let automaton = config.compile_file(&path).unwrap();
                assert!(automaton.diagnostics.is_empty(), "{:?}", automaton.diagnostics);
                for language in [Language::Cpp, Language::Rust] {
                    let _generated = Codegen::new(&automaton, language).unwrap().to_string();
                }
            }
        }
    )*};
}

define_tests! {
    bison38,
    calc,
    prec,
}
