//! Build script support.

use crate::{
    codegen::{Codegen, Language},
    Config,
};
use anyhow::Context as _;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

pub fn process_root() -> anyhow::Result<()> {
    let build = Build::new()?;
    build.process()
}

pub fn process_dir(root_dir: &Path) -> anyhow::Result<()> {
    let build = Build::with_root_dir(root_dir.to_owned())?;
    build.process()
}

/// Compiles every `*.output` report below a directory into a Rust module
/// under `OUT_DIR`, keeping the relative layout.
#[derive(Debug)]
pub struct Build {
    root_dir: PathBuf,
    out_dir: PathBuf,
    config: Config,
}

impl Build {
    pub fn new() -> anyhow::Result<Self> {
        let root_dir = env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .context("The environment variable `CARGO_MANIFEST_DIR' is not set")?;
        Self::with_root_dir(root_dir)
    }

    pub fn with_root_dir(root_dir: PathBuf) -> anyhow::Result<Self> {
        let out_dir = env::var_os("OUT_DIR")
            .map(PathBuf::from)
            .context("The environment variable `OUT_DIR' is not set")?;
        Ok(Self::with_dirs(root_dir, out_dir))
    }

    pub fn with_dirs(root_dir: PathBuf, out_dir: PathBuf) -> Self {
        Self {
            root_dir,
            out_dir,
            config: Config::new(),
        }
    }

    /// Replace the options used to compile each report.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn process(&self) -> anyhow::Result<()> {
        for entry in WalkDir::new(&self.root_dir) {
            let entry = entry.context("from WalkDir entry")?;
            if !entry.file_type().is_file() {
                continue;
            }
            let in_file = entry.path();
            match in_file.extension().and_then(|ext| ext.to_str()) {
                Some("output") => self.process_file(in_file)?,
                _ => continue,
            }
        }

        Ok(())
    }

    fn process_file(&self, in_file: &Path) -> anyhow::Result<()> {
        let mut out_file = self.out_dir.join(in_file.strip_prefix(&self.root_dir)?);
        out_file.set_extension("rs");
        if let Some(out_dir) = out_file.parent() {
            fs::create_dir_all(out_dir)?;
        }

        println!("cargo:rerun-if-changed={}", in_file.display());

        let automaton = self
            .config
            .compile_file(in_file)
            .with_context(|| anyhow::anyhow!("failed to compile {}", in_file.display()))?;
        for diagnostic in &automaton.diagnostics {
            println!("cargo:warning={}: {}", in_file.display(), diagnostic);
        }

        let codegen = Codegen::new(&automaton, Language::Rust)?;
        fs::write(&out_file, codegen.to_string()).with_context(|| {
            anyhow::anyhow!("failed to write generated tables to {}", out_file.display())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_reports_below_root() {
        let root_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let out_dir = env::temp_dir().join(format!("bisontab-build-{}", std::process::id()));

        Build::with_dirs(root_dir, out_dir.clone())
            .process()
            .unwrap();

        let generated = fs::read_to_string(out_dir.join("calc.rs")).unwrap();
        assert!(generated.contains("pub enum Terminal {"));
        assert!(generated.contains("pub static STATES: [BisonState; 10] = ["));

        let _ = fs::remove_dir_all(&out_dir);
    }
}
