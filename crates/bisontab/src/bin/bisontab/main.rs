use anyhow::Context as _;
use bisontab::{
    codegen::{Codegen, Language},
    Config, Strictness,
};
use clap::{Parser, ValueEnum};
use std::{
    fs,
    io::{self, Write as _},
    path::PathBuf,
    time::Instant,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The language of the generated tables.
    #[arg(long, value_enum, default_value_t = Lang::Cpp)]
    lang: Lang,

    /// Keep the actions bison discarded and let the last entry for a
    /// lookahead win.
    #[arg(long)]
    legacy: bool,

    /// Specify the path of the generated file. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The path of the report written by `bison -v`.
    input: PathBuf,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum Lang {
    Cpp,
    Rust,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    process_file(&args)
        .with_context(|| anyhow::anyhow!("errored during processing {}", args.input.display()))?;

    Ok(())
}

fn process_file(args: &Args) -> anyhow::Result<()> {
    let strictness = if args.legacy {
        Strictness::Legacy
    } else {
        Strictness::Strict
    };
    let language = match args.lang {
        Lang::Cpp => Language::Cpp,
        Lang::Rust => Language::Rust,
    };

    let s = Instant::now();
    let automaton = Config::new()
        .strictness(strictness)
        .compile_file(&args.input)?;
    tracing::info!("compile_file: {:?} elapsed", s.elapsed());

    for diagnostic in &automaton.diagnostics {
        eprintln!("[warning] {}", diagnostic);
    }

    let generated = Codegen::new(&automaton, language)?.to_string();

    let Some(out_file) = &args.output else {
        io::stdout()
            .lock()
            .write_all(generated.as_bytes())
            .context("failed to write generated tables to stdout")?;
        return Ok(());
    };

    // dump results.
    if out_file.exists() {
        let mut backup_file = out_file.clone().into_os_string();
        backup_file.push(".bak");
        let backup_file = PathBuf::from(backup_file);
        fs::copy(out_file, &backup_file).with_context(|| {
            anyhow::anyhow!(
                "failed to backup the output file to {}",
                backup_file.display()
            )
        })?;
    }
    fs::write(out_file, generated).with_context(|| {
        anyhow::anyhow!("failed to write generated tables to {}", out_file.display())
    })?;

    Ok(())
}
