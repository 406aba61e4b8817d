use std::{
    io::Read as _,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use numlower_core::{compile, CompileOptions, NodeId, Tree};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// numlower: lowers a Src vector/matrix program into flat Dst decimal
/// assignments.
///
/// The surface grammar is out of scope for this binary (§6.1): input is the
/// JSON-serialized `SrcTree` that a parser front-end would otherwise hand to
/// the core, either as a file (`-i`) or on stdin.
#[derive(Parser, Debug)]
#[command(name = "numlower", version, about, long_about = None)]
struct Cli {
    /// Input file holding a JSON-serialized SrcTree. Reads stdin if omitted.
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Output file. Writes stdout if omitted.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Dump the optimized Dst tree as an indented s-expression instead of
    /// surface text.
    #[arg(long, conflicts_with = "cylon")]
    ast: bool,

    /// Dump the optimized Dst tree as the `--cylon` JSON AST instead of
    /// surface text.
    #[arg(long, conflicts_with = "ast")]
    cylon: bool,

    /// Skip the C10 constant-fold / identity-reduce pass.
    #[arg(long)]
    no_reduce: bool,

    /// Skip the C11 dead-code elimination pass.
    #[arg(long)]
    no_elim: bool,

    /// Skip the C12 identifier-mangling pass.
    #[arg(long)]
    no_mangle: bool,

    /// Directory `using` statements resolve library names against. Defaults
    /// to the input file's parent directory, or the current directory when
    /// reading from stdin.
    #[arg(long)]
    lib_root: Option<PathBuf>,

    /// Increase log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The JSON document a caller hands `-i`/stdin: a `SrcTree` plus the root
/// `SrcProgram` node to compile.
#[derive(Deserialize)]
struct SrcDocument {
    tree: Tree,
    root: NodeId,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let input_text = match &cli.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let doc: SrcDocument = serde_json::from_str(&input_text)?;
    let mut src = doc.tree;

    let lib_root = cli
        .lib_root
        .clone()
        .or_else(|| cli.input.as_ref().and_then(|p| p.parent().map(Path::to_path_buf)))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut options = CompileOptions::new(lib_root);
    options.no_reduce = cli.no_reduce;
    options.no_elim = cli.no_elim;
    options.no_mangle = cli.no_mangle;

    let compiled = compile(&mut src, doc.root, &options)?;

    let output_text = if cli.cylon {
        serde_json::to_string_pretty(&numlower_core::json::to_cylon(&compiled.dst, compiled.program))?
    } else if cli.ast {
        numlower_core::format::format_ast(&compiled.dst, compiled.program)
    } else {
        numlower_core::format::format_program(&compiled.dst, compiled.program)
    };

    match &cli.output {
        Some(path) => std::fs::write(path, output_text)?,
        None => print!("{output_text}"),
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
