use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use hlc::hlb::dump::render_module;
use hlc::hlb::validate::validate_module;
use hlc::interp::{interp, Natives, Value};
use hlc::Module;

#[derive(Parser)]
#[command(name = "hlc", about = "Run or inspect HLB bytecode modules")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Validate a module and execute its entrypoint.
    Run { file: PathBuf },
    /// Validate a module and print its disassembly.
    Dump { file: PathBuf },
}

/// The handlers every host gets for free. Real embedders inject their
/// own loader through the library instead.
fn builtin_natives() -> Natives {
    let mut n = Natives::new();
    n.register("std@log", |args| {
        let line = args
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{line}");
        Value::Null
    });
    n
}

fn load(file: &PathBuf) -> anyhow::Result<Module> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    Ok(Module::from_bytes(&bytes)?)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.cmd {
        Cmd::Run { file } => {
            let m = load(&file)?;
            let v = interp(&m, &builtin_natives())?;
            println!("{v}");
        }
        Cmd::Dump { file } => {
            let m = load(&file)?;
            // The disassembly is for inspecting broken modules too, so a
            // validation failure is reported but never gates the output.
            print!("{}", render_module(&m));
            if let Err(e) = validate_module(&m) {
                eprintln!("warning: {e}");
            }
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
