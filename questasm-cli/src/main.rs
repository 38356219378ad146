use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use questasm::Build;
use questasm_assembler::AssembleOptions;
use questasm_disassembler::DisassemblyOptions;

#[derive(Parser)]
#[command(name = "questasm", version, about = "Quest script toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Disassemble a compiled quest into source text
    Disassemble {
        /// Target build, e.g. DC_V2, GC_V3, BB_V4
        #[arg(short, long)]
        build: Build,

        /// Override the header language byte
        #[arg(short, long)]
        language: Option<u8>,

        /// Emit output that reassembles to identical bytes
        #[arg(short, long)]
        reassembly: bool,

        /// Prefer qedit mnemonics
        #[arg(short, long)]
        qedit: bool,

        input: PathBuf,

        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Assemble source text into a compiled quest
    Assemble {
        /// Directory searched by .include_bin / .include_native
        #[arg(short, long)]
        include_dir: Option<PathBuf>,

        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report which episode a compiled quest targets
    Episode {
        #[arg(short, long)]
        build: Build,

        input: PathBuf,
    },
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Disassemble {
            build,
            language,
            reassembly,
            qedit,
            input,
            output,
        } => {
            let data = std::fs::read(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let opts = DisassemblyOptions {
                language_override: language,
                reassembly,
                qedit_names: qedit,
                image_decoder: None,
            };
            let listing = questasm_disassembler::disassemble(&data, build, &opts)?;
            match output {
                Some(path) => std::fs::write(&path, listing)
                    .with_context(|| format!("cannot write {}", path.display()))?,
                None => print!("{}", listing),
            }
        }
        Command::Assemble {
            include_dir,
            input,
            output,
        } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let opts = AssembleOptions {
                include_dir: include_dir.as_deref(),
                ..AssembleOptions::default()
            };
            let binary = questasm_assembler::assemble(&source, &opts)?;
            let output = output.unwrap_or_else(|| input.with_extension("bin"));
            std::fs::write(&output, binary)
                .with_context(|| format!("cannot write {}", output.display()))?;
        }
        Command::Episode { build, input } => {
            let data = std::fs::read(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let episode = questasm_disassembler::find_episode(&data, build)?;
            println!("{}", episode);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    questasm::validate_tables();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}
