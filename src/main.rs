//! tilegemm CLI
//!
//! - `run` - time the tiled multiply and validate it against a fixture
//! - `generate` - write a fixture with random A, B and their product

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tilegemm::{
    bench::run_benchmark,
    config::{BenchConfig, GenerateArgs, RunArgs},
    error::Result,
    fixture::generate_fixture,
};

/// Single-socket f32 GEMM micro-benchmark
#[derive(Parser)]
#[command(name = "tilegemm")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time C = A x B and check C against the fixture
    ///
    /// Examples:
    ///   tilegemm run
    ///   tilegemm run -n 1024 -t 8 --warmup 2
    ///   tilegemm run --synthetic -t 4
    Run(RunArgs),
    /// Write a fixture file for `run`
    Generate(GenerateArgs),
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_benchmark(BenchConfig::from(args), &mut out)?;
            out.flush()?;
        }
        Commands::Generate(args) => {
            log::info!(
                "generating N = {} fixture at {}",
                args.size,
                args.fixture.display()
            );
            generate_fixture(&args.fixture, args.size, args.seed)?;
            println!("wrote {}", args.fixture.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
