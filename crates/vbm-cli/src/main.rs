use std::error::Error;
use std::io;

use clap::{Parser, Subcommand};
use commands::{
    demo::{self, DemoArgs},
    describe::{self, DescribeArgs},
    grid::{self, GridArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "vbm", about = "Panel regression grid pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate the analysis grid and write it as canonical JSON.
    Grid(GridArgs),
    /// Run a grid against the panel dataset and persist the results.
    Run(RunArgs),
    /// Run a grid against the built-in synthetic panel.
    Demo(DemoArgs),
    /// Print the search description for one configuration.
    Describe(DescribeArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Grid(args) => grid::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Demo(args) => demo::run(&args),
        Command::Describe(args) => describe::run(&args),
    }
}
