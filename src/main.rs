use clap::Parser;
use fxgrid::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
