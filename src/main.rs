use barlab::cli::{init_logging, run, Cli};
use clap::Parser;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
