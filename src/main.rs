use clap::Parser;

use querybridge::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    querybridge::cli::run(cli)
}
