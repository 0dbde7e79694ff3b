use clap::Parser;

mod commands;
mod logging;

use commands::Commands;

#[derive(Parser)]
#[command(name = "nickel-bridge")]
#[command(about = "Evaluate Nickel configuration into typed values", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Parse command-line arguments
    let cli = Cli::parse();

    logging::init()?;

    cli.command.execute()
}
