//! `reqdocs` builds cross-linked HTML documentation from requirement YAML
//! files and PlantUML diagrams.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
