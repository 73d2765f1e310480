use std::{path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use reqdocs::{Checked, Directory, Level};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Validate and cross-link the requirements without writing pages")]
pub struct Validate {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root.clone())
            .with_context(|| format!("failed to open {}", root.display()))?;

        let checked = reqdocs::check(&directory);

        match self.output {
            OutputFormat::Table => self.output_table(&checked),
            OutputFormat::Json => Self::output_json(&checked)?,
            OutputFormat::Summary => self.output_summary(&checked),
        }

        if !checked.problems.is_empty() {
            process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, checked: &Checked) {
        if self.quiet {
            return;
        }

        println!("Validating requirements...\n");

        for level in [Level::HighLevel, Level::Software] {
            let label = format!("{}:", level.label());
            match checked.notice(level) {
                Some(notice) => println!("{}", format!("✗ {label:<12}{notice}").warning()),
                None => println!(
                    "✓ {label:<12}{} requirements accepted",
                    checked.records(level).len()
                ),
            }
        }

        let dangling = checked.links.dangling();
        if dangling.is_empty() {
            println!("✓ Links:      every software requirement refines a known parent");
        } else {
            println!(
                "{}",
                format!("✗ Links:      {} dangling references", dangling.len()).warning()
            );
        }

        if checked.problems.is_empty() {
            println!("\n{}", "Requirements are valid (0 problems)".success());
        } else {
            println!(
                "\n{}",
                format!("Summary: {} problems found", checked.problems.len()).warning()
            );
            for problem in &checked.problems {
                println!("  - {problem}");
            }
        }
    }

    fn output_json(checked: &Checked) -> anyhow::Result<()> {
        use serde_json::json;

        let problems: Vec<_> = checked.problems.iter().map(ToString::to_string).collect();

        let output = json!({
            "high_level": checked.high_level.len(),
            "software": checked.software.len(),
            "dangling": checked.links.dangling(),
            "problems": problems,
            "valid": checked.problems.is_empty(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(&self, checked: &Checked) {
        if self.quiet {
            return;
        }

        let line = format!(
            "{} high-level, {} software, {} dangling, {} problems",
            checked.high_level.len(),
            checked.software.len(),
            checked.links.dangling().len(),
            checked.problems.len()
        );

        if checked.problems.is_empty() {
            println!("{}", line.success());
        } else {
            println!("{}", line.warning());
        }
    }
}
