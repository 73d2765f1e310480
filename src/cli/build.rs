use std::{path::PathBuf, process, time::Duration};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqdocs::{BuildReport, DiagramState, Directory, RenderClient};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, Parser)]
#[command(about = "Build the HTML documentation")]
pub struct Build {
    /// Exit with status 2 if any problems were found
    #[arg(long)]
    strict: bool,

    /// Do not contact the renderer; publish every diagram as text
    #[arg(long)]
    offline: bool,

    /// Write pages to this directory instead of the configured one
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Renderer request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl Build {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::open(root.clone())
            .with_context(|| format!("failed to open {}", root.display()))?;

        let config = directory.config_mut();
        if let Some(output) = self.output {
            config.build_dir = output;
        }
        if let Some(timeout) = self.timeout {
            config.render.timeout_secs = timeout;
        }
        if self.offline {
            config.render.enabled = false;
        }

        let client = RenderClient::from_config(&directory.config().render)
            .context("failed to create the HTTP client")?;

        let report = reqdocs::Build::new(&directory, &client)
            .with_progress(progress_bar())
            .run();

        print_report(&report, &directory);

        if self.strict && !report.is_clean() {
            process::exit(2);
        }

        Ok(())
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} Rendering diagrams [{bar:30}] {pos}/{len}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn print_report(report: &BuildReport, directory: &Directory) {
    println!(
        "Built {} pages in {}",
        report.pages.len(),
        directory.build_dir().display().to_string().dim()
    );
    println!("  High-level requirements: {}", report.high_level);
    println!("  Software requirements:   {}", report.software);
    println!(
        "  Diagrams rendered:       {}/{}",
        report.rendered(),
        report.diagrams.len()
    );

    for diagram in &report.diagrams {
        match &diagram.state {
            DiagramState::Rendered => {}
            DiagramState::Fallback(reason) => println!(
                "{}",
                format!("    {} shown as text ({reason})", diagram.slug).dim()
            ),
            DiagramState::Missing(reason) => println!(
                "{}",
                format!("    {} source missing ({reason})", diagram.slug).warning()
            ),
        }
    }

    if report.is_clean() {
        println!("\n{}", "✓ No problems found".success());
    } else {
        println!(
            "\n{}",
            format!("✗ {} problems found:", report.problems.len()).warning()
        );
        for problem in &report.problems {
            println!("  - {problem}");
        }
    }
}
