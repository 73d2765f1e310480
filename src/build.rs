//! The documentation build pipeline.
//!
//! Loads and validates both requirement levels, links them, renders every
//! diagram, generates the pages and writes them to the build directory.
//! Nothing here is fatal: every failure becomes a [`Problem`] in the
//! [`BuildReport`].

use std::{collections::HashSet, path::PathBuf};

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde_yaml::Value;
use tracing::instrument;

use crate::{
    Directory, LinkTable, Problem, RequirementRecord,
    diagram::{FallbackReason, HttpTransport, RenderClient, RenderResult, Transport},
    domain::{DiagramEntry, Level, validate},
    site::{self, Page, Site},
};

/// The validated and linked requirements of a documentation root.
#[derive(Debug, Default, Clone)]
pub struct Checked {
    /// The accepted high-level requirements.
    pub high_level: Vec<RequirementRecord>,
    /// The accepted software requirements.
    pub software: Vec<RequirementRecord>,
    /// Links between the two levels.
    pub links: LinkTable,
    /// Every problem found, in discovery order.
    pub problems: Vec<Problem>,
    high_level_notice: Option<String>,
    software_notice: Option<String>,
}

impl Checked {
    /// The accepted requirements at `level`.
    #[must_use]
    pub fn records(&self, level: Level) -> &[RequirementRecord] {
        match level {
            Level::HighLevel => &self.high_level,
            Level::Software => &self.software,
        }
    }

    /// Why the input for `level` could not be loaded, if it could not.
    #[must_use]
    pub fn notice(&self, level: Level) -> Option<&str> {
        match level {
            Level::HighLevel => self.high_level_notice.as_deref(),
            Level::Software => self.software_notice.as_deref(),
        }
    }
}

/// Loads, validates and links the requirements under `directory`.
#[instrument(level = "debug", skip_all, fields(root = %directory.root().display()))]
pub fn check(directory: &Directory) -> Checked {
    let mut checked = Checked::default();

    let (high_level, notice) = load(directory, Level::HighLevel, &mut checked.problems);
    checked.high_level_notice = notice;
    let validated = validate(
        high_level.as_ref(),
        Level::HighLevel.label(),
        Level::HighLevel.required_fields(),
    );
    checked.high_level = validated.records;
    checked.problems.extend(validated.problems);

    let (software, notice) = load(directory, Level::Software, &mut checked.problems);
    checked.software_notice = notice;
    let validated = validate(
        software.as_ref(),
        Level::Software.label(),
        Level::Software.required_fields(),
    );
    checked.software = validated.records;
    checked.problems.extend(validated.problems);

    checked.links = LinkTable::build(&checked.high_level, &checked.software);
    if !checked.links.dangling().is_empty() {
        let problem = Problem::DanglingReferences {
            ids: checked.links.dangling().to_vec(),
        };
        tracing::error!("{problem}");
        checked.problems.push(problem);
    }

    checked
}

fn load(
    directory: &Directory,
    level: Level,
    problems: &mut Vec<Problem>,
) -> (Option<Value>, Option<String>) {
    match directory.load_records(level) {
        Ok(value) => (Some(value), None),
        Err(error) => {
            let path = error.path();
            let notice = format!(
                "Could not load {}: {error}",
                path.file_name().unwrap_or(path.as_os_str()).to_string_lossy()
            );
            let problem = Problem::Load {
                path: path.to_path_buf(),
                reason: error.to_string(),
            };
            tracing::error!("{problem}");
            problems.push(problem);
            (None, Some(notice))
        }
    }
}

/// How a diagram ended up on its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramState {
    /// The renderer produced an image.
    Rendered,
    /// The diagram is shown as text.
    Fallback(FallbackReason),
    /// The source file could not be read.
    Missing(String),
}

/// The result of publishing one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOutcome {
    /// The page name the diagram was written under.
    pub slug: String,
    /// The page heading.
    pub title: String,
    /// How the diagram was published.
    pub state: DiagramState,
}

/// A summary of a finished build.
#[derive(Debug, Default, Clone)]
pub struct BuildReport {
    /// Every problem found, in discovery order.
    pub problems: Vec<Problem>,
    /// The pages written, in generation order.
    pub pages: Vec<PathBuf>,
    /// One entry per diagram, in configuration order.
    pub diagrams: Vec<DiagramOutcome>,
    /// The number of accepted high-level requirements.
    pub high_level: usize,
    /// The number of accepted software requirements.
    pub software: usize,
    /// Software requirement ids that refine no known high-level id.
    pub dangling: Vec<String>,
}

impl BuildReport {
    /// Whether the build found no problems.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    /// The number of diagrams published as images.
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.diagrams
            .iter()
            .filter(|diagram| diagram.state == DiagramState::Rendered)
            .count()
    }
}

/// A single documentation build.
#[derive(Debug)]
pub struct Build<'a, T = HttpTransport> {
    directory: &'a Directory,
    client: &'a RenderClient<T>,
    generated: DateTime<Utc>,
    progress: ProgressBar,
}

impl<'a, T: Transport> Build<'a, T> {
    /// Prepares a build of `directory`, rendering diagrams with `client`.
    #[must_use]
    pub fn new(directory: &'a Directory, client: &'a RenderClient<T>) -> Self {
        Self {
            directory,
            client,
            generated: Utc::now(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Stamps the pages as generated at `generated` instead of now.
    #[must_use]
    pub fn generated_at(mut self, generated: DateTime<Utc>) -> Self {
        self.generated = generated;
        self
    }

    /// Reports diagram rendering progress on `progress`.
    ///
    /// The bar's length is set to the number of diagrams.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the build.
    #[instrument(level = "debug", skip_all, fields(root = %self.directory.root().display()))]
    pub fn run(&self) -> BuildReport {
        let checked = check(self.directory);
        let config = self.directory.config();
        let site = Site::new(&config.title, self.generated);

        let diagrams = unique_slugs(self.directory.diagrams());
        let rendered = self.render_all(&diagrams);

        let mut pages = vec![site.index(), site.architecture(&diagrams)];
        let mut outcomes = Vec::with_capacity(diagrams.len());
        for (entry, (markup, state)) in diagrams.iter().zip(rendered) {
            pages.push(site.diagram(entry, &markup));
            outcomes.push(DiagramOutcome {
                slug: entry.slug.clone(),
                title: entry.title.clone(),
                state,
            });
        }
        for level in [Level::HighLevel, Level::Software] {
            pages.push(site.requirements(
                level,
                checked.records(level),
                &checked.links,
                checked.notice(level),
            ));
        }

        let mut report = BuildReport {
            high_level: checked.high_level.len(),
            software: checked.software.len(),
            dangling: checked.links.dangling().to_vec(),
            problems: checked.problems,
            diagrams: outcomes,
            pages: Vec::new(),
        };
        self.write_all(&pages, &mut report);

        tracing::info!(
            pages = report.pages.len(),
            problems = report.problems.len(),
            "build finished"
        );
        report
    }

    /// Renders every diagram in parallel, keeping input order.
    fn render_all(&self, diagrams: &[DiagramEntry]) -> Vec<(String, DiagramState)> {
        self.progress.set_length(diagrams.len() as u64);

        let rendered = diagrams
            .par_iter()
            .map(|entry| {
                let result = self.render(entry);
                self.progress.inc(1);
                result
            })
            .collect();

        self.progress.finish_and_clear();
        rendered
    }

    fn render(&self, entry: &DiagramEntry) -> (String, DiagramState) {
        let path = self.directory.diagram_path(entry);
        let source = match self.directory.load_diagram(entry) {
            Ok(source) => source,
            Err(error) => {
                tracing::warn!("Missing or unreadable diagram {}: {error}", path.display());
                return (
                    site::missing_diagram(&path),
                    DiagramState::Missing(error.to_string()),
                );
            }
        };

        if !source.is_well_formed() {
            tracing::warn!("{} should contain @startuml and @enduml", path.display());
        }

        let result = self.client.render(source.text());
        let markup = result.to_markup(&self.directory.config().render.editor);
        let state = match result {
            RenderResult::Rendered { .. } => DiagramState::Rendered,
            RenderResult::Fallback { reason, .. } => DiagramState::Fallback(reason),
        };
        (markup, state)
    }

    fn write_all(&self, pages: &[Page], report: &mut BuildReport) {
        for page in pages {
            let file_name = page.file_name();
            match self.directory.write_page(&file_name, &page.html) {
                Ok(path) => report.pages.push(path),
                Err(error) => {
                    let problem = Problem::Write {
                        path: self.directory.build_dir().join(&file_name),
                        reason: error.to_string(),
                    };
                    tracing::error!("{problem}");
                    report.problems.push(problem);
                }
            }
        }
    }
}

/// Renames diagrams whose slug collides with a fixed page or an earlier
/// diagram.
fn unique_slugs(diagrams: Vec<DiagramEntry>) -> Vec<DiagramEntry> {
    let mut taken = HashSet::new();

    diagrams
        .into_iter()
        .map(|mut entry| {
            let base = if site::is_reserved(&entry.slug) || entry.slug.is_empty() {
                format!("diagram-{}", entry.slug)
            } else {
                entry.slug.clone()
            };

            let mut slug = base.clone();
            let mut n = 2;
            while !taken.insert(slug.clone()) {
                slug = format!("{base}-{n}");
                n += 1;
            }

            if slug != entry.slug {
                tracing::warn!(
                    "diagram {} renamed from '{}' to '{slug}'",
                    entry.file.display(),
                    entry.slug
                );
                entry.slug = slug;
            }
            entry
        })
        .collect()
}
