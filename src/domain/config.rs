use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Configuration for a documentation build.
///
/// Loaded from `docs.toml` in the documentation root. Every setting has a
/// default, so the file is optional. Paths are relative to the documentation
/// root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The site title shown in the page header.
    pub title: String,

    /// The YAML file holding the high-level requirements.
    pub high_level: PathBuf,

    /// The YAML file holding the software requirements.
    pub software: PathBuf,

    /// The directory containing the PlantUML diagram sources.
    pub architecture: PathBuf,

    /// The diagrams to publish.
    ///
    /// If this is empty, every `.puml` file under [`Config::architecture`] is
    /// published, with a title derived from its file name.
    pub diagrams: Vec<DiagramEntry>,

    /// The directory the HTML pages are written to.
    pub build_dir: PathBuf,

    /// Settings for the remote diagram renderer.
    pub render: RenderConfig,
}

/// One diagram page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEntry {
    /// The diagram source file, relative to the architecture directory.
    pub file: PathBuf,
    /// The page heading.
    pub title: String,
    /// The page name; the diagram is written to `<slug>.html`.
    pub slug: String,
    /// A one-line summary shown on the architecture page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl DiagramEntry {
    /// Builds an entry for a discovered diagram file.
    ///
    /// The slug is the file stem without a trailing `_diagram`, and the title
    /// is the file stem in title case. `runtime_diagram.puml` becomes
    /// `runtime` / `Runtime Diagram`.
    #[must_use]
    pub fn from_file(file: PathBuf) -> Self {
        let stem = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let slug = stem
            .strip_suffix("_diagram")
            .filter(|s| !s.is_empty())
            .unwrap_or(&stem)
            .to_string();

        let title = stem
            .split(['_', '-', ' '])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            file,
            title,
            slug,
            summary: None,
        }
    }
}

/// Settings for the remote PlantUML renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Base URL the encoded diagram is appended to.
    #[serde(default = "default_server")]
    pub server: String,

    /// The interactive editor suggested when rendering fails.
    #[serde(default = "default_editor")]
    pub editor: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to contact the renderer at all.
    ///
    /// When `false`, every diagram is published as text.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RenderConfig {
    /// The request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            editor: default_editor(),
            timeout_secs: default_timeout_secs(),
            enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            high_level: default_high_level(),
            software: default_software(),
            architecture: default_architecture(),
            diagrams: default_diagrams(),
            build_dir: default_build_dir(),
            render: RenderConfig::default(),
        }
    }
}

/// Errors that can occur when loading or saving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file {}", .path.display())]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for this configuration.
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: toml::de::Error,
    },
    /// The configuration could not be serialized.
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// The name of the configuration file in the documentation root.
    pub const FILE_NAME: &'static str = "docs.toml";

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn default_title() -> String {
    "Project Documentation".to_string()
}

fn default_high_level() -> PathBuf {
    PathBuf::from("requirements/high_level_requirements.yaml")
}

fn default_software() -> PathBuf {
    PathBuf::from("requirements/software_requirements.yaml")
}

fn default_architecture() -> PathBuf {
    PathBuf::from("architecture")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_diagrams() -> Vec<DiagramEntry> {
    [
        ("runtime_diagram.puml", "Runtime Diagram", "runtime", "Sequence of runtime interactions."),
        ("class_diagram.puml", "Class Diagram", "class", "Class structure and relationships."),
        ("block_diagram.puml", "Block Diagram", "block", "High-level blocks and data flows."),
    ]
    .into_iter()
    .map(|(file, title, slug, summary)| DiagramEntry {
        file: PathBuf::from(file),
        title: title.to_string(),
        slug: slug.to_string(),
        summary: Some(summary.to_string()),
    })
    .collect()
}

fn default_server() -> String {
    "https://www.plantuml.com/plantuml/svg/".to_string()
}

fn default_editor() -> String {
    "https://www.plantuml.com/plantuml/uml".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_title")]
        title: String,

        #[serde(default = "default_high_level")]
        high_level: PathBuf,

        #[serde(default = "default_software")]
        software: PathBuf,

        #[serde(default = "default_architecture")]
        architecture: PathBuf,

        #[serde(default = "default_build_dir")]
        build_dir: PathBuf,

        /// An explicit empty list means "discover".
        #[serde(default = "default_diagrams")]
        diagrams: Vec<DiagramEntry>,

        #[serde(default)]
        render: RenderConfig,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                title,
                high_level,
                software,
                architecture,
                build_dir,
                diagrams,
                render,
            } => Self {
                title,
                high_level,
                software,
                architecture,
                diagrams,
                build_dir,
                render,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            title: config.title,
            high_level: config.high_level,
            software: config.software,
            architecture: config.architecture,
            build_dir: config.build_dir,
            diagrams: config.diagrams,
            render: config.render,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"_version = "1"
title = "Rover"
build_dir = "site"
diagrams = []

[render]
server = "http://localhost:8080/svg/"
timeout_secs = 3
enabled = false
"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.title, "Rover");
        assert_eq!(config.build_dir, PathBuf::from("site"));
        assert!(config.diagrams.is_empty());
        assert_eq!(config.render.server, "http://localhost:8080/svg/");
        assert_eq!(config.render.editor, default_editor());
        assert_eq!(config.render.timeout(), Duration::from_secs(3));
        assert!(!config.render.enabled);
        assert_eq!(config.high_level, default_high_level());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\n[render]\ntimeout_secs = \"ten\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(Config::FILE_NAME);

        let mut config = Config::default();
        config.render.enabled = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn discovered_diagram_names() {
        let entry = DiagramEntry::from_file(PathBuf::from("runtime_diagram.puml"));
        assert_eq!(entry.slug, "runtime");
        assert_eq!(entry.title, "Runtime Diagram");

        let entry = DiagramEntry::from_file(PathBuf::from("sub/data-flow.puml"));
        assert_eq!(entry.slug, "data-flow");
        assert_eq!(entry.title, "Data Flow");
    }
}
