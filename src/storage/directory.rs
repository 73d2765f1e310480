//! A filesystem backed documentation source
//!
//! The [`Directory`] reads requirement YAML and diagram sources from a
//! documentation root, and writes the generated pages to its build
//! directory.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use serde_yaml::Value;
use tracing::instrument;
use walkdir::WalkDir;

use crate::{
    diagram::DiagramSource,
    domain::{Config, ConfigError, DiagramEntry, Level},
};

/// A documentation root on disk.
#[derive(Debug, Clone)]
pub struct Directory {
    /// The root of the documentation sources.
    root: PathBuf,
    config: Config,
}

impl Directory {
    /// Opens the documentation root at `root`.
    ///
    /// The configuration is read from `docs.toml` in the root. If there is
    /// no such file, the default configuration is used.
    ///
    /// # Errors
    ///
    /// Returns an error if `docs.toml` exists but cannot be read or parsed.
    pub fn open(root: PathBuf) -> Result<Self, ConfigError> {
        let config = load_config(&root)?;
        Ok(Self::with_config(root, config))
    }

    /// Uses `root` with an explicit configuration.
    #[must_use]
    pub const fn with_config(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }

    /// The documentation root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration, for command-line overrides.
    pub const fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The path of the requirements file for `level`.
    #[must_use]
    pub fn records_path(&self, level: Level) -> PathBuf {
        match level {
            Level::HighLevel => self.root.join(&self.config.high_level),
            Level::Software => self.root.join(&self.config.software),
        }
    }

    /// Reads and parses the requirements file for `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid YAML,
    /// or empty.
    #[instrument(level = "debug", skip(self))]
    pub fn load_records(&self, level: Level) -> Result<Value, LoadError> {
        let path = self.records_path(level);
        let content = read(&path)?;

        match serde_yaml::from_str(&content) {
            Ok(Value::Null) => Err(LoadError::Empty(path)),
            Ok(value) => Ok(value),
            Err(source) => Err(LoadError::Yaml { path, source }),
        }
    }

    /// The diagrams to publish.
    ///
    /// These are the configured diagrams or, if none are configured, every
    /// `.puml` file under the architecture directory, sorted by path.
    #[must_use]
    pub fn diagrams(&self) -> Vec<DiagramEntry> {
        if self.config.diagrams.is_empty() {
            discover_diagrams(&self.architecture_dir())
        } else {
            self.config.diagrams.clone()
        }
    }

    /// The path of a diagram's source file.
    #[must_use]
    pub fn diagram_path(&self, entry: &DiagramEntry) -> PathBuf {
        self.architecture_dir().join(&entry.file)
    }

    /// Reads the source of a diagram.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable.
    #[instrument(level = "debug", skip(self), fields(file = %entry.file.display()))]
    pub fn load_diagram(&self, entry: &DiagramEntry) -> Result<DiagramSource, LoadError> {
        read(&self.diagram_path(entry)).map(DiagramSource::new)
    }

    /// The directory pages are written to.
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.config.build_dir)
    }

    /// Writes a page into the build directory, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_page(&self, file_name: &str, html: &str) -> io::Result<PathBuf> {
        let build_dir = self.build_dir();
        fs::create_dir_all(&build_dir)?;

        let path = build_dir.join(file_name);
        fs::write(&path, html)?;
        tracing::debug!("wrote {}", path.display());
        Ok(path)
    }

    fn architecture_dir(&self) -> PathBuf {
        self.root.join(&self.config.architecture)
    }
}

fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let path = root.join(Config::FILE_NAME);
    if !path.exists() {
        tracing::debug!("No {} in {}, using defaults", Config::FILE_NAME, root.display());
        return Ok(Config::default());
    }
    Config::load(&path)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn discover_diagrams(dir: &Path) -> Vec<DiagramEntry> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("puml")))
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .ok()
                .map(|relative| DiagramEntry::from_file(relative.to_path_buf()))
        })
        .collect()
}

/// Errors that can occur when loading documentation sources.
///
/// The messages do not repeat the path; use [`LoadError::path`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("file not found")]
    NotFound(PathBuf),
    /// The file could not be read.
    #[error("{source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The file is not valid YAML.
    #[error("invalid YAML: {source}")]
    Yaml {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: serde_yaml::Error,
    },
    /// The file has no content.
    #[error("file is empty")]
    Empty(PathBuf),
}

impl LoadError {
    /// The file that failed to load.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::Empty(path) => path,
            Self::Io { path, .. } | Self::Yaml { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(directory.config(), &Config::default());
    }

    #[test]
    fn config_is_read_from_root() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs.toml", "_version = \"1\"\ntitle = \"Rover\"\n");

        let directory = Directory::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(directory.config().title, "Rover");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs.toml", "_version = \"1\"\ntitle = [\n");

        assert!(Directory::open(tmp.path().to_path_buf()).is_err());
    }

    #[test]
    fn records_are_parsed() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "requirements/high_level_requirements.yaml",
            "- id: HL-1\n  name: Login\n",
        );

        let directory = Directory::with_config(tmp.path().to_path_buf(), Config::default());
        let value = directory.load_records(Level::HighLevel).unwrap();
        assert!(value.is_sequence());
    }

    #[test]
    fn missing_records_file() {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::with_config(tmp.path().to_path_buf(), Config::default());

        let error = directory.load_records(Level::Software).unwrap_err();
        assert!(matches!(error, LoadError::NotFound(_)));
        assert_eq!(error.path(), directory.records_path(Level::Software));
    }

    #[test]
    fn empty_records_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "requirements/software_requirements.yaml", "");
        let directory = Directory::with_config(tmp.path().to_path_buf(), Config::default());

        assert!(matches!(
            directory.load_records(Level::Software),
            Err(LoadError::Empty(_))
        ));
    }

    #[test]
    fn invalid_yaml_records_file() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "requirements/software_requirements.yaml",
            "- id: [unclosed\n",
        );
        let directory = Directory::with_config(tmp.path().to_path_buf(), Config::default());

        assert!(matches!(
            directory.load_records(Level::Software),
            Err(LoadError::Yaml { .. })
        ));
    }

    #[test]
    fn configured_diagrams_are_used() {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::with_config(tmp.path().to_path_buf(), Config::default());

        let slugs: Vec<_> = directory.diagrams().into_iter().map(|d| d.slug).collect();
        assert_eq!(slugs, vec!["runtime", "class", "block"]);
    }

    #[test]
    fn diagrams_are_discovered_when_none_configured() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "architecture/sequence.puml", "@startuml\n@enduml\n");
        write(tmp.path(), "architecture/a_diagram.puml", "@startuml\n@enduml\n");
        write(tmp.path(), "architecture/notes.txt", "not a diagram");

        let config = Config {
            diagrams: Vec::new(),
            ..Config::default()
        };
        let directory = Directory::with_config(tmp.path().to_path_buf(), config);

        let diagrams = directory.diagrams();
        let slugs: Vec<_> = diagrams.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "sequence"]);

        let source = directory.load_diagram(&diagrams[1]).unwrap();
        assert!(source.is_well_formed());
    }

    #[test]
    fn pages_are_written_to_build_dir() {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::with_config(tmp.path().to_path_buf(), Config::default());

        let path = directory.write_page("index.html", "<html></html>").unwrap();

        assert_eq!(path, tmp.path().join("build/index.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
