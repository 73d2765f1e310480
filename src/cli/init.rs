use std::{fs, path::Path};

use anyhow::Context;
use reqdocs::{Config, Directory, Level};
use tracing::instrument;

const HIGH_LEVEL: &str = "\
- id: HL-1
  name: Example high-level requirement
  status: draft
  description: >
    Describe what the system as a whole must achieve.
";

const SOFTWARE: &str = "\
- id: SW-1
  name: Example software requirement
  status: draft
  refines: HL-1
  description: >
    Describe how the software contributes to HL-1.
";

const DIAGRAM: &str = "\
@startuml
actor User
User -> System : request
System --> User : response
@enduml
";

pub struct Init;

impl Init {
    #[instrument]
    pub fn run(root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(Config::FILE_NAME);
        if config_path.exists() {
            anyhow::bail!(
                "Documentation already initialized (found existing {})",
                Config::FILE_NAME
            );
        }

        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create {}", root.display()))?;
        Config::default()
            .save(&config_path)
            .with_context(|| format!("Failed to create {}", Config::FILE_NAME))?;

        let directory = Directory::open(root.to_path_buf())?;
        let mut created = vec![config_path];

        let mut skeletons = vec![
            (directory.records_path(Level::HighLevel), HIGH_LEVEL),
            (directory.records_path(Level::Software), SOFTWARE),
        ];
        for entry in directory.diagrams() {
            skeletons.push((directory.diagram_path(&entry), DIAGRAM));
        }

        for (path, content) in skeletons {
            if path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, content)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            created.push(path);
        }

        println!("Initialized documentation in {}", root.display());
        for path in &created {
            let path = path.strip_prefix(root).unwrap_or(path);
            println!("  Created: {}", path.display());
        }
        println!();
        println!("Next steps:");
        println!("  reqdocs build");

        Ok(())
    }
}
