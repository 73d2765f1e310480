use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use reqdocs::{Directory, RenderClient, diagram};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Print the render token of a PlantUML file")]
pub struct Encode {
    /// The PlantUML file to encode
    #[arg(required_unless_present = "decode", conflicts_with = "decode")]
    file: Option<PathBuf>,

    /// Print the full render URL instead of the bare token
    #[arg(long, conflicts_with = "decode")]
    url: bool,

    /// Decode a token back into PlantUML source
    #[arg(long, value_name = "TOKEN")]
    decode: Option<String>,
}

impl Encode {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        if let Some(token) = self.decode {
            let source = diagram::decode(&token).context("invalid token")?;
            print!("{source}");
            return Ok(());
        }

        let Some(file) = self.file else {
            anyhow::bail!("no file given");
        };
        let source = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        if self.url {
            let directory = Directory::open(root.clone())
                .with_context(|| format!("failed to open {}", root.display()))?;
            let client = RenderClient::from_config(&directory.config().render)
                .context("failed to create the HTTP client")?;
            println!("{}", client.url(&source));
        } else {
            println!("{}", diagram::encode(&source));
        }

        Ok(())
    }
}
