use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "passport", about = "Session token service")]
pub struct Cli {
    /// Settings file; defaults to settings/dev.toml or settings/release.toml.
    #[arg(long)]
    pub settings: Option<String>,

    /// Overrides `http.address` from the settings file.
    #[arg(long)]
    pub address: Option<String>,
}
