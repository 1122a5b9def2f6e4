use super::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "inkpost blog API server")]
pub struct Cli {
    /// Path to a settings TOML file
    #[arg(long)]
    pub settings: Option<String>,
}
