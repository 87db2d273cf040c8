use super::Parser;

/// Console chat client for the campus room.
#[derive(Parser, Debug)]
#[command(name = "campus-chat")]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
