use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "tokenward", about = "Session token issuance and rotation service")]
pub struct Cli {
    /// Path to a settings file; defaults depend on the build profile.
    #[arg(long)]
    pub settings: Option<String>,

    /// Load and validate settings, then exit without serving.
    #[arg(long)]
    pub check_config: bool,
}
