use clap::Subcommand;

use crate::auth::password::hash_password;
use crate::cli::{utils, OutputFormat};

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Print an Argon2id PHC hash for a plaintext password")]
    Hash {
        #[arg(help = "Plaintext password")]
        plaintext: String,
    },
}

pub async fn handle(cmd: PasswordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PasswordCommands::Hash { plaintext } => {
            let hash = hash_password(&plaintext)?;
            utils::output_value(&output_format, "password_hash", &hash)
        }
    }
}
