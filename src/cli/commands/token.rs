use clap::Subcommand;
use serde_json::json;

use crate::auth::{Role, TokenAuthority};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint an access token for an identity")]
    Issue {
        #[arg(long, help = "Identity id to place in the subject claim")]
        subject: i64,
        #[arg(long, help = "Role claim: admin, agent or user")]
        role: Role,
    },

    #[command(about = "Verify a token and print its subject and role")]
    Verify {
        #[arg(help = "Bearer token")]
        token: String,
    },
}

fn authority() -> anyhow::Result<TokenAuthority> {
    let config = AppConfig::from_env()?;
    Ok(TokenAuthority::new(&config.security.jwt_secret, config.security.jwt_expiry_hours))
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let tokens = authority()?;

    match cmd {
        TokenCommands::Issue { subject, role } => {
            let token = tokens.issue(subject, role)?;
            match output_format {
                OutputFormat::Text => utils::output_value(&output_format, "access_token", &token),
                OutputFormat::Json => utils::output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({
                        "access_token": token,
                        "token_type": "Bearer",
                        "expires_in": tokens.ttl_seconds(),
                    })),
                ),
            }
        }
        TokenCommands::Verify { token } => match tokens.verify(&token) {
            Ok(actor) => utils::output_success(
                &output_format,
                &format!("Token valid for {} #{}", actor.role, actor.subject_id),
                Some(json!({ "subject_id": actor.subject_id, "role": actor.role })),
            ),
            Err(e) => {
                utils::output_error(&output_format, &e.to_string(), Some("INVALID_TOKEN"))?;
                Err(e.into())
            }
        },
    }
}
