use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::{utils, OutputFormat};

#[derive(Subcommand)]
pub enum RemoteCommands {
    #[command(about = "Check server health via the /health endpoint")]
    Health {
        #[arg(long, env = "AGS_URL", default_value = "http://localhost:5555", help = "Server base URL")]
        url: String,
    },

    #[command(about = "Log in and print the issued access token")]
    Login {
        #[arg(long, env = "AGS_URL", default_value = "http://localhost:5555", help = "Server base URL")]
        url: String,
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, env = "AGS_PASSWORD", help = "Account password")]
        password: String,
    },
}

pub async fn handle(cmd: RemoteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    match cmd {
        RemoteCommands::Health { url } => {
            let response = client
                .get(utils::endpoint(&url, "/health"))
                .send()
                .await
                .with_context(|| format!("failed to reach {url}"))?;
            let status = response.status();
            let body: Value = response.json().await?;

            if status.is_success() {
                utils::output_success(&output_format, &format!("{url} is healthy"), Some(body))
            } else {
                utils::output_error(&output_format, &format!("{url} reported {status}"), Some("UNHEALTHY"))?;
                Err(anyhow!("server unhealthy: {status}"))
            }
        }
        RemoteCommands::Login { url, email, password } => {
            let response = client
                .post(utils::endpoint(&url, "/auth/login"))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await
                .with_context(|| format!("failed to reach {url}"))?;
            let status = response.status();
            let body: Value = response.json().await?;

            if !status.is_success() {
                let message = body["message"].as_str().unwrap_or("login failed").to_string();
                utils::output_error(&output_format, &message, body["code"].as_str())?;
                return Err(anyhow!(message));
            }

            let token = body["data"]["access_token"]
                .as_str()
                .ok_or_else(|| anyhow!("login response carried no access_token"))?;
            match output_format {
                OutputFormat::Text => utils::output_value(&output_format, "access_token", token),
                OutputFormat::Json => utils::output_success(&output_format, "Logged in", Some(body["data"].clone())),
            }
        }
    }
}
