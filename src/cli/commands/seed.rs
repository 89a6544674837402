use anyhow::bail;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::{self, seed};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    if config.database.url.is_none() {
        bail!("DATABASE_URL is not set; seeding the in-memory store would be lost on exit");
    }

    let store = database::connect(&config).await?;
    let summary = seed::seed(store.as_ref()).await?;

    utils::output_success(
        &output_format,
        &format!(
            "Seeded {} identities, {} property types and {} properties",
            summary.identities, summary.property_types, summary.properties
        ),
        Some(serde_json::to_value(&summary)?),
    )
}
