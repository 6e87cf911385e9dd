//! `localcode models`: show what the backend serves.

use localcode_core::ChatBackend;
use localcode_proxy::select_free_model;

use crate::bootstrap::build_client;
use crate::config::Config;

pub async fn execute(config: &Config) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let models = client.list_models().await?;

    println!("Models at {}:", config.backend_url);
    for id in &models {
        println!("  {id}");
    }

    let selected = select_free_model(&models, &config.backend_url)?;
    println!();
    println!("Auto-selected model: {selected}");
    Ok(())
}
