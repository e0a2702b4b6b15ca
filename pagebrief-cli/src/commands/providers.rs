//! Provider listing.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use pagebrief_models::auth::CredentialStore;
use pagebrief_models::http::ReqwestTransport;
use pagebrief_models::{ProviderCapabilities, ProviderRegistry};

use super::auth::source_label;
use super::credential_store;
use crate::config::{ConfigLoader, PagebriefConfig};

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Print capabilities as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ProvidersArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let providers = registry(&config).providers();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    println!("{}", render_table(&providers, &config, &credential_store()));
    Ok(())
}

/// Registry over the built-in providers with configured overrides.
pub fn registry(config: &PagebriefConfig) -> ProviderRegistry {
    ProviderRegistry::builtin(Arc::new(ReqwestTransport::new()), &config.providers)
}

fn render_table(
    providers: &[ProviderCapabilities],
    config: &PagebriefConfig,
    store: &CredentialStore,
) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Provider").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Images").fg(Color::Cyan),
        Cell::new("API key").fg(Color::Cyan),
    ]);

    for provider in providers {
        let id = if provider.id == config.default_provider {
            format!("{} *", provider.id)
        } else {
            provider.id.clone()
        };
        let images = provider
            .attachment
            .map_or_else(|| "-".to_string(), |mode| mode.to_string());
        let key = match store.credential_source(&provider.id) {
            None => "missing",
            source => source_label(source),
        };

        table.add_row(vec![
            Cell::new(id),
            Cell::new(&provider.name),
            Cell::new(images),
            Cell::new(key),
        ]);
    }

    table
}
