//! API key management commands.

use anyhow::{Result, bail};
use clap::Args;
use dialoguer::{Password, theme::ColorfulTheme};
use pagebrief_models::auth::{CredentialSource, env_var_for_provider};

use super::credential_store;

/// Auth arguments.
#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Provider to configure (openai, gemini, deepseek)
    pub provider: Option<String>,

    /// List providers with a configured key
    #[arg(long)]
    pub list: bool,

    /// Delete the stored key
    #[arg(long)]
    pub delete: bool,
}

pub fn run(args: AuthArgs) -> Result<()> {
    let store = credential_store();

    // List configured providers
    if args.list {
        let providers = store.list_providers();
        if providers.is_empty() {
            println!("No API keys configured.");
            println!();
            println!("Configure a key with: pagebrief auth <provider>");
        } else {
            println!("Configured providers:");
            println!();
            for provider in providers {
                println!(
                    "  {} {}",
                    provider,
                    source_label(store.credential_source(&provider))
                );
            }
        }
        return Ok(());
    }

    // Require provider for other operations
    let Some(provider) = args.provider else {
        bail!("Provider required. Use --list to see configured providers.");
    };
    let Some(env_var) = env_var_for_provider(&provider) else {
        bail!("Unknown provider '{provider}'. Run `pagebrief providers` to list them.");
    };

    if args.delete {
        match store.delete(&provider) {
            Ok(()) => println!("API key for '{provider}' deleted."),
            Err(pagebrief_models::Error::CredentialsNotFound(_)) => {
                println!("No stored API key for '{provider}'.");
            }
            Err(e) => bail!("Failed to delete API key: {e}"),
        }
        return Ok(());
    }

    println!("Enter API key for {provider} (or set {env_var})");

    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API key")
        .interact()?;

    store.set(&provider, &key)?;
    println!("API key for '{provider}' saved to keyring.");

    Ok(())
}

/// Short label for where a key comes from.
pub fn source_label(source: Option<CredentialSource>) -> &'static str {
    match source {
        Some(CredentialSource::Keyring) => "(keyring)",
        Some(CredentialSource::Environment) => "(environment)",
        None => "",
    }
}
