//! Summarize extracted page text with a hosted provider.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use pagebrief_models::auth::{ApiKey, env_var_for_provider};
use pagebrief_models::{
    DispatchConfig, Dispatcher, ErrorKind, ImageRef, SummaryRequest, SummaryType,
};
use tracing::{debug, warn};

use super::credential_store;
use super::providers::registry;
use crate::config::ConfigLoader;
use crate::history::{HistoryEntry, SummaryHistory};

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// File holding the extracted page text (stdin when omitted or "-")
    pub file: Option<PathBuf>,

    /// Provider to use (defaults to `default_provider` from config)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Summary type: brief, detailed or technical
    #[arg(short = 't', long = "type", value_parser = parse_summary_type)]
    pub summary_type: Option<SummaryType>,

    /// Page title
    #[arg(long)]
    pub title: Option<String>,

    /// Image to attach as URL or URL|ALT; only the first two are used
    #[arg(long = "image", value_name = "URL[|ALT]", value_parser = parse_image)]
    pub images: Vec<ImageRef>,

    /// Don't record this summary in history
    #[arg(long)]
    pub no_history: bool,
}

pub async fn run(args: SummarizeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let provider = args
        .provider
        .unwrap_or_else(|| config.default_provider.clone());
    let summary_type = args.summary_type.unwrap_or(config.summary_type);
    let title = args.title.unwrap_or_default();

    let content = read_content(args.file.as_deref())?;
    let request = SummaryRequest::new(content, summary_type)?
        .with_title(title.clone())
        .with_images(args.images);

    let (api_key, key_missing) = match credential_store().get(&provider) {
        Ok(key) => (key, false),
        Err(pagebrief_models::Error::CredentialsNotFound(_)) => (ApiKey::new(""), true),
        Err(e) => return Err(e.into()),
    };

    let dispatcher = Dispatcher::new(
        registry(&config),
        DispatchConfig::with_timeout(Duration::from_secs(config.timeout_secs)),
    );

    let summary = match dispatcher.dispatch(&provider, &api_key, &request).await {
        Ok(summary) => summary,
        Err(error) => {
            if key_missing && error.kind == ErrorKind::Unauthorized {
                eprintln!("{}", missing_key_hint(&provider));
            }
            return Err(error.into());
        }
    };

    println!("{}", summary.trim_end());

    if config.history.enabled && !args.no_history {
        let history = SummaryHistory::open_default(config.history.limit);
        match history.record(HistoryEntry::new(&provider, summary_type, title, summary)) {
            Ok(()) => debug!(path = %history.path().display(), "recorded summary"),
            Err(e) => warn!(error = %e, "failed to record summary history"),
        }
    }

    Ok(())
}

/// Read page text from a file, or stdin for `None` / `-`.
fn read_content(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("failed to read page text from stdin")?;
            Ok(content)
        }
    }
}

fn missing_key_hint(provider: &str) -> String {
    match env_var_for_provider(provider) {
        Some(env_var) => format!(
            "No API key for '{provider}'. Run `pagebrief auth {provider}` or set {env_var}."
        ),
        None => format!("No API key for '{provider}'."),
    }
}

fn parse_summary_type(value: &str) -> Result<SummaryType, String> {
    value.parse()
}

/// Parse `URL` or `URL|ALT`.
fn parse_image(value: &str) -> Result<ImageRef, String> {
    let (url, alt) = value.split_once('|').unwrap_or((value, ""));
    let url = url.trim();
    if url.is_empty() {
        return Err("image URL must not be empty".to_string());
    }
    Ok(ImageRef::new(url, alt.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_image_with_alt() {
        let image = parse_image("https://img.test/a.png|A diagram").unwrap();
        assert_eq!(image.url, "https://img.test/a.png");
        assert_eq!(image.alt_text, "A diagram");
    }

    #[test]
    fn parse_image_without_alt() {
        let image = parse_image("https://img.test/a.png").unwrap();
        assert_eq!(image.alt_text, "");
    }

    #[test]
    fn parse_image_rejects_empty_url() {
        assert!(parse_image("|alt only").is_err());
    }

    #[test]
    fn parse_summary_type_accepts_known_names() {
        assert_eq!(parse_summary_type("technical"), Ok(SummaryType::Technical));
        assert!(parse_summary_type("haiku").is_err());
    }

    #[test]
    fn read_content_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.txt");
        std::fs::write(&path, "page text").unwrap();

        assert_eq!(read_content(Some(&path)).unwrap(), "page text");
    }

    #[test]
    fn read_content_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_content(Some(&dir.path().join("missing.txt"))).is_err());
    }

    #[test]
    fn missing_key_hint_names_env_var() {
        assert!(missing_key_hint("gemini").contains("GEMINI_API_KEY"));
        assert_eq!(missing_key_hint("other"), "No API key for 'other'.");
    }
}
