//! Summary history commands.

use anyhow::Result;
use chrono::Local;
use clap::Args;

use crate::config::ConfigLoader;
use crate::history::{HistoryEntry, SummaryHistory};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Delete all stored summaries
    #[arg(long)]
    pub clear: bool,
}

pub fn run(args: HistoryArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let history = SummaryHistory::open_default(config.history.limit);

    if args.clear {
        history.clear()?;
        println!("History cleared.");
        return Ok(());
    }

    let entries = history.load()?;
    if entries.is_empty() {
        println!("No summaries recorded.");
        return Ok(());
    }

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &HistoryEntry) -> String {
    let when = entry
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    let title = if entry.title.trim().is_empty() {
        "(untitled)"
    } else {
        entry.title.trim()
    };
    format!(
        "{when}  [{}/{}]  {title}\n{}\n",
        entry.provider,
        entry.summary_type,
        entry.summary.trim_end()
    )
}
