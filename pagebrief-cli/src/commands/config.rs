use anyhow::Result;
use clap::Args;

use crate::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show configuration file paths instead of the merged config
    #[arg(long)]
    pub path: bool,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        show_paths()
    } else {
        show_config()
    }
}

fn show_config() -> Result<()> {
    let config = ConfigLoader::load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{}", toml_str);
    Ok(())
}

fn show_paths() -> Result<()> {
    println!(
        "User config:    {}",
        ConfigLoader::user_config_path().display()
    );
    println!(
        "Project config: {}",
        ConfigLoader::project_config_path().display()
    );
    println!(
        "History:        {}",
        pagebrief_paths::data_dir().join("history.json").display()
    );
    Ok(())
}
