use crate::*;

use revdash::config::{config_file_path, save_config};

pub fn handle(cmd: ConfigCommands) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Path => {
            println!("{}", config_file_path()?.display());
        }
        ConfigCommands::Show => {
            let cfg = load_config()?;
            print!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigCommands::Init { force } => {
            let file = config_file_path()?;
            if file.exists() && !force {
                anyhow::bail!("{} already exists (use --force to replace it)", file.display());
            }
            save_config(&DashboardConfig::default())?;
            println!("Config written to {}", file.display());
        }
    }
    Ok(())
}
