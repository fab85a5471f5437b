use clap::Subcommand;
use focusloop_core::Config;

use super::Context;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "focus_minutes", "sound_file")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Replace the configuration: current values plus the given overrides
    Apply {
        #[arg(long)]
        focus_minutes: Option<u32>,
        #[arg(long)]
        break_minutes: Option<u32>,
        #[arg(long)]
        micro_break_seconds: Option<u32>,
        #[arg(long)]
        random_interval_min: Option<u32>,
        #[arg(long)]
        random_interval_max: Option<u32>,
        #[arg(long)]
        sound_file: Option<String>,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(ctx: &Context, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ctx.open_store()?;
    match action {
        ConfigAction::Get { key } => match store.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            store.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::Apply {
            focus_minutes,
            break_minutes,
            micro_break_seconds,
            random_interval_min,
            random_interval_max,
            sound_file,
        } => {
            let current = store.config().clone();
            let config = Config {
                focus_minutes: focus_minutes.unwrap_or(current.focus_minutes),
                break_minutes: break_minutes.unwrap_or(current.break_minutes),
                micro_break_seconds: micro_break_seconds.unwrap_or(current.micro_break_seconds),
                random_interval_min: random_interval_min.unwrap_or(current.random_interval_min),
                random_interval_max: random_interval_max.unwrap_or(current.random_interval_max),
                sound_file: sound_file.unwrap_or(current.sound_file),
            };
            store.apply(config)?;
            println!("{}", serde_json::to_string_pretty(store.config())?);
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(store.config())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.reset()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", store.path().display());
        }
    }
    Ok(())
}
