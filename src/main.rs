//! expiring-cache - inspect and maintain a cache file from the command line
//!
//! Configuration comes from environment variables (see
//! [`CacheOptions::from_env`]); the command comes from the arguments.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_cache::{CacheOptions, ExpiringCache, GetOptions, InitializeOptions};

/// Inspect and maintain a file-backed expiring cache
#[derive(Parser, Debug)]
#[command(name = "expiring-cache")]
#[command(about = "Inspect and maintain a file-backed expiring cache")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List the keys of usable entries
    Keys {
        /// Include expired entries
        #[arg(long)]
        all: bool,
    },
    /// Print usable entries as a JSON object
    Entries {
        /// Include expired entries
        #[arg(long)]
        all: bool,
    },
    /// Print the value stored under a key
    Get {
        key: String,
        /// Return the value even when it has expired
        #[arg(long)]
        all: bool,
    },
    /// Store a JSON value under a key
    ///
    /// Examples:
    ///   expiring-cache set user '{"name":"ada"}'
    ///   expiring-cache set offset -3
    Set {
        key: String,
        #[arg(value_name = "JSON", value_parser = parse_json, allow_hyphen_values = true)]
        value: Value,
    },
    /// Drop expired entries and rewrite the file
    Prune,
    /// Remove every entry
    Clear,
}

impl Command {
    /// Commands that only read must not rewrite the file while loading it.
    fn prunes_on_load(&self) -> bool {
        matches!(self, Command::Prune)
    }
}

fn parse_json(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}

fn read_options(all: bool) -> GetOptions {
    if all {
        GetOptions::include_expired()
    } else {
        GetOptions::default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log to stderr so stdout stays machine-readable.
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = CacheOptions::from_env().context("invalid cache configuration")?;
    info!(
        "Configuration loaded: file={}, expire_after_days={}, prettify={}, disabled={}",
        options.cache_file_path.display(),
        options.cache_entry_expire_after_days,
        options.prettify_cache_file,
        options.disable_cache
    );

    let mut cache: ExpiringCache<Value> = ExpiringCache::new(options);
    cache
        .initialize_with(InitializeOptions {
            exclude_expired_entries: cli.command.prunes_on_load(),
            throw_on_error: false,
        })
        .await
        .context("failed to load cache")?;
    debug!("Loaded {} entries", cache.len());

    match cli.command {
        Command::Keys { all } => {
            for key in cache.get_keys_with(read_options(all)) {
                println!("{}", key);
            }
        }
        Command::Entries { all } => {
            let entries: serde_json::Map<String, Value> = cache
                .get_entries_with(read_options(all))
                .into_iter()
                .map(|(key, data)| (key.to_string(), data.clone()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Get { key, all } => match cache.get_with(&key, read_options(all)) {
            Some(data) => println!("{}", serde_json::to_string_pretty(data)?),
            None => bail!("no usable entry for '{}'", key),
        },
        Command::Set { key, value } => {
            cache.set(key.clone(), value).await.context("failed to write cache")?;
            info!("Stored '{}'", key);
        }
        Command::Prune => {
            info!("{} live entries remain after pruning", cache.len());
        }
        Command::Clear => {
            cache.clear().await.context("failed to write cache")?;
            info!("Cache cleared");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("expiring-cache").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_read_commands() {
        assert_eq!(parse(&["keys"]).unwrap(), Command::Keys { all: false });
        assert_eq!(parse(&["entries", "--all"]).unwrap(), Command::Entries { all: true });
        assert_eq!(
            parse(&["get", "a", "--all"]).unwrap(),
            Command::Get {
                key: "a".to_string(),
                all: true
            }
        );
        assert_eq!(
            parse(&["get", "--all", "a"]).unwrap(),
            Command::Get {
                key: "a".to_string(),
                all: true
            }
        );
    }

    #[test]
    fn test_parse_set_requires_json() {
        assert_eq!(
            parse(&["set", "a", r#"{"v":1}"#]).unwrap(),
            Command::Set {
                key: "a".to_string(),
                value: serde_json::json!({ "v": 1 })
            }
        );
        assert_eq!(
            parse(&["set", "offset", "-3"]).unwrap(),
            Command::Set {
                key: "offset".to_string(),
                value: serde_json::json!(-3)
            }
        );
        let err = parse(&["set", "a", "{"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_all_flag_only_on_read_commands() {
        assert!(parse(&["clear", "--all"]).is_err());
        assert!(parse(&["prune", "--all"]).is_err());
        assert!(parse(&["set", "--all", "1"]).is_err());
        assert!(parse(&["set", "a", "1", "--all"]).is_err());
    }

    #[test]
    fn test_help_is_not_a_usage_error() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["get", "--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["drop"]).is_err());
        assert!(parse(&["get"]).is_err());
        assert!(parse(&["keys", "extra"]).is_err());
    }

    #[test]
    fn test_only_prune_prunes_on_load() {
        assert!(Command::Prune.prunes_on_load());
        assert!(!Command::Clear.prunes_on_load());
        assert!(!Command::Keys { all: false }.prunes_on_load());
    }
}
