use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rmscope_core::{AppConfig, Category, RunSnapshot};
use rmscope_science::{Extractor, FetchController, ResearchmapClient};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "rmscope",
    about = "Fetch a researcher profile and reduce every record to title, venue, year and link",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format. Also enabled by setting RMSCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this config file instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every category of a profile and print the extracted records.
    Fetch {
        /// Profile permalink; overrides the config.
        #[arg(long)]
        permalink: Option<String>,
        /// Preferred record language; overrides the config.
        #[arg(long)]
        lang: Option<String>,
        /// Only fetch these categories (repeatable), in run order.
        #[arg(long, action = ArgAction::Append)]
        only: Vec<String>,
        /// Skip the politeness delays and backoff waits.
        #[arg(long)]
        no_delay: bool,
    },

    /// Extract records from a saved API response.
    Extract {
        /// JSON file: a page body with `items`, an array of records, or one record.
        file: PathBuf,
        #[arg(long)]
        category: String,
    },

    /// List the known categories in run order.
    Categories,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config as TOML.
    Show,
    /// Print the config file path.
    Path,
    /// Write the default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("RMSCOPE_JSON").as_deref() == Ok("1");
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);

    match cli.command {
        Commands::Fetch {
            permalink,
            lang,
            only,
            no_delay,
        } => {
            let mut config = AppConfig::load_from(&config_path)?;
            if let Some(permalink) = permalink {
                config.profile.permalink = permalink;
            }
            if let Some(lang) = lang {
                config.profile.lang = lang;
            }
            config.validate()?;
            if no_delay {
                config.fetch = config.fetch.without_delays();
            }

            let categories = select_categories(&only)?;
            let extractor = Extractor::new(&config.profile, &config.extract);
            let client = ResearchmapClient::new(&config.profile, &config.fetch)?;
            let controller = FetchController::new(client, config.fetch.clone());
            info!(
                permalink = %config.profile.permalink,
                lang = %config.profile.lang,
                categories = categories.len(),
                "starting run"
            );

            let total = categories.len();
            let mut progress = |snapshot: &RunSnapshot| {
                let done = snapshot.categories.len();
                let failed = snapshot.categories.iter().filter(|r| r.is_failed()).count();
                eprintln!("[{done}/{total}] categories finished, {failed} failed");
            };
            let snapshot = controller.run(&categories, &extractor, &mut progress).await;

            if json_output {
                let dur = start.elapsed().as_millis();
                print_json(&json!({
                    "status": "ok",
                    "data": snapshot,
                    "meta": {"permalink": config.profile.permalink, "duration_ms": dur}
                }))?;
            } else {
                for line in snapshot.render_lines() {
                    println!("{line}");
                }
            }
        }

        Commands::Extract { file, category } => {
            let config = AppConfig::load_from(&config_path)?;
            let category: Category = category.parse()?;
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let body: Value = serde_json::from_str(&contents)
                .with_context(|| format!("parsing {}", file.display()))?;

            let extractor = Extractor::new(&config.profile, &config.extract);
            let results: Vec<_> = records_of(body)
                .iter()
                .map(|record| extractor.extract(category, record))
                .collect();

            if json_output {
                let dur = start.elapsed().as_millis();
                print_json(&json!({
                    "status": "ok",
                    "data": {"category": category.key(), "results": results},
                    "meta": {"duration_ms": dur}
                }))?;
            } else {
                for r in &results {
                    println!("{}", r.display_line());
                }
            }
        }

        Commands::Categories => {
            if json_output {
                let items: Vec<Value> = Category::ALL
                    .iter()
                    .map(|c| json!({"key": c.key(), "label": c.label(), "venue": c.has_venue()}))
                    .collect();
                print_json(&json!({"status": "ok", "data": items}))?;
            } else {
                for c in Category::ALL {
                    println!("{:<28} {}", c.key(), c.label());
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = AppConfig::load_from(&config_path)?;
                if json_output {
                    print_json(&json!({"status": "ok", "data": config}))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                println!("{}", config_path.display());
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                AppConfig::default().save_to(&config_path)?;
                eprintln!("Wrote {}", config_path.display());
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

/// Categories named by `--only`, kept in run order; all of them when empty.
fn select_categories(only: &[String]) -> Result<Vec<Category>> {
    if only.is_empty() {
        return Ok(Category::ALL.to_vec());
    }
    let wanted = only
        .iter()
        .map(|key| key.parse::<Category>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Category::ALL
        .into_iter()
        .filter(|c| wanted.contains(c))
        .collect())
}

/// Records in a saved body: `{"items": [...]}`, a bare array, or a single record.
fn records_of(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) if map.get("items").is_some_and(Value::is_array) => {
            match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        other => vec![other],
    }
}

fn print_json(val: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
